use crate::error::{AppError, ErrorKind};
use crate::models::classify_types::ClassificationOutcome;
use crate::models::session_types::{ImageRef, ResultHandoff, SessionPhase, SessionSnapshot, SessionView};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, warn};

pub const SESSION_FILE_NAME: &str = "session.json";

/// Acquisition-screen state: which image is current and where the
/// pick → crop → analyze flow is.
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    phase: SessionPhase,
    current_image: Option<ImageRef>,
    // Set by every analyze; the next resume drops the current image.
    reset_on_resume: bool,
}

impl Default for AnalysisSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::NoImage,
            current_image: None,
            reset_on_resume: false,
        }
    }

    pub fn restore(snapshot: SessionSnapshot) -> Self {
        let mut session = Self::new();
        if let Some(image) = snapshot.current_image {
            session.set_current(image);
        }
        session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_image: self.current_image.clone(),
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.phase,
            current_image: self.current_image.clone(),
        }
    }

    fn set_current(&mut self, image: ImageRef) {
        self.current_image = Some(image);
        // A running classification stays running until it is finished.
        if self.phase != SessionPhase::Classifying {
            self.phase = SessionPhase::ImageSelected;
        }
    }

    /// Picker result. Nothing picked leaves the state untouched.
    pub fn select(&mut self, picked: Option<ImageRef>) -> Result<ImageRef, AppError> {
        match picked {
            Some(image) => {
                debug!(image = %image, "image selected");
                self.set_current(image.clone());
                Ok(image)
            }
            None => Err(AppError::new(ErrorKind::NoImageSelected, "No media selected")),
        }
    }

    /// The cropped output replaces whatever was current.
    pub fn crop_succeeded(&mut self, cropped: ImageRef) {
        debug!(image = %cropped, "crop accepted");
        self.set_current(cropped);
    }

    pub fn begin_analyze(&mut self) -> Result<ImageRef, AppError> {
        if self.phase == SessionPhase::Classifying {
            return Err("A classification is already running".into());
        }
        let image = self.current_image.clone().ok_or_else(|| {
            AppError::new(ErrorKind::NoImageSelected, "Please pick an image first")
        })?;
        self.phase = SessionPhase::Classifying;
        self.reset_on_resume = true;
        Ok(image)
    }

    /// Turn a classification of `image` (as returned by `begin_analyze`) into
    /// the payload for the result screen. Each analyze replaces the previous
    /// result outright.
    pub fn finish_analyze(
        &mut self,
        image: ImageRef,
        outcome: Result<ClassificationOutcome, AppError>,
    ) -> Result<ResultHandoff, AppError> {
        match outcome {
            Ok(outcome) => {
                self.phase = SessionPhase::ResultShown;
                let top = outcome.top();
                Ok(ResultHandoff {
                    label: top.map(|c| c.label.clone()),
                    score: top.map(|c| c.score),
                    image: Some(image),
                })
            }
            Err(e) => {
                self.phase = SessionPhase::Failed;
                Err(e)
            }
        }
    }

    /// Coming back to the acquisition screen after an analyze starts over.
    pub fn resume(&mut self) -> Option<ImageRef> {
        if self.reset_on_resume {
            debug!("resetting current image after analyze");
            self.current_image = None;
            if self.phase != SessionPhase::Classifying {
                self.phase = SessionPhase::NoImage;
            }
            self.reset_on_resume = false;
        }
        self.current_image.clone()
    }
}

/// Saves the session snapshot as JSON so the current image survives the
/// process being suspended and restarted.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> SessionSnapshot {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => return SessionSnapshot::default(),
        };
        match serde_json::from_str(&content) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(path = %self.path.display(), "discarding unreadable session state: {}", e);
                SessionSnapshot::default()
            }
        }
    }

    pub fn save(&self, snapshot: &SessionSnapshot) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Managed state: the session plus where it is saved.
pub struct SessionState {
    session: Mutex<AnalysisSession>,
    store: SessionStore,
}

impl SessionState {
    pub fn open(store: SessionStore) -> Self {
        let session = AnalysisSession::restore(store.load());
        Self {
            session: Mutex::new(session),
            store,
        }
    }

    /// Run `f` against the session and save the resulting snapshot.
    pub fn update<T>(&self, f: impl FnOnce(&mut AnalysisSession) -> T) -> Result<T, AppError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|_| AppError::from("Session lock poisoned"))?;
        let out = f(&mut guard);
        if let Err(e) = self.store.save(&guard.snapshot()) {
            warn!("failed to save session state: {}", e);
        }
        Ok(out)
    }

    pub fn view(&self) -> Result<SessionView, AppError> {
        let guard = self
            .session
            .lock()
            .map_err(|_| AppError::from("Session lock poisoned"))?;
        Ok(guard.view())
    }
}
