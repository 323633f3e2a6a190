use crate::config::ClassifierConfig;
use crate::error::AppError;
use crate::models::classify_types::{ClassificationOutcome, ClassifierStatus};
use crate::models::session_types::ImageRef;
use crate::services::classifier::engine::{ClassifierEngine, EngineFactory};
use crate::services::classifier::{postprocess, preprocess};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, error, info};

/// Owns the engine handle. Building the engine may fail; that leaves the
/// classifier without an engine and the next `classify` tries again.
pub struct ImageClassifier {
    config: ClassifierConfig,
    factory: Arc<dyn EngineFactory>,
    engine: Option<Box<dyn ClassifierEngine>>,
    last_error: Option<AppError>,
}

impl ImageClassifier {
    pub fn new(config: ClassifierConfig, factory: Arc<dyn EngineFactory>) -> Self {
        let mut classifier = Self {
            config,
            factory,
            engine: None,
            last_error: None,
        };
        // Failure is recorded in `last_error`; construction itself never fails.
        let _ = classifier.setup();
        classifier
    }

    fn setup(&mut self) -> Result<(), AppError> {
        match self.factory.build(&self.config) {
            Ok(engine) => {
                info!(model = %self.config.model_name, "image classifier initialised");
                self.engine = Some(engine);
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                error!(model = %self.config.model_name, "image classifier failed to initialise: {}", e);
                self.engine = None;
                let e = AppError::engine(format!("Image classifier failed to initialise: {}", e.message));
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_some()
    }

    pub fn last_error(&self) -> Option<&AppError> {
        self.last_error.as_ref()
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn classify(&mut self, image: &ImageRef) -> Result<ClassificationOutcome, AppError> {
        if self.engine.is_none() {
            self.setup()?;
        }

        let input = preprocess::prepare(image, &self.config)?;

        let engine = self
            .engine
            .as_mut()
            .ok_or_else(|| AppError::engine("Image classifier is not initialised"))?;

        let start = Instant::now();
        let raw = engine.infer(input)?;
        let inference_time_ms = start.elapsed().as_millis() as u64;

        let scores = postprocess::apply_activation(&raw, self.config.activation);
        let categories = postprocess::rank_categories(
            &scores,
            engine.labels(),
            self.config.score_threshold,
            self.config.max_results,
        );

        debug!(
            image = %image,
            results = categories.len(),
            inference_time_ms,
            "classified image"
        );

        Ok(ClassificationOutcome {
            categories,
            inference_time_ms,
        })
    }
}

/// Shared handle managed as Tauri state.
#[derive(Clone)]
pub struct ClassifierService {
    inner: Arc<Mutex<ImageClassifier>>,
}

impl ClassifierService {
    pub fn new(classifier: ImageClassifier) -> Self {
        Self {
            inner: Arc::new(Mutex::new(classifier)),
        }
    }

    pub fn status(&self) -> Result<ClassifierStatus, AppError> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| AppError::from("Classifier lock poisoned"))?;
        Ok(ClassifierStatus {
            ready: guard.is_ready(),
            model_name: guard.config().model_name.clone(),
            error: guard.last_error().map(|e| e.message.clone()),
        })
    }

    /// Run one classification on a blocking thread and hand the result back
    /// to the caller's task.
    pub async fn classify(&self, image: ImageRef) -> Result<ClassificationOutcome, AppError> {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = inner
                .lock()
                .map_err(|_| AppError::from("Classifier lock poisoned"))?;
            guard.classify(&image)
        })
        .await
        .map_err(|e| AppError::from(format!("Classification task failed: {}", e)))?
    }
}
