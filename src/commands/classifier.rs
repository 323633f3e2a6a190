use crate::error::AppError;
use crate::models::classify_types::ClassifierStatus;
use crate::models::session_types::ResultHandoff;
use crate::services::classifier::helper::ClassifierService;
use crate::services::session::SessionState;
use tauri::{AppHandle, Emitter, State};
use tracing::info;

#[tauri::command]
pub fn get_classifier_status(classifier: State<'_, ClassifierService>) -> Result<ClassifierStatus, AppError> {
    classifier.status()
}

/// Classify the current image and return what the result screen needs.
#[tauri::command]
pub async fn analyze_image(
    app: AppHandle,
    classifier: State<'_, ClassifierService>,
    session: State<'_, SessionState>,
) -> Result<ResultHandoff, AppError> {
    let image = session.update(|s| s.begin_analyze())??;
    info!(image = %image, "analyzing image");

    let outcome = classifier.classify(image.clone()).await;
    if let Ok(ref o) = outcome {
        info!(
            results = o.categories.len(),
            inference_time_ms = o.inference_time_ms,
            "classification finished"
        );
    }

    let handoff = session.update(|s| s.finish_analyze(image, outcome))?;
    if let Err(ref e) = handoff {
        let _ = app.emit("classification-error", e);
    }
    handoff
}
