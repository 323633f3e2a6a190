use crate::config::AppConfig;
use crate::error::{AppError, ErrorKind};
use crate::models::session_types::{CropRegion, ImageRef};
use crate::services::crop_service;
use crate::services::session::SessionState;
use tauri::{AppHandle, Emitter, Manager, State};

/// Crop `source` (or the current image) and make the result current.
#[tauri::command]
pub async fn crop_image(
    app: AppHandle,
    config: State<'_, AppConfig>,
    session: State<'_, SessionState>,
    source: Option<String>,
    region: Option<CropRegion>,
) -> Result<ImageRef, AppError> {
    let source = match source {
        Some(s) => ImageRef::new(s),
        None => session.view()?.current_image.ok_or_else(|| {
            AppError::new(ErrorKind::NoImageSelected, "Please pick an image first")
        })?,
    };

    let cache_dir = app
        .path()
        .app_cache_dir()
        .map_err(|e| AppError::crop(format!("Failed to resolve cache directory: {}", e)))?;
    let options = config.crop.clone();

    let result = tokio::task::spawn_blocking(move || {
        crop_service::crop_image(&source, region, &options, &cache_dir)
    })
    .await
    .map_err(|e| AppError::crop(format!("Crop task failed: {}", e)))?;

    match result {
        Ok(cropped) => {
            session.update(|s| s.crop_succeeded(cropped.clone()))?;
            Ok(cropped)
        }
        Err(e) => {
            let _ = app.emit("crop-error", &e);
            Err(e)
        }
    }
}
