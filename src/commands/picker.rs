use crate::error::AppError;
use crate::models::session_types::ImageRef;
use crate::services::picker_service;
use crate::services::session::SessionState;
use std::io::Read;
use tauri::{AppHandle, Manager, State};
use tauri_plugin_dialog::DialogExt;
use tauri_plugin_fs::{FsExt, OpenOptions};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tiff", "tif"];

/// Open the system picker restricted to images. Cancelling yields a
/// `no_image_selected` error and leaves the current image alone.
#[tauri::command]
pub async fn pick_image(app: AppHandle, session: State<'_, SessionState>) -> Result<ImageRef, AppError> {
    let cache_dir = app
        .path()
        .app_cache_dir()
        .map_err(|e| AppError::from(format!("Failed to resolve cache directory: {}", e)))?;

    let picked = tokio::task::spawn_blocking(move || {
        let file = app
            .dialog()
            .file()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .blocking_pick_file();

        file.map(|file| {
            picker_service::materialize_pick(file, &cache_dir, |uri| {
                let mut opts = OpenOptions::new();
                opts.read(true);
                let mut bytes = Vec::new();
                app.fs().open(uri, opts)?.read_to_end(&mut bytes)?;
                Ok(bytes)
            })
        })
        .transpose()
    })
    .await
    .map_err(|e| AppError::from(format!("Picker task failed: {}", e)))??;

    session.update(|s| s.select(picked))?
}
