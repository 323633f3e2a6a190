use crate::error::AppError;
use crate::models::result_types::ResultView;
use crate::models::session_types::ResultHandoff;
use crate::services::result_service;

#[tauri::command]
pub async fn show_result(handoff: ResultHandoff) -> Result<ResultView, AppError> {
    tokio::task::spawn_blocking(move || result_service::render_result(&handoff))
        .await
        .map_err(|e| AppError::from(format!("Result task failed: {}", e)))
}
