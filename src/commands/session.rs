use crate::error::AppError;
use crate::models::session_types::{ImageRef, SessionView};
use crate::services::session::SessionState;
use tauri::State;

#[tauri::command]
pub fn get_session(session: State<'_, SessionState>) -> Result<SessionView, AppError> {
    session.view()
}

/// Called when the acquisition screen comes back into view.
#[tauri::command]
pub fn resume_session(session: State<'_, SessionState>) -> Result<Option<ImageRef>, AppError> {
    session.update(|s| s.resume())
}
