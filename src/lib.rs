mod commands;
mod config;
mod error;
mod models;
mod services;

use config::{AppConfig, CONFIG_FILE_NAME};
use services::classifier::engine::OrtEngineFactory;
use services::classifier::helper::{ClassifierService, ImageClassifier};
use services::session::{SessionState, SessionStore, SESSION_FILE_NAME};
use std::sync::Arc;
use tauri::path::BaseDirectory;
use tauri::Manager;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("asclepius_lib=info,ort=warn"));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(env_filter)
        .try_init();
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    init_tracing();

    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_fs::init())
        .plugin(tauri_plugin_window_state::Builder::default().build())
        .setup(|app| {
            let config_path = app.path().app_config_dir()?.join(CONFIG_FILE_NAME);
            let config = AppConfig::load(&config_path).unwrap_or_else(|e| {
                warn!("Falling back to default settings: {}", e);
                AppConfig::default()
            });

            let app_data_dir = app.path().app_data_dir()?;
            std::fs::create_dir_all(&app_data_dir)?;

            // The model ships as a bundled resource, not a download.
            let model_dir = app.path().resolve("models", BaseDirectory::Resource)?;
            let factory = Arc::new(OrtEngineFactory::new(model_dir));
            // A failed build is reported through `get_classifier_status` once
            // the webview asks for it.
            let classifier = ImageClassifier::new(config.classifier.clone(), factory);
            app.manage(ClassifierService::new(classifier));

            let store = SessionStore::new(app_data_dir.join(SESSION_FILE_NAME));
            app.manage(SessionState::open(store));
            app.manage(config);

            info!("asclepius started");
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::picker::pick_image,
            commands::crop::crop_image,
            commands::classifier::get_classifier_status,
            commands::classifier::analyze_image,
            commands::result::show_result,
            commands::session::get_session,
            commands::session::resume_session,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
