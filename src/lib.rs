use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};

pub mod client;
pub mod config;
pub mod modules;
pub mod services;

use config::settings::Settings;
use services::llm::LlmClient;
use services::stt::SttClient;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub stt: SttClient,
    pub llm: LlmClient,
}

impl AppState {
    pub fn new(settings: Settings) -> anyhow::Result<Self> {
        let stt = SttClient::new(&settings)?;
        let llm = LlmClient::new(&settings)?;

        Ok(Self {
            settings,
            stt,
            llm,
        })
    }
}

/// Full router: API modules, permissive CORS, and the static fallback
/// that serves the UI entry page for unknown paths.
pub fn app(state: AppState) -> Router {
    let public_dir = state.settings.public_dir.clone();
    let index = public_dir.join("index.html");

    Router::new()
        .merge(modules::health::routes::routes())
        .merge(modules::transcribe::routes::routes())
        .merge(modules::chat::routes::routes())
        .fallback_service(ServeDir::new(&public_dir).fallback(ServeFile::new(index)))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
