use axum::{
    extract::DefaultBodyLimit,
    routing::post,
    Router,
};

use crate::modules::transcribe::controller;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    // Body limit sits above the 50 MiB file cap so the handler can
    // reject oversize payloads with its own error body.
    Router::new()
        .route("/api/transcribe", post(controller::transcribe))
        .layer(DefaultBodyLimit::max(controller::MAX_UPLOAD_BYTES + 4 * 1024 * 1024))
}
