use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::modules::transcribe::schema::{ErrorResponse, TranscribeResponse};
use crate::services::stt::SttError;
use crate::AppState;

pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Server-side copy of the client's type check; uploads that bypass the
/// client are re-validated here.
fn is_allowed_audio(file_name: &str, content_type: Option<&str>) -> bool {
    const ALLOWED_MIME: [&str; 3] = ["audio/wav", "audio/mpeg", "audio/mp3"];

    let name = file_name.to_lowercase();
    content_type.is_some_and(|ct| ALLOWED_MIME.contains(&ct))
        || name.ends_with(".wav")
        || name.ends_with(".mp3")
}

pub async fn transcribe(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TranscribeResponse>, ApiError> {
    // Extract the audio field from multipart
    let mut audio_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut content_type: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error(
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart: {}", e),
        )
    })? {
        if field.name() == Some("audio") {
            file_name = field.file_name().map(|s| s.to_string());
            content_type = field.content_type().map(|s| s.to_string());
            let data = field.bytes().await.map_err(|e| {
                error(
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read file: {}", e),
                )
            })?;
            audio_data = Some(data.to_vec());
        }
    }

    let audio_data = audio_data
        .ok_or_else(|| error(StatusCode::BAD_REQUEST, "No audio file uploaded"))?;

    if audio_data.len() > MAX_UPLOAD_BYTES {
        return Err(error(
            StatusCode::BAD_REQUEST,
            "File too large. Maximum size is 50MB.",
        ));
    }

    let file_name = file_name.unwrap_or_else(|| "audio.wav".to_string());

    if !is_allowed_audio(&file_name, content_type.as_deref()) {
        return Err(error(
            StatusCode::BAD_REQUEST,
            "Only .wav and .mp3 files are allowed",
        ));
    }

    // Spool the payload to the upload directory for the duration of the
    // upstream call. Dropping the handle removes the file on every exit
    // path, including errors.
    let spool = tempfile::Builder::new()
        .prefix(&format!("{}-", Utc::now().timestamp_millis()))
        .suffix(&format!("-{}", file_name.replace(['/', '\\'], "_")))
        .tempfile_in(&state.settings.upload_dir)
        .map_err(|e| error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    tokio::fs::write(spool.path(), &audio_data)
        .await
        .map_err(|e| error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    match state.stt.transcribe(spool.path(), &file_name).await {
        Ok(text) => Ok(Json(TranscribeResponse {
            transcription: text,
            filename: file_name,
            mock: false,
        })),
        Err(e) => {
            tracing::error!("Transcription error: {}", e);
            Err(map_stt_error(e))
        }
    }
}

fn map_stt_error(e: SttError) -> ApiError {
    match e {
        SttError::Timeout => error(StatusCode::REQUEST_TIMEOUT, e.to_string()),
        SttError::Upstream { status, message } => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            Json(ErrorResponse { error: message }),
        ),
        _ => error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error during transcription",
        ),
    }
}
