use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::modules::chat::schema::{ChatRequest, ChatResponse, ErrorResponse};
use crate::services::llm::LlmError;
use crate::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if payload.validate().is_err() {
        return Err(error(StatusCode::BAD_REQUEST, "No message provided"));
    }

    match state
        .llm
        .chat(&payload.message, payload.context.as_deref())
        .await
    {
        Ok(response) => Ok(Json(ChatResponse {
            response,
            mock: false,
        })),
        Err(e) => {
            tracing::error!("Chat error: {}", e);
            Err(map_llm_error(e))
        }
    }
}

fn map_llm_error(e: LlmError) -> ApiError {
    match e {
        LlmError::Timeout => error(StatusCode::REQUEST_TIMEOUT, e.to_string()),
        LlmError::Upstream { status, message } => (
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
            Json(ErrorResponse { error: message }),
        ),
        _ => error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error during chat",
        ),
    }
}
