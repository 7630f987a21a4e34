use axum::Json;

use crate::modules::health::schema::HealthResponse;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "Server is running!".to_string(),
    })
}
