use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct TranscribeResponse {
    pub transcription: String,
    pub filename: String,
    pub mock: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
