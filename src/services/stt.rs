use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::settings::Settings;
use crate::services::UPSTREAM_TIMEOUT;

#[derive(Error, Debug)]
pub enum SttError {
    #[error("Request timeout. Please try with a smaller file.")]
    Timeout,
    #[error("{message}")]
    Upstream { status: u16, message: String },
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Missing API key")]
    MissingApiKey,
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Client for the external speech-to-text endpoint. The endpoint URL is
/// the full deployment URL including any api-version query string.
#[derive(Clone)]
pub struct SttClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl SttClient {
    pub fn new(settings: &Settings) -> Result<Self, SttError> {
        if settings.transcribe_api_key.is_empty() {
            return Err(SttError::MissingApiKey);
        }

        let client = Client::builder().timeout(UPSTREAM_TIMEOUT).build()?;

        Ok(Self {
            client,
            endpoint: settings.transcribe_endpoint.clone(),
            api_key: settings.transcribe_api_key.clone(),
        })
    }

    /// Sends the spooled upload to the transcription endpoint and
    /// returns the plain transcript text.
    pub async fn transcribe(&self, audio_path: &Path, file_name: &str) -> Result<String, SttError> {
        let audio_data = tokio::fs::read(audio_path).await?;

        let file_part = Part::bytes(audio_data)
            .file_name(file_name.to_string())
            .mime_str(&Self::mime_type(file_name))
            .map_err(|e| SttError::InvalidRequest(e.to_string()))?;

        let form = Form::new()
            .part("file", file_part)
            .text("response_format", "text");

        let response = self
            .client
            .post(&self.endpoint)
            .header("api-key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SttError::Timeout
                } else {
                    SttError::Request(e)
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                SttError::Timeout
            } else {
                SttError::Request(e)
            }
        })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|r| r.error.message)
                .unwrap_or_else(|_| "Transcription failed".to_string());
            return Err(SttError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        Ok(body)
    }

    fn mime_type(file_name: &str) -> String {
        let extension = file_name.rsplit('.').next().unwrap_or("").to_lowercase();

        match extension.as_str() {
            "mp3" => "audio/mpeg",
            "wav" => "audio/wav",
            _ => "application/octet-stream",
        }
        .to_string()
    }
}
