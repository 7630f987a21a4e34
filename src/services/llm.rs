use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::settings::Settings;
use crate::services::UPSTREAM_TIMEOUT;

pub const MAX_COMPLETION_TOKENS: u32 = 1000;
pub const SAMPLING_TEMPERATURE: f32 = 0.7;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Chat request timeout. Please try again.")]
    Timeout,
    #[error("{message}")]
    Upstream { status: u16, message: String },
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Missing API key")]
    MissingApiKey,
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    messages: Vec<WireMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Client for the external chat-completion endpoint. The model is fixed
/// by the deployment URL, so requests carry only messages and sampling
/// parameters.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl LlmClient {
    pub fn new(settings: &Settings) -> Result<Self, LlmError> {
        if settings.chat_api_key.is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let client = Client::builder().timeout(UPSTREAM_TIMEOUT).build()?;

        Ok(Self {
            client,
            endpoint: settings.chat_endpoint.clone(),
            api_key: settings.chat_api_key.clone(),
        })
    }

    /// Builds the grounding instruction for the assistant. With a
    /// transcript present the assistant must answer from it alone and
    /// deflect unrelated questions; without one it asks the user to
    /// transcribe audio first.
    pub fn system_prompt(context: Option<&str>) -> String {
        match context {
            Some(context) => format!(
                "You are a helpful AI assistant. The user has provided an audio \
                 transcription, and you should answer questions about it. Here is the \
                 transcribed content:\n\n\"{context}\"\n\nPlease answer the user's \
                 questions based on this transcribed content. If the question is not \
                 related to the transcription, politely mention that you're designed \
                 to help with questions about the transcribed audio content."
            ),
            None => "You are a helpful AI assistant. The user has not provided any \
                     transcribed audio content yet. Please ask them to upload and \
                     transcribe an audio file first before asking questions."
                .to_string(),
        }
    }

    /// One system + user exchange; returns the assistant's reply text.
    pub async fn chat(&self, message: &str, context: Option<&str>) -> Result<String, LlmError> {
        let request = CompletionRequest {
            messages: vec![
                WireMessage {
                    role: "system".to_string(),
                    content: Self::system_prompt(context),
                },
                WireMessage {
                    role: "user".to_string(),
                    content: message.to_string(),
                },
            ],
            max_tokens: MAX_COMPLETION_TOKENS,
            temperature: SAMPLING_TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Request(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|r| r.error.message)
                .unwrap_or_else(|_| "Chat service error".to_string());
            return Err(LlmError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let completion: CompletionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout
            } else {
                LlmError::Request(e)
            }
        })?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))
    }
}
