use std::env;
use std::path::PathBuf;

/// Runtime configuration, read once at startup. Endpoint and key
/// defaults are placeholders; real deployments must set the env vars.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub transcribe_endpoint: String,
    pub transcribe_api_key: String,
    pub chat_endpoint: String,
    pub chat_api_key: String,
    pub upload_dir: PathBuf,
    pub public_dir: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let transcribe_endpoint = env::var("TRANSCRIBE_ENDPOINT").unwrap_or_else(|_| {
            "https://YOUR_RESOURCE_NAME.openai.azure.com/openai/deployments/whisper/audio/translations?api-version=2024-06-01".to_string()
        });
        let transcribe_api_key = env::var("TRANSCRIBE_API_KEY")
            .unwrap_or_else(|_| "YOUR_TRANSCRIBE_API_KEY_HERE".to_string());

        let chat_endpoint = env::var("CHAT_ENDPOINT").unwrap_or_else(|_| {
            "https://YOUR_RESOURCE_NAME.openai.azure.com/openai/deployments/gpt-4o-mini/chat/completions?api-version=2025-01-01-preview".to_string()
        });
        let chat_api_key =
            env::var("CHAT_API_KEY").unwrap_or_else(|_| "YOUR_CHAT_API_KEY_HERE".to_string());

        let upload_dir = env::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("uploads"));
        let public_dir = env::var("PUBLIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("public"));

        Self {
            port,
            transcribe_endpoint,
            transcribe_api_key,
            chat_endpoint,
            chat_api_key,
            upload_dir,
            public_dir,
        }
    }
}
