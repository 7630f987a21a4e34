use audioscribe::config::settings::Settings;
use audioscribe::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env();

    // Upload spool directory must exist before the first transcribe call.
    std::fs::create_dir_all(&settings.upload_dir)?;

    let port = settings.port;
    let state = AppState::new(settings)?;
    let app = audioscribe::app(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("Server running on http://localhost:{}", port);

    axum::serve(listener, app).await?;

    Ok(())
}
