use axum::http::StatusCode;
use axum::Router;
use axum_test::TestServer;

use audioscribe::config::settings::Settings;
use audioscribe::{modules, AppState};

async fn setup_test_server() -> TestServer {
    dotenvy::dotenv().ok();

    let state = AppState::new(Settings::from_env()).unwrap();

    let app = Router::new()
        .merge(modules::health::routes::routes())
        .with_state(state);

    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn test_health() {
    let server = setup_test_server().await;

    let response = server.get("/api/health").await;

    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "OK");
    assert_eq!(body["message"], "Server is running!");
}

#[tokio::test]
async fn test_fallback_serves_ui_entry_page() {
    dotenvy::dotenv().ok();

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("index.html"),
        "<!DOCTYPE html><title>Audioscribe</title>",
    )
    .unwrap();

    let mut settings = Settings::from_env();
    settings.public_dir = dir.path().to_path_buf();

    let state = AppState::new(settings).unwrap();
    let server = TestServer::new(audioscribe::app(state)).unwrap();

    let response = server.get("/some/unknown/route").await;

    response.assert_status(StatusCode::OK);
    assert!(response.text().contains("Audioscribe"));
}
