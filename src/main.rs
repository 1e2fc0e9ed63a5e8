// Main entry point for the photo translation backend

use lenslate::{
    core::{types::parse_targets, Config, PipelineError, TranslateRequest, TranslateResponse},
    Orchestrator,
};

use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{debug, error, info};

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    orchestrator: Arc<Orchestrator>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Arc::new(Config::new().expect("Failed to load configuration"));

    // Initialize logging
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new(format!(
        "lenslate={}",
        match config.log_level() {
            tracing::Level::TRACE => "trace",
            tracing::Level::DEBUG => "debug",
            tracing::Level::INFO => "info",
            tracing::Level::WARN => "warn",
            tracing::Level::ERROR => "error",
        }
    ));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "Config: translator={} ocr_langs={} targets={}",
        config.translator.base_url,
        config.ocr.languages.join("+"),
        config.translator.default_targets.join(",")
    );

    let orchestrator = Arc::new(Orchestrator::new(config.clone())?);
    let recognizer = orchestrator.recognizer();
    let state = AppState { orchestrator };

    // Setup CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(health))
        .route("/api/translate", post(translate))
        .nest_service("/app", ServeDir::new("static"))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .layer(cors);

    let addr = format!("{}:{}", config.server_host(), config.server_port());
    info!("Server starting on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /              - Health check");
    info!("  POST /api/translate - Translate an uploaded photo (multipart/form-data)");
    info!("  GET  /app           - Capture/upload page");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Engine shutdown is a process-lifecycle event, not per-request
    recognizer.shutdown().await;
    info!("Server stopped");

    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Backend server running",
    }))
}

/// Translate endpoint
///
/// # Request Format:
/// - multipart/form-data
/// - Field "image": the photo to OCR (required unless "text" is given)
/// - Field "text" (optional): direct text input for dev-mode testing
/// - Field "target" or "targets" (optional): comma-separated short codes
///
/// # Response:
/// { originalText, detectedLanguage, translatedText }
async fn translate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TranslateResponse>, (StatusCode, Json<serde_json::Value>)> {
    let start_time = std::time::Instant::now();
    let mut request = TranslateRequest::default();

    // Parse multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "image" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("image read error: {e}")))?;
                // Browsers send an empty file part when nothing was picked
                if !data.is_empty() {
                    request.image = Some(data.to_vec());
                }
            }
            "text" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("text read error: {e}")))?;
                if !text.trim().is_empty() {
                    request.text = Some(text);
                }
            }
            "target" | "targets" => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("target read error: {e}")))?;
                request.targets = parse_targets(&raw);
            }
            other => debug!("ignoring unknown form field: {}", other),
        }
    }

    let response = state
        .orchestrator
        .handle(request)
        .await
        .map_err(|e| match e {
            PipelineError::BadRequest(message) => bad_request(message),
            other => {
                error!("translate request failed: {:?}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({
                        "error": "Server error",
                        "details": other.to_string(),
                    })),
                )
            }
        })?;

    info!(
        "Request completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(Json(response))
}

fn bad_request(message: String) -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": message })),
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
