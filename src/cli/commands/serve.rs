//! HTTP server for the Q&A UI and JSON API.
//!
//! Serves the static UI shell plus the ask endpoint the UI posts to.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::SvarError;
use crate::orchestrator::Orchestrator;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::debug;

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
}

/// Run the HTTP server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    settings: Settings,
) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Serve, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let static_dir = settings.static_dir();
    let sweep_interval = Duration::from_secs(settings.session.sweep_interval_seconds);

    let orchestrator = Orchestrator::new(settings)?;
    let sessions = orchestrator.sessions();
    let state = Arc::new(AppState { orchestrator });

    // Periodic idle-session sweep for the lifetime of the server
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        interval.tick().await;
        loop {
            interval.tick().await;
            let evicted = sessions.evict_idle();
            if evicted > 0 {
                debug!("Evicted {} idle sessions", evicted);
            }
        }
    });

    let app = router(state, static_dir);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Svar Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("UI", "GET  /");
    Output::kv("Health", "GET  /health");
    Output::kv("Ask", "POST /api/ask");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>, static_dir: PathBuf) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/ask", post(ask))
        .fallback_service(ServeDir::new(static_dir))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct AskRequest {
    /// Video URL to answer questions about
    #[serde(default)]
    youtube_url: String,
    /// The question to ask
    #[serde(default)]
    question: String,
    /// Caller-supplied session identifier
    #[serde(default)]
    session_id: String,
}

#[derive(Serialize)]
struct AskResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> impl IntoResponse {
    match state
        .orchestrator
        .ask(&req.youtube_url, &req.question, &req.session_id)
        .await
    {
        Ok(answer) => Json(AskResponse {
            success: true,
            answer: Some(answer.answer),
            session_id: Some(answer.session_id),
            error: None,
        })
        .into_response(),
        Err(e) => (
            error_status(&e),
            Json(AskResponse {
                success: false,
                answer: None,
                session_id: None,
                error: Some(e.to_string()),
            }),
        )
            .into_response(),
    }
}

fn error_status(err: &SvarError) -> StatusCode {
    match err {
        SvarError::Validation(_) | SvarError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
        SvarError::NoTranscript => StatusCode::NOT_FOUND,
        SvarError::TranscriptFetch(_) | SvarError::Inference(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
