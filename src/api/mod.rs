//! REST API server for lexplain.
//!
//! Provides HTTP endpoints for:
//! - Document upload and text extraction
//! - AI-backed analysis (segmentation, simplification, rights detection)
//! - Translation
//! - Courtroom audio transcription and summarization
//! - Session audit logs

pub mod error;
pub mod routes;

use crate::analysis::Analyzer;
use crate::audit::AuditRecorder;
use crate::config::ServerConfig;
use crate::transcribe::TranscriptionProvider;
use anyhow::Result;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::HeaderValue;
use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// Uploads larger than this are rejected outright.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Dependencies shared by all request handlers, wired once at startup.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
    pub transcriber: Arc<dyn TranscriptionProvider>,
    pub audit: AuditRecorder,
}

pub struct ApiServer {
    port: u16,
    cors: CorsLayer,
    state: AppState,
}

impl ApiServer {
    pub fn new(state: AppState, config: &ServerConfig) -> Self {
        Self {
            port: config.port,
            cors: build_cors(&config.cors_allowed_origins),
            state,
        }
    }

    pub async fn start(self) -> Result<()> {
        let app = router(self.state, self.cors);

        let listener = tokio::net::TcpListener::bind(&format!("127.0.0.1:{}", self.port)).await?;

        info!("API server listening on http://127.0.0.1:{}", self.port);
        info!("Endpoints:");
        info!("  GET  /               - Service info");
        info!("  GET  /version        - Version info");
        info!("  POST /api/upload     - Upload a document, get extracted text");
        info!("  POST /api/analyze    - Segment, simplify and detect rights");
        info!("  POST /api/translate  - Translate text to a target language");
        info!("  POST /api/simplify   - Plain-language summary of text");
        info!("  POST /api/audio      - Upload courtroom audio, get transcript + summary");
        info!("  GET  /api/logs       - Audit log for the current session");

        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// Assemble the full router. Split out from [`ApiServer::start`] so tests
/// can drive it without binding a socket.
pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(status))
        .route("/version", get(version))
        .nest(
            "/api",
            routes::documents::router()
                .merge(routes::analysis::router())
                .merge(routes::audio::router())
                .merge(routes::logs::router()),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state)
}

fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin in config: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "service": "lexplain",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "session_id": state.audit.session_id(),
    }))
}

async fn version() -> Json<Value> {
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "name": "lexplain"
    }))
}
