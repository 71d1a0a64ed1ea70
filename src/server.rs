//! HTTP API.
//!
//! - `POST /api/analyze`: score a base64 image, `{"image": "data:...;base64,..."}`
//! - `GET /api/health`, `GET /health`: liveness
//! - `GET /`: service description
//!
//! Every analysis failure is answered with `400 {"success": false, "error": ...}`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

use crate::config::ServerConfig;
use crate::detector::{Analysis, Detector};
use crate::error::Result;

/// Body of `POST /api/analyze`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Data URI or bare base64 image.
    pub image: String,
}

#[derive(Serialize)]
struct AnalyzeResponse {
    success: bool,
    #[serde(flatten)]
    analysis: Analysis,
}

/// Failure answered with `{"success": false, "error": ...}`.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "success": false, "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

/// Build the application router around a shared detector.
pub fn router(detector: Arc<Detector>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/api/health", get(health))
        .route("/api/analyze", post(analyze))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .with_state(detector)
}

async fn home() -> Json<Value> {
    Json(json!({
        "message": "AI Image Detector API",
        "status": "running",
        "endpoints": {
            "/api/health": "Health check",
            "/api/analyze": "POST - Analyze image"
        }
    }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "AI Detector API is running"
    }))
}

async fn analyze(
    State(detector): State<Arc<Detector>>,
    payload: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> std::result::Result<Json<AnalyzeResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "rejected analyze body");
        ApiError::bad_request(rejection.body_text())
    })?;

    // Pixel loops are CPU-bound; keep them off the async workers.
    let analysis = tokio::task::spawn_blocking(move || detector.analyze_data_uri(&request.image))
        .await
        .map_err(|e| ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("analysis task failed: {e}"),
        })?
        .map_err(|e| {
            tracing::info!(error = %e, "analyze request rejected");
            ApiError::bad_request(e.to_string())
        })?;

    tracing::info!(
        width = analysis.metadata.width,
        height = analysis.metadata.height,
        format = %analysis.metadata.format,
        confidence = analysis.confidence,
        is_ai = analysis.is_ai_generated,
        "analyzed image"
    );

    Ok(Json(AnalyzeResponse {
        success: true,
        analysis,
    }))
}

/// Bind `config.bind_addr()` and serve until Ctrl-C.
///
/// # Errors
///
/// Returns [`crate::Error::Io`] if the address cannot be bound or the server fails.
pub async fn serve(config: &ServerConfig) -> Result<()> {
    let detector = Arc::new(Detector::heuristic(config.variant));
    let app = router(Arc::clone(&detector), config.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        scorer = detector.scorer_name(),
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}
