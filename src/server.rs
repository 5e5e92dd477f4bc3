//! HTTP front end.
//!
//! A thin axum layer over [`RagService`]: it only (de)serializes request
//! and response bodies and maps error kinds to status codes. Client
//! mistakes (empty query) are 400s; everything the server cannot recover
//! from in-request (not initialized, no data, upstream failure) is a 500.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::RagError;
use crate::service::RagService;

#[derive(Debug, Deserialize)]
struct QueryRequest {
    query: String,
}

/// Map an error to the status code the HTTP contract promises.
fn status_for(error: &RagError) -> StatusCode {
    match error {
        RagError::EmptyQuery => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: &RagError) -> Response {
    (status_for(error), Json(json!({ "error": error.to_string() }))).into_response()
}

async fn health(State(service): State<Arc<RagService>>) -> Response {
    let health = service.health().await;
    Json(json!({ "status": "healthy", "initialized": health.initialized })).into_response()
}

async fn initialize(State(service): State<Arc<RagService>>) -> Response {
    match service.initialize().await {
        Ok(report) => {
            Json(json!({ "status": "success", "chunks_indexed": report.chunks_indexed }))
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

async fn query(State(service): State<Arc<RagService>>, Json(request): Json<QueryRequest>) -> Response {
    match service.query(&request.query).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Build the API router. CORS is permissive because the browser front end
/// is served from a different origin.
pub fn router(service: Arc<RagService>) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/initialize", post(initialize))
        .route("/api/query", post(query))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

/// Serve the API on `addr` until the process is stopped.
pub async fn serve(service: Arc<RagService>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, router(service)).await
}
