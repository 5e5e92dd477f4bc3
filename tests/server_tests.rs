//! Router tests: status-code mapping and body shapes.

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use ragserve::document::Chunk;
use ragserve::{server, AnswerModel, EmbeddingProvider, RagService, Result, ServiceConfig};
use tower::ServiceExt;

const DIM: usize = 4;

struct StubEmbedder;

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.1f32; DIM];
        v[0] += text.len() as f32;
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        DIM
    }

    fn model_id(&self) -> &str {
        "stub-embedder"
    }
}

struct StubModel;

#[async_trait]
impl AnswerModel for StubModel {
    async fn answer(&self, _question: &str, _context: &[Chunk]) -> Result<String> {
        Ok("a fine pairing".to_string())
    }
}

fn service_with_corpus(dir: &tempfile::TempDir) -> Arc<RagService> {
    let csv = dir.path().join("rows.csv");
    let mut file = std::fs::File::create(&csv).unwrap();
    writeln!(file, "wine,dish").unwrap();
    writeln!(file, "Merlot,duck").unwrap();

    let config = ServiceConfig::builder()
        .corpus_paths(vec![csv])
        .snapshot_dir(dir.path().join("snap"))
        .build()
        .unwrap();
    Arc::new(RagService::new(config, Arc::new(StubEmbedder), Arc::new(StubModel)))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_uninitialized_then_initialized() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_with_corpus(&dir);
    let app = server::router(Arc::clone(&service));

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["initialized"], false);

    service.initialize().await.unwrap();

    let response = app
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["initialized"], true);
}

#[tokio::test]
async fn initialize_endpoint_reports_chunk_count() {
    let dir = tempfile::tempdir().unwrap();
    let app = server::router(service_with_corpus(&dir));

    let response = app.oneshot(post_json("/api/initialize", "{}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["chunks_indexed"], 1);
}

#[tokio::test]
async fn empty_query_is_a_client_error() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_with_corpus(&dir);
    service.initialize().await.unwrap();
    let app = server::router(service);

    let response = app.oneshot(post_json("/api/query", r#"{"query": "   "}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn query_before_initialize_is_a_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let app = server::router(service_with_corpus(&dir));

    let response =
        app.oneshot(post_json("/api/query", r#"{"query": "what pairs with duck?"}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("not initialized"));
}

#[tokio::test]
async fn query_returns_answer_and_ranked_sources() {
    let dir = tempfile::tempdir().unwrap();
    let service = service_with_corpus(&dir);
    service.initialize().await.unwrap();
    let app = server::router(service);

    let response =
        app.oneshot(post_json("/api/query", r#"{"query": "what pairs with duck?"}"#)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["answer"], "a fine pairing");
    let sources = body["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0]["rank"], 1);
    assert!(sources[0]["preview"].as_str().unwrap().contains("Merlot"));
}
