//! End-to-end facade tests with stub embedding and answer providers.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use ragserve::document::{Chunk, Provenance};
use ragserve::{
    AnswerModel, EmbeddingProvider, RagError, RagService, Result, ServiceConfig,
};

const DIM: usize = 8;

/// Deterministic text-hash embedder that counts upstream calls.
struct StubEmbedder {
    calls: Arc<AtomicUsize>,
}

fn hash_embedding(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; DIM];
    for (i, byte) in text.bytes().enumerate() {
        v[i % DIM] += f32::from(byte) / 255.0;
    }
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

#[async_trait]
impl EmbeddingProvider for StubEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(hash_embedding(text))
    }

    fn dimensions(&self) -> usize {
        DIM
    }

    fn model_id(&self) -> &str {
        "stub-embedder"
    }
}

/// Canned answer model that counts upstream calls.
struct StubModel {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl AnswerModel for StubModel {
    async fn answer(&self, question: &str, context: &[Chunk]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("answer to '{question}' from {} chunks", context.len()))
    }
}

struct Fixture {
    service: RagService,
    embed_calls: Arc<AtomicUsize>,
    llm_calls: Arc<AtomicUsize>,
}

fn write_ten_row_csv(dir: &Path) -> PathBuf {
    let path = dir.join("pairings.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "wine,dish").unwrap();
    for i in 0..10 {
        writeln!(file, "wine{i},dish{i}").unwrap();
    }
    path
}

fn make_service(
    corpus: Vec<PathBuf>,
    snapshot_dir: &Path,
    embed_calls: Arc<AtomicUsize>,
    llm_calls: Arc<AtomicUsize>,
) -> Fixture {
    let config = ServiceConfig::builder()
        .corpus_paths(corpus)
        .snapshot_dir(snapshot_dir)
        .build()
        .unwrap();
    let service = RagService::new(
        config,
        Arc::new(StubEmbedder { calls: Arc::clone(&embed_calls) }),
        Arc::new(StubModel { calls: Arc::clone(&llm_calls) }),
    );
    Fixture { service, embed_calls, llm_calls }
}

fn fixture(corpus: Vec<PathBuf>, snapshot_dir: &Path) -> Fixture {
    make_service(corpus, snapshot_dir, Arc::new(AtomicUsize::new(0)), Arc::new(AtomicUsize::new(0)))
}

#[tokio::test]
async fn initialize_reports_one_chunk_per_csv_row() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_ten_row_csv(dir.path());
    let f = fixture(vec![csv], &dir.path().join("snap"));

    let report = f.service.initialize().await.unwrap();
    assert_eq!(report.chunks_indexed, 10);
    assert!(f.service.health().await.initialized);
}

#[tokio::test]
async fn second_initialize_takes_the_fast_path() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_ten_row_csv(dir.path());
    let snap = dir.path().join("snap");

    let embed_calls = Arc::new(AtomicUsize::new(0));
    let llm_calls = Arc::new(AtomicUsize::new(0));

    let first =
        make_service(vec![csv.clone()], &snap, Arc::clone(&embed_calls), Arc::clone(&llm_calls));
    first.service.initialize().await.unwrap();
    let calls_after_build = embed_calls.load(Ordering::SeqCst);
    assert_eq!(calls_after_build, 10);

    // Same snapshot, fresh process: the load path must not re-embed.
    let second = make_service(vec![csv], &snap, Arc::clone(&embed_calls), llm_calls);
    let report = second.service.initialize().await.unwrap();
    assert_eq!(report.chunks_indexed, 10);
    assert_eq!(embed_calls.load(Ordering::SeqCst), calls_after_build);

    // And a repeat on the same service is also a pure load.
    second.service.initialize().await.unwrap();
    assert_eq!(embed_calls.load(Ordering::SeqCst), calls_after_build);
}

#[tokio::test]
async fn blank_queries_fail_without_upstream_calls() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_ten_row_csv(dir.path());
    let f = fixture(vec![csv], &dir.path().join("snap"));
    f.service.initialize().await.unwrap();
    let embeds_before = f.embed_calls.load(Ordering::SeqCst);

    for question in ["", "   "] {
        let err = f.service.query(question).await.unwrap_err();
        assert!(matches!(err, RagError::EmptyQuery));
    }

    assert_eq!(f.embed_calls.load(Ordering::SeqCst), embeds_before);
    assert_eq!(f.llm_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn query_before_initialize_is_not_initialized() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_ten_row_csv(dir.path());
    let f = fixture(vec![csv], &dir.path().join("snap"));

    let err = f.service.query("summarize row 3").await.unwrap_err();
    assert!(matches!(err, RagError::NotInitialized));
}

#[tokio::test]
async fn query_cites_rows_with_bounded_previews() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_ten_row_csv(dir.path());
    let f = fixture(vec![csv], &dir.path().join("snap"));
    f.service.initialize().await.unwrap();

    let result = f.service.query("summarize row 3").await.unwrap();
    assert!(result.answer.contains("5 chunks"));
    assert_eq!(result.sources.len(), 3);

    for (i, source) in result.sources.iter().enumerate() {
        assert_eq!(source.rank, i + 1);
        assert!(source.preview.chars().count() <= 200);
        assert!(!source.preview.contains('\n'));
        match source.page_or_row {
            Provenance::Row(row) => assert!(row < 10),
            Provenance::Page(_) => panic!("CSV corpus must cite rows"),
        }
    }

    assert_eq!(f.llm_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn corrupt_snapshot_triggers_a_successful_rebuild() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_ten_row_csv(dir.path());
    let snap = dir.path().join("snap");

    let f = fixture(vec![csv.clone()], &snap);
    f.service.initialize().await.unwrap();

    // Truncate the payload in place.
    let payload_path = snap.join("index.bin");
    let payload = std::fs::read(&payload_path).unwrap();
    std::fs::write(&payload_path, &payload[..payload.len() / 2]).unwrap();

    let embed_calls = Arc::new(AtomicUsize::new(0));
    let rebuilt =
        make_service(vec![csv], &snap, Arc::clone(&embed_calls), Arc::new(AtomicUsize::new(0)));
    let report = rebuilt.service.initialize().await.unwrap();
    assert_eq!(report.chunks_indexed, 10);
    assert_eq!(embed_calls.load(Ordering::SeqCst), 10);
}

#[tokio::test]
async fn empty_corpus_fails_initialization_with_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let f = fixture(vec![dir.path().join("missing.pdf")], &dir.path().join("snap"));

    let err = f.service.initialize().await.unwrap_err();
    assert!(matches!(err, RagError::NoData));
    assert!(!f.service.health().await.initialized);
}

#[tokio::test]
async fn failed_reinitialize_keeps_the_previous_index() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_ten_row_csv(dir.path());
    let snap = dir.path().join("snap");

    let f = fixture(vec![csv.clone()], &snap);
    f.service.initialize().await.unwrap();

    // Remove both the snapshot and the corpus so a re-run has nothing.
    std::fs::remove_dir_all(&snap).unwrap();
    std::fs::remove_file(&csv).unwrap();

    let err = f.service.initialize().await.unwrap_err();
    assert!(matches!(err, RagError::NoData));

    // The previously installed index still serves queries.
    assert!(f.service.health().await.initialized);
    assert!(f.service.query("still working?").await.is_ok());
}
