//! Service facade: the operations the HTTP and REPL front ends call.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::chunking::TextSplitter;
use crate::config::ServiceConfig;
use crate::document::QueryResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::VectorIndex;
use crate::llm::AnswerModel;
use crate::pipeline::AnswerPipeline;
use crate::store::IndexStore;

/// Result of a health probe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    /// Whether an index is currently held and queries can be served.
    pub initialized: bool,
}

/// Result of a successful initialization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InitReport {
    /// Number of chunks in the ready index.
    pub chunks_indexed: usize,
}

/// The process-wide retrieval service.
///
/// Holds the single current-index slot behind an async read-write lock:
/// queries clone the `Arc` under a read lock and search outside it, so
/// concurrent queries share the read-only index freely, while
/// [`initialize`](RagService::initialize) swaps the slot under a write
/// lock and an in-flight query never observes a half-replaced index.
pub struct RagService {
    store: IndexStore,
    pipeline: AnswerPipeline,
    index: RwLock<Option<Arc<VectorIndex>>>,
}

impl RagService {
    /// Assemble a service from configuration and providers.
    pub fn new(
        config: ServiceConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        model: Arc<dyn AnswerModel>,
    ) -> Self {
        let splitter = TextSplitter::new(config.chunk_size, config.chunk_overlap);
        let store = IndexStore::new(
            config.snapshot_dir.clone(),
            config.corpus_paths.clone(),
            splitter,
            Arc::clone(&embedder),
        );
        let pipeline = AnswerPipeline::new(
            embedder,
            model,
            config.top_k,
            config.source_count,
            config.preview_chars,
        );
        Self { store, pipeline, index: RwLock::new(None) }
    }

    /// Whether an index is currently held.
    pub async fn health(&self) -> Health {
        Health { initialized: self.index.read().await.is_some() }
    }

    /// Run the full load-or-build check and install the resulting index.
    ///
    /// Idempotent: with a valid snapshot present this is a cheap load; a
    /// repeat call never re-embeds the corpus. On failure any previously
    /// installed index is left in place.
    ///
    /// # Errors
    ///
    /// Propagates [`IndexStore::ensure_index`] errors ([`RagError::NoData`],
    /// [`RagError::SnapshotIncompatible`], [`RagError::UpstreamFailure`]).
    pub async fn initialize(&self) -> Result<InitReport> {
        let index = self.store.ensure_index().await?;
        let chunks_indexed = index.len();
        *self.index.write().await = Some(Arc::new(index));
        Ok(InitReport { chunks_indexed })
    }

    /// Answer a question against the currently held index.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmptyQuery`] for blank questions (checked even
    /// before the index slot, matching the HTTP contract) and
    /// [`RagError::NotInitialized`] when no successful
    /// [`initialize`](RagService::initialize) has run yet; otherwise
    /// propagates pipeline errors.
    pub async fn query(&self, question: &str) -> Result<QueryResult> {
        if question.trim().is_empty() {
            return Err(RagError::EmptyQuery);
        }
        let index = {
            let slot = self.index.read().await;
            slot.as_ref().map(Arc::clone).ok_or(RagError::NotInitialized)?
        };
        self.pipeline.answer(question, &index).await
    }
}
