//! Retrieval-answer pipeline: validate → embed → search → answer → cite.

use std::sync::Arc;

use tracing::{error, info};

use crate::document::{preview_text, QueryResult, SourcePreview};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::VectorIndex;
use crate::llm::AnswerModel;

/// Answers questions against a ready [`VectorIndex`].
///
/// Retrieval is top-K cosine search; answer generation stuffs all K
/// retrieved chunks into a single model call. The first `source_count`
/// chunks become citation previews.
pub struct AnswerPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    model: Arc<dyn AnswerModel>,
    top_k: usize,
    source_count: usize,
    preview_chars: usize,
}

impl AnswerPipeline {
    /// Create a pipeline with the given providers and retrieval knobs.
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        model: Arc<dyn AnswerModel>,
        top_k: usize,
        source_count: usize,
        preview_chars: usize,
    ) -> Self {
        Self { embedder, model, top_k, source_count, preview_chars }
    }

    /// Answer `question` using `index` for retrieval.
    ///
    /// # Errors
    ///
    /// - [`RagError::EmptyQuery`] for empty or whitespace-only questions,
    ///   checked before any upstream call.
    /// - [`RagError::UpstreamFailure`] when the embedding or model call
    ///   fails.
    /// - [`RagError::Config`] when the question's embedding does not match
    ///   the index dimensionality.
    pub async fn answer(&self, question: &str, index: &VectorIndex) -> Result<QueryResult> {
        let question = question.trim();
        if question.is_empty() {
            return Err(RagError::EmptyQuery);
        }

        let query_embedding = self.embedder.embed(question).await.map_err(|e| match e {
            e @ RagError::UpstreamFailure { .. } | e @ RagError::Config(_) => e,
            other => {
                error!(error = %other, "query embedding failed");
                RagError::UpstreamFailure { stage: "embedding".into(), message: other.to_string() }
            }
        })?;

        let hits = index.search(&query_embedding, self.top_k)?;

        let context: Vec<_> = hits.iter().map(|h| h.chunk.clone()).collect();
        let answer = self.model.answer(question, &context).await.map_err(|e| match e {
            e @ RagError::UpstreamFailure { .. } => e,
            other => {
                error!(error = %other, "answer generation failed");
                RagError::UpstreamFailure { stage: "llm".into(), message: other.to_string() }
            }
        })?;

        let sources = hits
            .iter()
            .take(self.source_count)
            .enumerate()
            .map(|(i, hit)| SourcePreview {
                rank: i + 1,
                page_or_row: hit.chunk.provenance,
                preview: preview_text(&hit.chunk.text, self.preview_chars),
            })
            .collect();

        info!(retrieved = hits.len(), "query answered");
        Ok(QueryResult { answer: answer.trim().to_string(), sources })
    }
}
