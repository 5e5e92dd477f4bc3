//! Configuration for the retrieval service.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for corpus ingestion and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    /// Source document paths, in ingestion order.
    pub corpus_paths: Vec<PathBuf>,
    /// Directory holding the persisted index snapshot.
    pub snapshot_dir: PathBuf,
    /// Number of chunks retrieved per query.
    pub top_k: usize,
    /// Number of retrieved chunks surfaced as source citations.
    pub source_count: usize,
    /// Maximum length of a citation preview, in characters.
    pub preview_chars: usize,
    /// Maximum chunk size for page-structured documents, in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks, in characters.
    pub chunk_overlap: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            corpus_paths: Vec::new(),
            snapshot_dir: PathBuf::from("vectorstore_db"),
            top_k: 5,
            source_count: 3,
            preview_chars: 200,
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl ServiceConfig {
    /// Create a new builder for constructing a [`ServiceConfig`].
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`ServiceConfig`].
#[derive(Debug, Clone, Default)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    /// Set the corpus document paths, in ingestion order.
    pub fn corpus_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.config.corpus_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Set the snapshot directory.
    pub fn snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.snapshot_dir = dir.into();
        self
    }

    /// Set the number of chunks retrieved per query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the number of retrieved chunks surfaced as citations.
    pub fn source_count(mut self, count: usize) -> Self {
        self.config.source_count = count;
        self
    }

    /// Set the maximum citation preview length in characters.
    pub fn preview_chars(mut self, chars: usize) -> Self {
        self.config.preview_chars = chars;
        self
    }

    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Build the [`ServiceConfig`], validating that parameters are
    /// consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `top_k == 0`
    /// - `source_count > top_k`
    /// - `preview_chars == 0`
    /// - `chunk_overlap >= chunk_size`
    pub fn build(self) -> Result<ServiceConfig> {
        let c = &self.config;
        if c.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        if c.source_count > c.top_k {
            return Err(RagError::Config(format!(
                "source_count ({}) must not exceed top_k ({})",
                c.source_count, c.top_k
            )));
        }
        if c.preview_chars == 0 {
            return Err(RagError::Config("preview_chars must be greater than zero".to_string()));
        }
        if c.chunk_overlap >= c.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                c.chunk_overlap, c.chunk_size
            )));
        }
        Ok(self.config)
    }
}
