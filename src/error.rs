//! Error types for the `ragserve` crate.

use thiserror::Error;

/// Errors that can occur across ingestion, index lifecycle, and query handling.
#[derive(Debug, Error)]
pub enum RagError {
    /// The file extension is not one of the supported document formats.
    #[error("Unsupported document format: {path}")]
    UnsupportedFormat {
        /// The offending path.
        path: String,
    },

    /// A document could not be opened or parsed.
    #[error("Failed to read document '{path}': {message}")]
    Read {
        /// The offending path.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// The assembled corpus contained no chunks.
    #[error("Corpus is empty: no loadable documents found")]
    EmptyCorpus,

    /// Index initialization failed because there is no data to index.
    #[error("Cannot build index: no document data available")]
    NoData,

    /// The persisted snapshot is unreadable or fails its integrity check.
    ///
    /// Recovered internally by falling back to a full rebuild.
    #[error("Snapshot is corrupt: {message}")]
    SnapshotCorrupt {
        /// A description of the failure.
        message: String,
    },

    /// The snapshot could not be written to disk.
    ///
    /// Logged by the index store; a freshly built in-memory index still
    /// serves queries.
    #[error("Failed to persist snapshot: {message}")]
    SnapshotWrite {
        /// A description of the failure.
        message: String,
    },

    /// The persisted snapshot was built with a different embedding
    /// configuration or snapshot format version.
    ///
    /// Fatal: rebuilding over it silently would mask a real configuration
    /// change.
    #[error("Snapshot is incompatible with the current configuration: {message}")]
    SnapshotIncompatible {
        /// A description of the mismatch.
        message: String,
    },

    /// The question was empty or whitespace-only.
    #[error("Query cannot be empty")]
    EmptyQuery,

    /// A query arrived before any successful initialization.
    #[error("RAG system not initialized")]
    NotInitialized,

    /// An external embedding or language-model call failed.
    #[error("Upstream failure during {stage}: {message}")]
    UpstreamFailure {
        /// The pipeline stage that failed (`"embedding"` or `"llm"`).
        stage: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
