//! Index store: the load-or-build snapshot lifecycle.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::chunking::TextSplitter;
use crate::corpus;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::VectorIndex;

/// Outcome of probing the snapshot directory, evaluated once per
/// [`ensure_index`](IndexStore::ensure_index) call.
enum SnapshotState {
    /// No snapshot on disk.
    Absent,
    /// A snapshot that loaded and matches the current embedding
    /// configuration.
    PresentValid(VectorIndex),
    /// A snapshot that exists but is damaged. Safe to rebuild over.
    PresentCorrupt(String),
}

/// Owns the persisted index: loads a valid snapshot when one exists,
/// otherwise builds a fresh index from the corpus and persists it.
pub struct IndexStore {
    snapshot_dir: PathBuf,
    corpus_paths: Vec<PathBuf>,
    splitter: TextSplitter,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl IndexStore {
    /// Create a store over the given snapshot location and corpus paths.
    pub fn new(
        snapshot_dir: impl Into<PathBuf>,
        corpus_paths: Vec<PathBuf>,
        splitter: TextSplitter,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self { snapshot_dir: snapshot_dir.into(), corpus_paths, splitter, embedder }
    }

    /// Location of the persisted snapshot.
    pub fn snapshot_dir(&self) -> &Path {
        &self.snapshot_dir
    }

    /// Produce a ready index: load the snapshot if a valid one exists,
    /// otherwise rebuild from the corpus.
    ///
    /// The whole algorithm runs on every call; there is no diffing against
    /// a previous corpus. A corrupt snapshot is logged and rebuilt over; an
    /// incompatible one (different model, dimensionality, or format
    /// version) fails hard so a real configuration change is never papered
    /// over.
    ///
    /// # Errors
    ///
    /// - [`RagError::NoData`] when the corpus has no loadable documents.
    /// - [`RagError::SnapshotIncompatible`] as described above.
    /// - [`RagError::UpstreamFailure`] when embedding fails.
    pub async fn ensure_index(&self) -> Result<VectorIndex> {
        match self.probe_snapshot()? {
            SnapshotState::PresentValid(index) => {
                info!(chunks = index.len(), "loaded existing index from snapshot");
                return Ok(index);
            }
            SnapshotState::PresentCorrupt(message) => {
                warn!(%message, "snapshot unusable, rebuilding from corpus");
            }
            SnapshotState::Absent => {
                info!(dir = %self.snapshot_dir.display(), "no snapshot found, building index");
            }
        }
        self.build_and_persist().await
    }

    fn probe_snapshot(&self) -> Result<SnapshotState> {
        if !VectorIndex::snapshot_exists(&self.snapshot_dir) {
            return Ok(SnapshotState::Absent);
        }
        match VectorIndex::load(
            &self.snapshot_dir,
            self.embedder.dimensions(),
            self.embedder.model_id(),
        ) {
            Ok(index) => Ok(SnapshotState::PresentValid(index)),
            Err(RagError::SnapshotCorrupt { message }) => {
                Ok(SnapshotState::PresentCorrupt(message))
            }
            Err(e) => Err(e),
        }
    }

    async fn build_and_persist(&self) -> Result<VectorIndex> {
        let chunks = match corpus::assemble(&self.corpus_paths, &self.splitter) {
            Ok(chunks) => chunks,
            Err(RagError::EmptyCorpus) => {
                error!("no documents could be loaded, cannot build index");
                return Err(RagError::NoData);
            }
            Err(e) => return Err(e),
        };

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let index = VectorIndex::build(
            chunks,
            embeddings,
            self.embedder.dimensions(),
            self.embedder.model_id(),
        )?;

        // A failed save leaves the in-memory index fully usable.
        if let Err(e) = index.save(&self.snapshot_dir) {
            warn!(dir = %self.snapshot_dir.display(), error = %e, "failed to persist snapshot");
        }

        info!(chunks = index.len(), "built fresh index from corpus");
        Ok(index)
    }
}
