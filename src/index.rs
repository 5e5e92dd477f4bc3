//! The vector index: cosine-similarity search plus snapshot persistence.
//!
//! The index owns every `(Chunk, embedding)` pair produced by ingestion.
//! Once built it is read-only; a rebuild replaces the whole index. The
//! on-disk snapshot is a directory holding `index.meta.json` (a
//! self-describing header: format version, embedding model id,
//! dimensionality, entry count, payload checksum) and `index.bin` (the
//! bincode-encoded entries). The meta file is what lets a later process
//! distinguish "this snapshot is from another configuration" from "this
//! snapshot is damaged".

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::document::{Chunk, SearchHit};
use crate::error::{RagError, Result};

/// Bumped whenever the payload encoding changes.
const SNAPSHOT_FORMAT_VERSION: u32 = 1;

const META_FILE: &str = "index.meta.json";
const PAYLOAD_FILE: &str = "index.bin";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    chunk: Chunk,
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotMeta {
    format_version: u32,
    model_id: String,
    dimensions: usize,
    entry_count: usize,
    payload_sha256: String,
}

/// An in-memory nearest-neighbor index over embedded chunks.
#[derive(Debug)]
pub struct VectorIndex {
    dimensions: usize,
    model_id: String,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Build a fresh index from parallel chunk and embedding sequences.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if the sequences differ in length or
    /// any embedding does not have `dimensions` components.
    pub fn build(
        chunks: Vec<Chunk>,
        embeddings: Vec<Vec<f32>>,
        dimensions: usize,
        model_id: impl Into<String>,
    ) -> Result<Self> {
        if chunks.len() != embeddings.len() {
            return Err(RagError::Config(format!(
                "chunk/embedding count mismatch: {} chunks, {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }
        for embedding in &embeddings {
            if embedding.len() != dimensions {
                return Err(RagError::Config(format!(
                    "embedding dimensionality mismatch: expected {dimensions}, got {}",
                    embedding.len()
                )));
            }
        }

        let entries = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry { chunk, embedding })
            .collect();

        Ok(Self { dimensions, model_id: model_id.into(), entries })
    }

    /// Number of indexed chunks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimensionality of the stored embeddings.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Identifier of the embedding model the index was built with.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Return the `top_k` chunks nearest to `query` by cosine similarity,
    /// highest score first.
    ///
    /// Ordering is deterministic for a fixed index and query: ties keep
    /// ingestion order (the sort is stable).
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `query` has the wrong
    /// dimensionality.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>> {
        if query.len() != self.dimensions {
            return Err(RagError::Config(format!(
                "query embedding has {} dimensions, index expects {}",
                query.len(),
                self.dimensions
            )));
        }

        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .map(|entry| SearchHit {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(&entry.embedding, query),
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(top_k);
        Ok(hits)
    }

    /// Whether a snapshot (valid or not) is present at `dir`.
    pub fn snapshot_exists(dir: &Path) -> bool {
        dir.join(META_FILE).exists() || dir.join(PAYLOAD_FILE).exists()
    }

    /// Persist the index to `dir`, overwriting any prior snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::SnapshotWrite`] on any filesystem or encoding
    /// failure.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let write_err =
            |e: &dyn std::fmt::Display| RagError::SnapshotWrite { message: e.to_string() };

        fs::create_dir_all(dir).map_err(|e| write_err(&e))?;

        let payload = bincode::serialize(&self.entries).map_err(|e| write_err(&e))?;
        let meta = SnapshotMeta {
            format_version: SNAPSHOT_FORMAT_VERSION,
            model_id: self.model_id.clone(),
            dimensions: self.dimensions,
            entry_count: self.entries.len(),
            payload_sha256: hex_sha256(&payload),
        };
        let meta_json = serde_json::to_vec_pretty(&meta).map_err(|e| write_err(&e))?;

        fs::write(dir.join(PAYLOAD_FILE), payload).map_err(|e| write_err(&e))?;
        fs::write(dir.join(META_FILE), meta_json).map_err(|e| write_err(&e))?;

        info!(dir = %dir.display(), entries = self.entries.len(), "snapshot saved");
        Ok(())
    }

    /// Load a snapshot from `dir`, validating it against the current
    /// embedding configuration.
    ///
    /// # Errors
    ///
    /// - [`RagError::SnapshotIncompatible`] when the snapshot parses but
    ///   was written with a different format version, model, or
    ///   dimensionality. Callers must not paper over this by rebuilding.
    /// - [`RagError::SnapshotCorrupt`] when any file is unreadable, fails
    ///   its checksum, or does not decode. Callers may rebuild.
    pub fn load(dir: &Path, expected_dimensions: usize, expected_model: &str) -> Result<Self> {
        let corrupt = |message: String| RagError::SnapshotCorrupt { message };

        let meta_bytes = fs::read(dir.join(META_FILE))
            .map_err(|e| corrupt(format!("cannot read {META_FILE}: {e}")))?;
        let meta: SnapshotMeta = serde_json::from_slice(&meta_bytes)
            .map_err(|e| corrupt(format!("cannot parse {META_FILE}: {e}")))?;

        if meta.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(RagError::SnapshotIncompatible {
                message: format!(
                    "snapshot format version {} (current is {SNAPSHOT_FORMAT_VERSION})",
                    meta.format_version
                ),
            });
        }
        if meta.model_id != expected_model {
            return Err(RagError::SnapshotIncompatible {
                message: format!(
                    "snapshot built with model '{}', current model is '{expected_model}'",
                    meta.model_id
                ),
            });
        }
        if meta.dimensions != expected_dimensions {
            return Err(RagError::SnapshotIncompatible {
                message: format!(
                    "snapshot has {}-dimensional embeddings, current model produces {expected_dimensions}",
                    meta.dimensions
                ),
            });
        }

        let payload = fs::read(dir.join(PAYLOAD_FILE))
            .map_err(|e| corrupt(format!("cannot read {PAYLOAD_FILE}: {e}")))?;
        let checksum = hex_sha256(&payload);
        if checksum != meta.payload_sha256 {
            return Err(corrupt(format!(
                "payload checksum mismatch: expected {}, got {checksum}",
                meta.payload_sha256
            )));
        }

        let entries: Vec<IndexEntry> = bincode::deserialize(&payload)
            .map_err(|e| corrupt(format!("cannot decode {PAYLOAD_FILE}: {e}")))?;
        if entries.len() != meta.entry_count {
            return Err(corrupt(format!(
                "entry count mismatch: meta says {}, payload has {}",
                meta.entry_count,
                entries.len()
            )));
        }

        info!(dir = %dir.display(), entries = entries.len(), "snapshot loaded");
        Ok(Self { dimensions: meta.dimensions, model_id: meta.model_id, entries })
    }
}

/// Lowercase hex SHA-256 digest of `bytes`.
fn hex_sha256(bytes: &[u8]) -> String {
    Sha256::digest(bytes).iter().map(|b| format!("{b:02x}")).collect()
}

/// Cosine similarity between two vectors of equal length.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
