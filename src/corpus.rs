//! Corpus assembly: many files, one ordered chunk sequence.

use std::path::Path;

use tracing::{info, warn};

use crate::chunking::TextSplitter;
use crate::document::Chunk;
use crate::error::{RagError, Result};
use crate::loader;

/// Load every path in order and concatenate the per-file chunk sequences.
///
/// Paths that do not exist, have an unsupported extension, or fail to parse
/// are logged and skipped; a single unreadable document never aborts the
/// assembly.
///
/// # Errors
///
/// Returns [`RagError::EmptyCorpus`] when no chunks were produced at all.
pub fn assemble<P: AsRef<Path>>(paths: &[P], splitter: &TextSplitter) -> Result<Vec<Chunk>> {
    let mut chunks = Vec::new();

    for path in paths {
        let path = path.as_ref();
        if !path.exists() {
            warn!(path = %path.display(), "corpus path does not exist, skipping");
            continue;
        }
        if !loader::is_supported(path) {
            warn!(path = %path.display(), "unsupported document format, skipping");
            continue;
        }
        match loader::load(path, splitter) {
            Ok(file_chunks) => {
                info!(path = %path.display(), chunks = file_chunks.len(), "loaded document");
                chunks.extend(file_chunks);
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load document, skipping");
            }
        }
    }

    if chunks.is_empty() {
        return Err(RagError::EmptyCorpus);
    }

    Ok(chunks)
}
