//! Data types for chunks, retrieval hits, and query results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a chunk came from within its source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// 0-based page index within a paginated document.
    Page(usize),
    /// 0-based row index within a tabular file.
    Row(usize),
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Page(n) => write!(f, "page {n}"),
            Provenance::Row(n) => write!(f, "row {n}"),
        }
    }
}

/// A unit of retrievable text with provenance metadata.
///
/// Produced once at ingestion and immutable afterwards; chunks are owned by
/// the [`VectorIndex`](crate::index::VectorIndex) once it is built, and are
/// part of the persisted snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// The text content of the chunk.
    pub text: String,
    /// Path of the originating file.
    pub source: String,
    /// Page or row the chunk was taken from.
    pub provenance: Provenance,
}

/// A retrieved [`Chunk`] paired with a similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity to the query embedding (higher is more relevant).
    pub score: f32,
}

/// A citation entry in a [`QueryResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePreview {
    /// 1-based retrieval rank.
    pub rank: usize,
    /// Page or row of the cited chunk.
    pub page_or_row: Provenance,
    /// Chunk text truncated to the preview limit, newlines collapsed.
    pub preview: String,
}

/// The structured answer to a single question. Created per query, never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// The synthesized answer text.
    pub answer: String,
    /// Previews of the top-ranked supporting chunks, in retrieval order.
    pub sources: Vec<SourcePreview>,
}

/// Build a citation preview: trim, collapse embedded newlines to single
/// spaces, and truncate to at most `max_chars` characters.
pub fn preview_text(text: &str, max_chars: usize) -> String {
    let collapsed: String = text
        .trim()
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    collapsed.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_collapses_newlines() {
        assert_eq!(preview_text("a\nb\r\nc", 100), "a b  c");
    }

    #[test]
    fn preview_truncates_to_char_limit() {
        let long = "x".repeat(500);
        assert_eq!(preview_text(&long, 200).chars().count(), 200);
    }

    #[test]
    fn preview_respects_multibyte_boundaries() {
        let text = "é".repeat(300);
        let preview = preview_text(&text, 200);
        assert_eq!(preview.chars().count(), 200);
    }

    #[test]
    fn provenance_display() {
        assert_eq!(Provenance::Page(3).to_string(), "page 3");
        assert_eq!(Provenance::Row(0).to_string(), "row 0");
    }
}
