//! Document loading: files in, ordered chunks out.
//!
//! Two formats are supported. Page-structured PDFs are read with
//! `pdf_oxide` and split into page-sized-or-smaller chunks tagged with
//! their 0-based page index. Tabular CSV files become one chunk per row,
//! the text being `"column: value"` lines in header order, tagged with the
//! 0-based row index. Chunk order always follows page/row order because it
//! is surfaced later as citation order.

use std::path::Path;

use pdf_oxide::converters::ConversionOptions;
use pdf_oxide::PdfDocument;
use tracing::debug;

use crate::chunking::TextSplitter;
use crate::document::{Chunk, Provenance};
use crate::error::{RagError, Result};

/// Load a single document into an ordered sequence of chunks.
///
/// # Errors
///
/// Returns [`RagError::UnsupportedFormat`] for unrecognized extensions and
/// [`RagError::Read`] when the file cannot be opened or parsed.
pub fn load(path: &Path, splitter: &TextSplitter) -> Result<Vec<Chunk>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => load_pdf(path, splitter),
        "csv" => load_csv(path),
        _ => Err(RagError::UnsupportedFormat { path: path.display().to_string() }),
    }
}

/// Whether the loader recognizes this path's extension.
pub fn is_supported(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()).as_deref(),
        Some("pdf") | Some("csv")
    )
}

fn read_error(path: &Path, message: impl ToString) -> RagError {
    RagError::Read { path: path.display().to_string(), message: message.to_string() }
}

/// Extract PDF text page by page and split each page with `splitter`.
///
/// Pages with no extractable text are skipped.
fn load_pdf(path: &Path, splitter: &TextSplitter) -> Result<Vec<Chunk>> {
    let source = path.display().to_string();
    let doc = PdfDocument::open(&source).map_err(|e| read_error(path, e))?;
    let page_count = doc.page_count().map_err(|e| read_error(path, e))?;
    let options = ConversionOptions { include_images: false, ..ConversionOptions::default() };

    let mut chunks = Vec::new();
    for page_index in 0..page_count {
        let text = doc.to_markdown(page_index, &options).map_err(|e| read_error(path, e))?;
        for piece in splitter.split(&text) {
            chunks.push(Chunk {
                text: piece,
                source: source.clone(),
                provenance: Provenance::Page(page_index),
            });
        }
    }

    debug!(path = %source, pages = page_count, chunks = chunks.len(), "loaded pdf");
    Ok(chunks)
}

/// Read a CSV file into one chunk per row.
///
/// Each chunk's text is `"column: value"` for every column, one per line,
/// in the order the header declares them.
fn load_csv(path: &Path) -> Result<Vec<Chunk>> {
    let source = path.display().to_string();
    let mut reader = csv::Reader::from_path(path).map_err(|e| read_error(path, e))?;
    let headers = reader.headers().map_err(|e| read_error(path, e))?.clone();

    let mut chunks = Vec::new();
    for (row_index, record) in reader.records().enumerate() {
        let record = record.map_err(|e| read_error(path, e))?;
        let text = headers
            .iter()
            .zip(record.iter())
            .map(|(column, value)| format!("{column}: {value}"))
            .collect::<Vec<_>>()
            .join("\n");
        chunks.push(Chunk { text, source: source.clone(), provenance: Provenance::Row(row_index) });
    }

    debug!(path = %source, rows = chunks.len(), "loaded csv");
    Ok(chunks)
}
