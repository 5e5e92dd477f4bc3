//! Page-text splitting.
//!
//! PDF pages frequently exceed a useful retrieval-chunk size, so page text
//! is split hierarchically: paragraphs first, then sentences, then words.
//! Tabular rows are never split; they are already row-sized.

/// Splits text hierarchically (paragraphs → sentences → words) into pieces
/// of at most `chunk_size` characters with `chunk_overlap` characters of
/// overlap between consecutive pieces.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

/// Separators tried in order, coarsest first.
const SEPARATORS: [&str; 5] = ["\n\n", ". ", "! ", "? ", " "];

impl TextSplitter {
    /// Create a new `TextSplitter`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per piece
    /// * `chunk_overlap` — overlapping characters between consecutive pieces
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }

    /// Split `text` into ordered pieces.
    ///
    /// Returns an empty `Vec` for empty or whitespace-only input. Input
    /// shorter than `chunk_size` is returned as a single piece.
    pub fn split(&self, text: &str) -> Vec<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        split_and_merge(trimmed, self.chunk_size, self.chunk_overlap, &SEPARATORS)
    }
}

/// Split text by a separator, then merge segments into pieces that respect
/// `chunk_size`. A segment that still exceeds `chunk_size` is split further
/// with the next-level separator.
fn split_and_merge(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &[&str],
) -> Vec<String> {
    if text.len() <= chunk_size || separators.is_empty() {
        return split_by_size(text, chunk_size, chunk_overlap);
    }

    let separator = separators[0];
    let remaining = &separators[1..];

    let segments: Vec<&str> = if separator == " " {
        text.split(' ').collect()
    } else {
        split_keeping_separator(text, separator)
    };

    let mut pieces = Vec::new();
    let mut current = String::new();

    for segment in segments {
        if current.is_empty() {
            current = segment.to_string();
        } else if current.len() + segment.len() <= chunk_size {
            current.push_str(segment);
        } else {
            flush(&mut pieces, current, chunk_size, chunk_overlap, remaining);
            current = segment.to_string();
        }
    }

    if !current.is_empty() {
        flush(&mut pieces, current, chunk_size, chunk_overlap, remaining);
    }

    pieces
}

fn flush(
    pieces: &mut Vec<String>,
    current: String,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &[&str],
) {
    if current.len() > chunk_size {
        pieces.extend(split_and_merge(&current, chunk_size, chunk_overlap, separators));
    } else {
        pieces.push(current);
    }
}

/// Split text at a separator while keeping the separator attached to the
/// preceding segment.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

/// Character-based splitting with overlap, the last resort when no
/// separator level fits.
fn split_by_size(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let bytes = text.as_bytes();
    let mut pieces = Vec::new();
    let mut start = 0;

    while start < bytes.len() {
        let mut end = (start + chunk_size).min(bytes.len());
        while end < bytes.len() && !text.is_char_boundary(end) {
            end -= 1;
        }
        pieces.push(text[start..end].to_string());
        let step = chunk_size.saturating_sub(chunk_overlap);
        if step == 0 || end == bytes.len() {
            break;
        }
        start += step;
        while start < bytes.len() && !text.is_char_boundary(start) {
            start += 1;
        }
    }

    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_piece() {
        let splitter = TextSplitter::new(100, 20);
        assert_eq!(splitter.split("hello world"), vec!["hello world".to_string()]);
    }

    #[test]
    fn empty_text_yields_nothing() {
        let splitter = TextSplitter::new(100, 20);
        assert!(splitter.split("   \n ").is_empty());
    }

    #[test]
    fn long_text_splits_at_paragraphs() {
        let text = format!("{}\n\n{}", "a".repeat(60), "b".repeat(60));
        let splitter = TextSplitter::new(80, 10);
        let pieces = splitter.split(&text);
        assert!(pieces.len() >= 2);
        for piece in &pieces {
            assert!(piece.len() <= 80);
        }
    }

    #[test]
    fn pieces_preserve_input_order() {
        let text = format!("{}. {}. {}.", "first ".repeat(20), "second ".repeat(20), "third ".repeat(20));
        let splitter = TextSplitter::new(150, 0);
        let pieces = splitter.split(&text);
        let joined = pieces.join("");
        assert!(joined.find("first").unwrap() < joined.find("second").unwrap());
        assert!(joined.find("second").unwrap() < joined.find("third").unwrap());
    }
}
