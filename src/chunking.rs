//! Document chunking.
//!
//! Provides the [`Chunker`] trait and [`FixedWindowChunker`], which splits
//! text into overlapping fixed-size windows. Windows carry no embeddings;
//! those are attached later by the ingestion pipeline.

use crate::error::{Error, Result};

/// A strategy for splitting document text into ordered windows.
///
/// Returns an empty `Vec` for empty text. Window start offsets are
/// monotonically non-decreasing and consecutive windows overlap by the
/// configured overlap length (except possibly the final window).
pub trait Chunker: Send + Sync {
    /// Split text into ordered windows.
    fn chunk(&self, text: &str) -> Vec<String>;
}

/// Splits text into fixed-size windows by character count with overlap.
///
/// Each window covers `text[start..min(start + chunk_size, len)]` and the
/// next window starts at `end - overlap`. The walk stops once the next
/// start would not advance, so the final window may be shorter and may sit
/// inside the previous one.
///
/// # Example
///
/// ```rust,ignore
/// use chatfolio::FixedWindowChunker;
///
/// let chunker = FixedWindowChunker::new(1000, 200)?;
/// let windows = chunker.chunk(&document_text);
/// ```
#[derive(Debug, Clone)]
pub struct FixedWindowChunker {
    chunk_size: usize,
    overlap: usize,
}

impl FixedWindowChunker {
    /// Create a new `FixedWindowChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] unless `0 < overlap < chunk_size`;
    /// anything else would stall the window walk.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if overlap == 0 || overlap >= chunk_size {
            return Err(Error::InvalidConfig(format!(
                "overlap ({overlap}) must be greater than zero and less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    /// The configured window size in bytes.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// The configured overlap in bytes.
    pub fn overlap(&self) -> usize {
        self.overlap
    }
}

/// Snap a byte offset forward to the nearest char boundary.
///
/// Offsets are byte-based; multi-byte characters shift window edges forward
/// by at most three bytes.
fn snap_to_boundary(text: &str, mut offset: usize) -> usize {
    while offset < text.len() && !text.is_char_boundary(offset) {
        offset += 1;
    }
    offset.min(text.len())
}

impl Chunker for FixedWindowChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        if text.len() <= self.chunk_size {
            return vec![text.to_string()];
        }

        let mut windows = Vec::new();
        let mut start = 0;

        loop {
            let end = snap_to_boundary(text, (start + self.chunk_size).min(text.len()));
            windows.push(text[start..end].to_string());

            // end - overlap cannot underflow: end >= chunk_size > overlap here
            let next = snap_to_boundary(text, end - self.overlap);
            if next <= start || next >= text.len() {
                break;
            }
            start = next;
        }

        windows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_overlap() {
        assert!(FixedWindowChunker::new(1000, 0).is_err());
        assert!(FixedWindowChunker::new(1000, 1000).is_err());
        assert!(FixedWindowChunker::new(200, 1000).is_err());
        assert!(FixedWindowChunker::new(1000, 999).is_ok());
    }

    #[test]
    fn multibyte_text_never_panics() {
        let chunker = FixedWindowChunker::new(10, 3).unwrap();
        let text = "héllo wörld émoji 🦀 ".repeat(20);
        let windows = chunker.chunk(&text);
        assert!(!windows.is_empty());
        let total: usize = windows.iter().map(String::len).sum();
        assert!(total >= text.len());
    }
}
