//! Document chunking.
//!
//! Text is cut into fixed-size character windows with no regard for word or
//! sentence boundaries, which keeps every chunk's embedding cost uniform.

use crate::document::Chunk;
use crate::error::{RagError, Result};

/// A strategy for splitting document text into chunks.
pub trait Chunker: Send + Sync {
    /// Split text into chunks.
    ///
    /// Returns an empty `Vec` for empty text. Chunk positions start at zero
    /// and increase by one.
    fn chunk(&self, text: &str) -> Vec<Chunk>;
}

/// Splits text into fixed-size chunks by character count with optional overlap.
///
/// Sizes are counted in `char`s, so a chunk never ends inside a multi-byte
/// code point. With zero overlap the chunks concatenate back to the input.
///
/// # Example
///
/// ```rust
/// use docqa_rag::{Chunker, FixedSizeChunker};
///
/// let chunker = FixedSizeChunker::new(5, 0).unwrap();
/// let chunks = chunker.chunk("AAAA BBBB CCCC DDDD");
/// assert_eq!(chunks.len(), 4);
/// assert_eq!(chunks[3].text, "DDDD");
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` - maximum number of characters per chunk
    /// * `chunk_overlap` - number of characters shared by consecutive chunks
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `chunk_size` is zero or
    /// `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::ConfigError(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, text: &str) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of every char boundary, plus the end of the string.
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_count = boundaries.len() - 1;
        let step = self.chunk_size - self.chunk_overlap;

        let mut chunks = Vec::with_capacity(char_count.div_ceil(step));
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(char_count);
            chunks.push(Chunk {
                position: chunks.len(),
                start,
                text: text[boundaries[start]..boundaries[end]].to_string(),
            });
            if end == char_count {
                break;
            }
            start += step;
        }

        chunks
    }
}

/// Split `text` into consecutive, non-overlapping chunks of `size` characters.
///
/// # Errors
///
/// Returns [`RagError::ConfigError`] if `size` is zero.
pub fn chunk_text(text: &str, size: usize) -> Result<Vec<Chunk>> {
    Ok(FixedSizeChunker::new(size, 0)?.chunk(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_larger_than_text_yields_single_chunk() {
        let chunks = chunk_text("hello", 100).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "hello");
        assert_eq!(chunks[0].start, 0);
    }

    #[test]
    fn multibyte_text_is_split_on_char_boundaries() {
        let chunks = chunk_text("héllo wörld", 3).unwrap();
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["hél", "lo ", "wör", "ld"]);
        assert_eq!(chunks[2].start, 6);
    }

    #[test]
    fn overlap_repeats_trailing_characters() {
        let chunker = FixedSizeChunker::new(4, 2).unwrap();
        let texts: Vec<String> = chunker
            .chunk("abcdefgh")
            .into_iter()
            .map(|c| c.text)
            .collect();
        assert_eq!(texts, ["abcd", "cdef", "efgh"]);
    }

    #[test]
    fn overlap_last_chunk_reaches_end_of_text() {
        let chunker = FixedSizeChunker::new(4, 1).unwrap();
        let chunks = chunker.chunk("abcdefghij");
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["abcd", "defg", "ghij"]);
        assert_eq!(chunks.last().map(|c| c.position), Some(2));
    }

    #[test]
    fn zero_size_is_rejected() {
        assert!(matches!(
            chunk_text("abc", 0),
            Err(RagError::ConfigError(_))
        ));
        assert!(FixedSizeChunker::new(3, 3).is_err());
    }
}
