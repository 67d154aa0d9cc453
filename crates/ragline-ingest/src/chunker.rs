//! Fixed-size character chunking
//!
//! Splits text into chunks of at most `chunk_size` characters, each chunk
//! after the first starting `overlap` characters before the end of the
//! previous one. No sentence or paragraph awareness; splits may fall
//! mid-word. Counts are characters, not bytes, so split points always land
//! on UTF-8 boundaries.

use ragline_core::{RaglineError, Result};

/// Character splitter with a fixed window and overlap
#[derive(Debug, Clone)]
pub struct CharacterSplitter {
    chunk_size: usize,
    overlap: usize,
}

impl CharacterSplitter {
    /// Create a splitter; the overlap must be smaller than the chunk size
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RaglineError::ConfigError(
                "chunk size must be positive".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(RaglineError::ConfigError(format!(
                "chunk overlap {overlap} must be smaller than chunk size {chunk_size}"
            )));
        }

        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Maximum chunk size in characters
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Overlap between consecutive chunks in characters
    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split text into overlapping chunks
    ///
    /// A text of at most `chunk_size` characters yields exactly one chunk
    /// equal to the full text; empty text yields no chunks. The output is
    /// deterministic for a given input.
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        // Byte offset of each character, plus the end of the string, so
        // windows can be sliced without walking the text repeatedly.
        let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        offsets.push(text.len());
        let char_count = offsets.len() - 1;

        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let end = usize::min(start + self.chunk_size, char_count);
            chunks.push(text[offsets[start]..offsets[end]].to_string());
            if end == char_count {
                break;
            }
            start = end - self.overlap;
        }

        chunks
    }
}

// ============================================================================
// Tests
// ============================================================================
