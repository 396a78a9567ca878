//! Fixed-window document chunking.
//!
//! Splits a document into consecutive, non-overlapping windows of at most
//! `chunk_size` characters, preserving order through a position index. The
//! final window may be shorter. Boundaries are counted in Unicode scalar
//! values, never in bytes, so multi-byte text is never split mid-character.
//!
//! Windows intentionally carry no overlap; a window may split a sentence in
//! the middle. Callers that need semantic boundaries should segment before
//! chunking.

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A contiguous window of a document, paired with its position index.
///
/// Indexes start at zero and follow document order, so re-chunking the same
/// document with the same size always reproduces the same sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Zero-based position of this chunk within the document.
    pub index: usize,
    /// The chunk's text, at most `chunk_size` characters.
    pub text: String,
}

/// Errors produced while validating chunking input.
#[derive(Debug, Error, Diagnostic)]
pub enum ChunkingError {
    /// The requested window size cannot produce any chunks.
    #[error("chunk_size must be at least 1, got {got}")]
    #[diagnostic(
        code(ragentic::chunking::invalid_chunk_size),
        help("Pass a positive window size; 512 characters is a common default.")
    )]
    InvalidChunkSize { got: usize },
}

/// Lazily partitions `document` into windows of at most `chunk_size` characters.
///
/// The returned iterator is finite and deterministic: calling `chunk` again
/// with the same inputs yields an identical sequence. An empty document yields
/// zero chunks.
///
/// # Errors
///
/// Returns [`ChunkingError::InvalidChunkSize`] when `chunk_size` is zero,
/// before any chunk is produced.
///
/// # Examples
///
/// ```
/// use ragentic::chunking::chunk;
///
/// let chunks: Vec<String> = chunk("ABCDEFGHIJ", 3)
///     .unwrap()
///     .map(|c| c.text)
///     .collect();
/// assert_eq!(chunks, ["ABC", "DEF", "GHI", "J"]);
/// ```
pub fn chunk(document: &str, chunk_size: usize) -> Result<ChunkIter<'_>, ChunkingError> {
    if chunk_size == 0 {
        return Err(ChunkingError::InvalidChunkSize { got: chunk_size });
    }
    Ok(ChunkIter {
        rest: document,
        chunk_size,
        next_index: 0,
    })
}

/// Number of chunks `chunk` will produce for this document and window size.
///
/// Equals `ceil(character_count / chunk_size)`.
///
/// # Errors
///
/// Returns [`ChunkingError::InvalidChunkSize`] when `chunk_size` is zero.
pub fn chunk_count(document: &str, chunk_size: usize) -> Result<usize, ChunkingError> {
    if chunk_size == 0 {
        return Err(ChunkingError::InvalidChunkSize { got: chunk_size });
    }
    Ok(document.chars().count().div_ceil(chunk_size))
}

/// Iterator over the fixed-size windows of a document.
///
/// Produced by [`chunk`]. Implements [`ExactSizeIterator`], so the remaining
/// chunk count is always known up front.
#[derive(Clone, Debug)]
pub struct ChunkIter<'a> {
    rest: &'a str,
    chunk_size: usize,
    next_index: usize,
}

impl Iterator for ChunkIter<'_> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if self.rest.is_empty() {
            return None;
        }

        // Byte offset of the character boundary `chunk_size` chars in, or the
        // whole remainder for the final short window.
        let split = self
            .rest
            .char_indices()
            .nth(self.chunk_size)
            .map(|(offset, _)| offset)
            .unwrap_or(self.rest.len());

        let (window, tail) = self.rest.split_at(split);
        self.rest = tail;

        let chunk = Chunk {
            index: self.next_index,
            text: window.to_string(),
        };
        self.next_index += 1;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.rest.chars().count().div_ceil(self.chunk_size);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ChunkIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_ten_chars_into_windows_of_three() {
        let chunks: Vec<Chunk> = chunk("ABCDEFGHIJ", 3).unwrap().collect();

        assert_eq!(chunks.len(), 4);
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["ABC", "DEF", "GHI", "J"]);
        let indexes: Vec<usize> = chunks.iter().map(|c| c.index).collect();
        assert_eq!(indexes, [0, 1, 2, 3]);
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        let mut iter = chunk("", 5).unwrap();
        assert_eq!(iter.len(), 0);
        assert!(iter.next().is_none());
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let err = chunk("anything", 0).unwrap_err();
        assert!(matches!(err, ChunkingError::InvalidChunkSize { got: 0 }));

        let err = chunk_count("anything", 0).unwrap_err();
        assert!(matches!(err, ChunkingError::InvalidChunkSize { got: 0 }));
    }

    #[test]
    fn exact_multiple_has_no_short_tail() {
        let chunks: Vec<Chunk> = chunk("ABCDEF", 3).unwrap().collect();
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.text.chars().count() == 3));
    }

    #[test]
    fn window_larger_than_document_yields_single_chunk() {
        let chunks: Vec<Chunk> = chunk("short", 512).unwrap().collect();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "short");
    }

    #[test]
    fn windows_count_characters_not_bytes() {
        // Each of these is multi-byte in UTF-8.
        let chunks: Vec<Chunk> = chunk("héllo wörld", 4).unwrap().collect();

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "héll");
        assert_eq!(chunks[1].text, "o wö");
        assert_eq!(chunks[2].text, "rld");
    }

    #[test]
    fn rechunking_reproduces_the_same_sequence() {
        let doc = "The quick brown fox jumps over the lazy dog";
        let first: Vec<Chunk> = chunk(doc, 7).unwrap().collect();
        let second: Vec<Chunk> = chunk(doc, 7).unwrap().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn chunk_count_matches_ceiling_division() {
        assert_eq!(chunk_count("ABCDEFGHIJ", 3).unwrap(), 4);
        assert_eq!(chunk_count("ABCDEF", 3).unwrap(), 2);
        assert_eq!(chunk_count("", 5).unwrap(), 0);
        assert_eq!(chunk_count("a", 512).unwrap(), 1);
    }

    #[test]
    fn size_hint_tracks_consumption() {
        let mut iter = chunk("ABCDEFGHIJ", 3).unwrap();
        assert_eq!(iter.len(), 4);
        iter.next();
        assert_eq!(iter.len(), 3);
        iter.by_ref().for_each(drop);
        assert_eq!(iter.len(), 0);
    }
}
