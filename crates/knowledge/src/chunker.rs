//! Separator-aware text chunking with overlap.
//!
//! Lengths and offsets are measured in characters, not bytes.

use pqrs_core::{AppError, AppResult};

/// Cut candidates, tried in priority order within each window.
pub const SEPARATORS: [&str; 6] = ["\n\n", "\n", ". ", "! ", "? ", " "];

/// Half-open character range of a chunk within its source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    pub start: usize,
    pub end: usize,
}

/// Splits document bodies into overlapping chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextChunker {
    chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker. `chunk_size` must be positive.
    pub fn new(chunk_size: usize, overlap: usize) -> AppResult<Self> {
        if chunk_size == 0 {
            return Err(AppError::Config(
                "chunk_size must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn overlap(&self) -> usize {
        self.overlap
    }

    /// Split `text` into ordered chunks.
    ///
    /// Text no longer than `chunk_size` (including empty text) yields a
    /// single chunk equal to the input.
    pub fn split(&self, text: &str) -> Vec<String> {
        let offsets = char_offsets(text);
        self.spans(text)
            .into_iter()
            .map(|span| text[offsets[span.start]..offsets[span.end]].to_string())
            .collect()
    }

    /// Character spans of the chunks `split` would produce.
    pub fn spans(&self, text: &str) -> Vec<ChunkSpan> {
        let offsets = char_offsets(text);
        let len = offsets.len() - 1;

        if len <= self.chunk_size {
            return vec![ChunkSpan { start: 0, end: len }];
        }

        let mut spans = Vec::with_capacity(len / self.chunk_size + 2);
        let mut start = 0;

        while start < len {
            let end = start + self.chunk_size;

            if end >= len {
                spans.push(ChunkSpan { start, end: len });
                break;
            }

            let cut = self.find_cut(text, &offsets, start, end);
            spans.push(ChunkSpan { start, end: cut });

            // Overlap never moves the window backwards past its own start.
            let next = cut.saturating_sub(self.overlap);
            start = if next <= start { cut } else { next };
        }

        tracing::trace!(
            "Split {} chars into {} chunks (size {}, overlap {})",
            len,
            spans.len(),
            self.chunk_size,
            self.overlap
        );

        spans
    }

    /// Cut point for the window `[start, end)`: just after the last
    /// occurrence of the highest-priority separator, or `end` if none.
    fn find_cut(&self, text: &str, offsets: &[usize], start: usize, end: usize) -> usize {
        let window = &text[offsets[start]..offsets[end]];

        for sep in SEPARATORS {
            if let Some(pos) = window.rfind(sep) {
                // Separators are ASCII, so their byte length is their char length.
                return start + window[..pos].chars().count() + sep.len();
            }
        }

        end
    }
}

/// Byte offset of every char boundary, plus the end of the string.
fn char_offsets(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect()
}
