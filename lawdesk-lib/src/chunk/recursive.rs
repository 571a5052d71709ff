use std::hash::{DefaultHasher, Hash, Hasher};
use std::ops::Range;

use crate::chunk::{Chunk, ChunkMetadata, Chunker};
use crate::load::LegalDocument;
use crate::{Error, Result};

/// Separators tried from coarsest to finest. The empty separator means
/// character-level splitting.
const SEPARATORS: [&str; 5] = ["\n\n", "\n", ". ", " ", ""];

/// Recursive character chunker - splits on the coarsest natural boundary
///
/// Text is first cut into segments at paragraph breaks; segments that are
/// still too long are cut at line breaks, then sentence ends, then spaces,
/// then individual characters. Segments are packed greedily into chunks of at
/// most `chunk_size` characters, and each chunk after the first opens with the
/// last `chunk_overlap` characters of the one before it.
///
/// Sizes are counted in characters, not bytes.
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a chunker. The overlap must be smaller than the chunk size.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Validation("chunk size must be positive".into()));
        }
        if chunk_overlap >= chunk_size {
            return Err(Error::Validation(format!(
                "chunk overlap ({chunk_overlap}) must be smaller than chunk size ({chunk_size})"
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[must_use]
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into chunk byte ranges.
    fn spans(&self, text: &str) -> Vec<Range<usize>> {
        // every segment must fit next to a full overlap prefix
        let limit = self.chunk_size - self.chunk_overlap;
        let mut segments = Vec::new();
        split_segments(text, 0..text.len(), 0, limit, &mut segments);

        let mut spans = Vec::new();
        let mut start = 0;
        let mut end = 0;
        let mut len = 0;
        let mut has_new = false;

        for segment in segments {
            let seg_len = text[segment.clone()].chars().count();
            if has_new && len + seg_len > self.chunk_size {
                spans.push(start..end);
                start = back_chars(text, end, self.chunk_overlap);
                len = self.chunk_overlap;
                has_new = false;
            }
            end = segment.end;
            len += seg_len;
            has_new = true;
        }
        if has_new {
            spans.push(start..end);
        }

        spans
    }
}

impl Default for RecursiveChunker {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

impl Chunker for RecursiveChunker {
    fn name(&self) -> &str {
        "recursive"
    }

    fn chunk(&self, document: &LegalDocument) -> Vec<Chunk> {
        let text = document.combined_text.as_str();
        if text.trim().is_empty() {
            return Vec::new();
        }

        let spans = self.spans(text);
        let total = spans.len();

        spans
            .into_iter()
            .map(|span| {
                let content = &text[span.clone()];
                let position = text[..span.start].chars().count();
                Chunk {
                    id: generate_id(document, position, content),
                    content: content.to_owned(),
                    metadata: ChunkMetadata {
                        document: document.clone(),
                        position,
                        total_chunks: total,
                    },
                }
            })
            .collect()
    }
}

/// Recursively cut `range` of `text` into segments of at most `limit`
/// characters, starting from separator `level`. Separators stay attached to
/// the end of the segment they terminate, so the segments tile the range.
fn split_segments(text: &str, range: Range<usize>, level: usize, limit: usize, out: &mut Vec<Range<usize>>) {
    let piece = &text[range.clone()];
    if piece.chars().count() <= limit {
        out.push(range);
        return;
    }

    let (offset, separator) = SEPARATORS[level..]
        .iter()
        .enumerate()
        .find(|(_, sep)| sep.is_empty() || piece.contains(**sep))
        .map(|(i, sep)| (i, *sep))
        .unwrap_or((SEPARATORS.len() - 1 - level, ""));

    if separator.is_empty() {
        out.extend(
            piece
                .char_indices()
                .map(|(i, c)| range.start + i..range.start + i + c.len_utf8()),
        );
        return;
    }

    let next = level + offset + 1;
    let mut start = range.start;
    for (i, _) in piece.match_indices(separator) {
        let end = range.start + i + separator.len();
        split_segments(text, start..end, next, limit, out);
        start = end;
    }
    if start < range.end {
        split_segments(text, start..range.end, next, limit, out);
    }
}

/// Byte offset `n` characters before `end`.
fn back_chars(text: &str, end: usize, n: usize) -> usize {
    if n == 0 {
        return end;
    }
    text[..end]
        .char_indices()
        .rev()
        .nth(n - 1)
        .map_or(0, |(i, _)| i)
}

fn generate_id(document: &LegalDocument, position: usize, content: &str) -> String {
    let mut hasher = DefaultHasher::new();
    document.source.hash(&mut hasher);
    document.law_name.hash(&mut hasher);
    position.hash(&mut hasher);
    content.hash(&mut hasher);
    format!("{:x}", hasher.finish())
}
