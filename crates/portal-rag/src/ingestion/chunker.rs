//! Deterministic fixed-window text chunking
//!
//! Each document's page blocks are concatenated in ordinal order and cut into
//! character windows of `max_chunk_size` with `overlap` characters shared
//! between consecutive windows. Boundaries never span two documents, and the
//! same input always produces the same chunks.

use uuid::Uuid;

use crate::config::ChunkingConfig;
use crate::types::Chunk;

use super::parser::PageBlock;

/// Separator inserted between page blocks of the same document
const PAGE_SEPARATOR: char = '\n';

/// Text chunker with configurable window size and overlap
pub struct TextChunker {
    max_chunk_size: usize,
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker
    ///
    /// Overlap is clamped below the window size so windows always advance.
    pub fn new(config: &ChunkingConfig) -> Self {
        let max_chunk_size = config.max_chunk_size.max(1);
        Self {
            max_chunk_size,
            overlap: config.overlap.min(max_chunk_size - 1),
        }
    }

    /// Split one document's page blocks into chunks
    pub fn split(&self, document_id: Uuid, filename: &str, pages: &[PageBlock]) -> Vec<Chunk> {
        if pages.is_empty() {
            return Vec::new();
        }

        // Concatenate blocks, remembering which char span belongs to which
        // page ordinal so chunks can report their covering page range.
        let mut chars: Vec<char> = Vec::new();
        let mut spans: Vec<(usize, usize, u32)> = Vec::new();

        for (i, page) in pages.iter().enumerate() {
            if i > 0 {
                chars.push(PAGE_SEPARATOR);
            }
            let start = chars.len();
            chars.extend(page.text.chars());
            spans.push((start, chars.len(), page.ordinal));
        }

        if chars.is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut start = 0usize;
        let mut chunk_index = 0u32;

        loop {
            let end = (start + self.max_chunk_size).min(chars.len());
            let text: String = chars[start..end].iter().collect();

            chunks.push(Chunk {
                id: Uuid::new_v4(),
                document_id,
                filename: filename.to_string(),
                text,
                page_start: page_at(&spans, start),
                page_end: page_at(&spans, end.saturating_sub(1)),
                chunk_index,
            });
            chunk_index += 1;

            if end == chars.len() {
                break;
            }
            start = end - self.overlap;
        }

        chunks
    }
}

/// Ordinal of the page covering a character position
fn page_at(spans: &[(usize, usize, u32)], pos: usize) -> Option<u32> {
    spans
        .iter()
        .find(|(start, end, _)| pos >= *start && pos < *end)
        .or_else(|| spans.iter().rev().find(|(start, _, _)| pos >= *start))
        .map(|(_, _, ordinal)| *ordinal)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(size: usize, overlap: usize) -> TextChunker {
        TextChunker::new(&ChunkingConfig {
            max_chunk_size: size,
            overlap,
        })
    }

    fn block(ordinal: u32, text: &str) -> PageBlock {
        PageBlock {
            ordinal,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_short_block_yields_exactly_one_chunk() {
        let chunks = chunker(1000, 300).split(Uuid::new_v4(), "a.txt", &[block(1, "tiny")]);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "tiny");
        assert_eq!(chunks[0].page_start, Some(1));
        assert_eq!(chunks[0].page_end, Some(1));
    }

    #[test]
    fn test_split_is_deterministic() {
        let pages = vec![block(1, &"abcdefghij".repeat(50)), block(2, "tail text")];
        let doc_id = Uuid::new_v4();

        let a = chunker(100, 30).split(doc_id, "a.txt", &pages);
        let b = chunker(100, 30).split(doc_id, "a.txt", &pages);

        let texts_a: Vec<&str> = a.iter().map(|c| c.text.as_str()).collect();
        let texts_b: Vec<&str> = b.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts_a, texts_b);
    }

    #[test]
    fn test_windows_respect_size_and_overlap() {
        let text = "x".repeat(250);
        let chunks = chunker(100, 30).split(Uuid::new_v4(), "a.txt", &[block(1, &text)]);

        assert!(chunks.iter().all(|c| c.char_len() <= 100));
        assert!(!chunks.iter().any(|c| c.text.is_empty()));

        // Consecutive windows share exactly the configured overlap
        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].text.chars().collect();
            let next: Vec<char> = pair[1].text.chars().collect();
            let tail: String = prev[prev.len() - 30..].iter().collect();
            let head: String = next[..30].iter().collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn test_chunk_indexes_are_sequential() {
        let text = "y".repeat(500);
        let chunks = chunker(100, 20).split(Uuid::new_v4(), "a.txt", &[block(1, &text)]);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.chunk_index, i as u32);
        }
    }

    #[test]
    fn test_blocks_combine_into_one_chunk_when_short() {
        // Blank page 2 was omitted upstream; pages 1 and 3 fit one window
        let pages = vec![block(1, "Intro text"), block(3, "Conclusion text")];
        let chunks = chunker(1000, 300).split(Uuid::new_v4(), "doc.pdf", &pages);

        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].text.contains("Intro text"));
        assert!(chunks[0].text.contains("Conclusion text"));
        assert_eq!(chunks[0].page_start, Some(1));
        assert_eq!(chunks[0].page_end, Some(3));
    }

    #[test]
    fn test_page_range_tracks_window_position() {
        let pages = vec![block(1, &"a".repeat(90)), block(2, &"b".repeat(90))];
        let chunks = chunker(100, 10).split(Uuid::new_v4(), "doc.pdf", &pages);

        assert!(chunks.len() >= 2);
        assert_eq!(chunks[0].page_start, Some(1));
        assert_eq!(chunks.last().unwrap().page_end, Some(2));
    }
}
