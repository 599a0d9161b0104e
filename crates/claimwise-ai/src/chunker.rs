//! Recursive character splitter for policy documents.
//!
//! Splits on paragraph breaks first, then lines, then words, and only
//! falls back to raw character windows when a run of text has no
//! separators at all. Adjacent pieces are merged greedily up to the
//! chunk size, and consecutive chunks share a tail of whole pieces up
//! to the overlap size so clause boundaries are not lost at chunk edges.

/// Separator hierarchy, coarsest first.
const SEPARATORS: &[&str] = &["\n\n", "\n", " "];

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Splits raw policy text into overlapping chunks for embedding.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    chunk_size: usize,
    overlap: usize,
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE, DEFAULT_CHUNK_OVERLAP)
    }
}

impl Chunker {
    /// `overlap` must be smaller than `chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        assert!(
            overlap < chunk_size,
            "overlap ({overlap}) must be smaller than chunk size ({chunk_size})"
        );
        Self {
            chunk_size,
            overlap,
        }
    }

    /// Split `text` into whitespace-trimmed chunks of at most `chunk_size`
    /// bytes. Empty and whitespace-only runs produce no chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        let mut pieces = Vec::new();
        segment(text, SEPARATORS, self.chunk_size, &mut pieces);

        let mut chunks = Vec::new();
        let mut window: Vec<&str> = Vec::new();
        let mut window_len = 0usize;

        for piece in pieces {
            if !window.is_empty() && window_len + piece.len() > self.chunk_size {
                push_chunk(&window, &mut chunks);
                // Keep a tail of whole pieces as overlap, evicting further
                // if the incoming piece would not fit beside it.
                while !window.is_empty()
                    && (window_len > self.overlap
                        || window_len + piece.len() > self.chunk_size)
                {
                    window_len -= window[0].len();
                    window.remove(0);
                }
            }
            window_len += piece.len();
            window.push(piece);
        }
        push_chunk(&window, &mut chunks);
        chunks
    }
}

/// Break `text` into pieces no longer than `max` bytes, preferring the
/// coarsest separator that occurs in it. Pieces keep their trailing
/// separator, so concatenating them reproduces the input.
fn segment<'a>(text: &'a str, separators: &[&str], max: usize, out: &mut Vec<&'a str>) {
    if text.len() <= max {
        out.push(text);
        return;
    }
    if let Some((sep, rest)) = separators.split_first() {
        if text.contains(sep) {
            for piece in text.split_inclusive(sep) {
                if piece.len() <= max {
                    out.push(piece);
                } else {
                    segment(piece, rest, max, out);
                }
            }
        } else {
            segment(text, rest, max, out);
        }
        return;
    }
    hard_split(text, max, out);
}

/// Last resort for separator-free runs: fixed windows on char boundaries.
fn hard_split<'a>(text: &'a str, max: usize, out: &mut Vec<&'a str>) {
    let mut start = 0;
    for (idx, c) in text.char_indices() {
        if idx + c.len_utf8() - start > max {
            out.push(&text[start..idx]);
            start = idx;
        }
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
}

fn push_chunk(window: &[&str], chunks: &mut Vec<String>) {
    let joined: String = window.concat();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = Chunker::new(100, 20).split("hello world");
        assert_eq!(chunks, vec!["hello world"]);
    }

    #[test]
    fn empty_and_whitespace_produce_nothing() {
        let chunker = Chunker::new(100, 20);
        assert!(chunker.split("").is_empty());
        assert!(chunker.split("   \n\n  ").is_empty());
    }

    #[test]
    fn paragraph_breaks_are_preferred() {
        let chunks = Chunker::new(20, 0).split("first para\n\nsecond para");
        assert_eq!(chunks, vec!["first para", "second para"]);
    }

    #[test]
    fn lines_split_when_paragraphs_do_not_fit() {
        let chunks = Chunker::new(12, 0).split("one two\nthree four");
        assert_eq!(chunks, vec!["one two", "three four"]);
    }

    #[test]
    fn overlap_repeats_trailing_pieces() {
        let chunks = Chunker::new(9, 3).split("a1 b2 c3 d4 e5 f6");
        assert_eq!(chunks, vec!["a1 b2 c3", "c3 d4 e5", "e5 f6"]);
    }

    #[test]
    fn separator_free_run_falls_back_to_windows() {
        let chunks = Chunker::new(4, 0).split("abcdefghij");
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn chunks_never_exceed_the_limit() {
        let text = "word ".repeat(100);
        let chunks = Chunker::new(50, 10).split(&text);
        assert!(chunks.len() > 5);
        for chunk in &chunks {
            assert!(chunk.len() <= 50, "chunk too long: {chunk:?}");
        }
    }

    #[test]
    fn defaults_match_the_ingest_parameters() {
        let chunker = Chunker::default();
        let text = "clause ".repeat(400);
        for chunk in chunker.split(&text) {
            assert!(chunk.len() <= DEFAULT_CHUNK_SIZE);
        }
    }

    #[test]
    #[should_panic(expected = "overlap")]
    fn overlap_must_be_smaller_than_chunk_size() {
        Chunker::new(10, 10);
    }
}
