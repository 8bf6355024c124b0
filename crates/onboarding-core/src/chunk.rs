//! Sliding-window text chunker.
//!
//! Splits page (or document) text into overlapping windows of at most
//! `chunk_size` characters, with roughly `chunk_overlap` characters shared
//! between consecutive windows. Window ends prefer a paragraph break, then
//! a line break, then any whitespace, searched backwards over the second
//! half of the window, so words are not cut in half unless a single token
//! is longer than half a window.
//!
//! Each chunk receives a deterministic id derived from its source file,
//! page, and start offset. Re-chunking the same text with the same
//! parameters therefore yields the same ids, which makes re-ingestion an
//! upsert rather than a duplication.
//!
//! # Example
//!
//! ```rust
//! use onboarding_core::chunk::split_text;
//!
//! let windows = split_text("Welcome aboard.", 800, 150);
//! assert_eq!(windows.len(), 1);
//! assert_eq!(windows[0].start_index, 0);
//! ```

use sha2::{Digest, Sha256};

use crate::models::DocumentChunk;

/// Default window length in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 800;
/// Default overlap between consecutive windows in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 150;

/// A window of text plus its character offset in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextWindow {
    pub start_index: usize,
    pub text: String,
}

/// Split `text` into overlapping windows.
///
/// Offsets and lengths are counted in `char`s, not bytes. Whitespace-only
/// input yields no windows. `chunk_overlap` is clamped below `chunk_size`.
pub fn split_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<TextWindow> {
    let chunk_size = chunk_size.max(1);
    let overlap = chunk_overlap.min(chunk_size - 1);
    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();

    let mut windows = Vec::new();
    let mut start = skip_whitespace(&chars, 0);

    while start < n {
        let hard_end = (start + chunk_size).min(n);
        let end = if hard_end == n {
            n
        } else {
            break_point(&chars, start, hard_end)
        };

        let piece: String = chars[start..end].iter().collect();
        let piece = piece.trim_end();
        if !piece.is_empty() {
            windows.push(TextWindow {
                start_index: start,
                text: piece.to_string(),
            });
        }

        if end >= n {
            break;
        }

        // Step back by the overlap, then forward to the next word start.
        let mut next = end.saturating_sub(overlap).max(start + 1);
        while next < end && !chars[next - 1].is_whitespace() {
            next += 1;
        }
        start = skip_whitespace(&chars, next);
    }

    windows
}

/// Chunk one page of a source file into [`DocumentChunk`]s.
///
/// `chunk_index` restarts at 0 for every page.
pub fn chunk_page(
    source_file: &str,
    page: u32,
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<DocumentChunk> {
    split_text(text, chunk_size, chunk_overlap)
        .into_iter()
        .enumerate()
        .map(|(chunk_index, window)| DocumentChunk {
            id: chunk_id(source_file, page, window.start_index),
            text: window.text,
            source_file: source_file.to_string(),
            page,
            start_index: window.start_index,
            chunk_index,
        })
        .collect()
}

/// Stable chunk id: the first 32 hex chars of SHA-256 over the source
/// file name, page, and start offset.
pub fn chunk_id(source_file: &str, page: u32, start_index: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source_file.as_bytes());
    hasher.update([0u8]);
    hasher.update(page.to_le_bytes());
    hasher.update((start_index as u64).to_le_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..32].to_string()
}

fn skip_whitespace(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    i
}

/// Choose an exclusive end in `(start + len/2, hard_end]` that falls on a
/// paragraph break, a line break, or whitespace, in that order of
/// preference. Falls back to `hard_end`.
fn break_point(chars: &[char], start: usize, hard_end: usize) -> usize {
    let lo = start + (hard_end - start) / 2 + 1;
    let candidates = || (lo..=hard_end).rev();

    let paragraph = candidates().find(|&p| chars[p] == '\n' && chars[p - 1] == '\n');
    if let Some(p) = paragraph {
        return p - 1;
    }
    if let Some(p) = candidates().find(|&p| chars[p] == '\n') {
        return p;
    }
    if let Some(p) = candidates().find(|&p| chars[p].is_whitespace()) {
        return p;
    }
    hard_end
}
