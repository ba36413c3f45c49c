//! Text preparation for evaluation calls.
//!
//! Raw story text can run far past what a single evaluation call accepts.
//! [`truncate`] cuts a prefix at a sentence boundary where possible, and
//! [`split`] chunks long input into contiguous segments. Both operate on
//! characters rather than bytes so CJK input is never cut mid code point.

use tracing::warn;

/// Default truncation length when the caller supplies an invalid limit.
pub const DEFAULT_MAX_LENGTH: usize = 800;

/// Default chunk size when the caller supplies an invalid size.
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// Sentence-ending characters recognised as cut points.
const SENTENCE_BOUNDARIES: [char; 6] = ['。', '！', '？', '.', '!', '?'];

/// Truncate `text` to at most `max_length` characters.
///
/// When a sentence boundary falls within the last 20% of the allowed
/// length, the cut lands just after that boundary; otherwise the text is
/// hard-cut at the limit. Text already within the limit is returned
/// unchanged. A `max_length` of zero is replaced by
/// [`DEFAULT_MAX_LENGTH`] with a warning rather than failing.
pub fn truncate(text: &str, max_length: usize) -> String {
    let max_length = if max_length == 0 {
        warn!(
            max_length,
            default = DEFAULT_MAX_LENGTH,
            "invalid max_length, substituting default"
        );
        DEFAULT_MAX_LENGTH
    } else {
        max_length
    };

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_length {
        return text.to_string();
    }

    let window = &chars[..max_length];
    let boundary = window
        .iter()
        .rposition(|c| SENTENCE_BOUNDARIES.contains(c));

    match boundary {
        // Boundary within the last 20% of the allowed length: cut after it.
        Some(pos) if pos + 1 >= max_length - max_length / 5 => {
            window[..=pos].iter().collect()
        }
        _ => window.iter().collect(),
    }
}

/// Split `text` into contiguous, non-overlapping segments of at most
/// `chunk_size` characters.
///
/// Falls back to the whole text as a single segment when splitting yields
/// nothing (empty input). A `chunk_size` of zero is replaced by
/// [`DEFAULT_CHUNK_SIZE`] with a warning.
pub fn split(text: &str, chunk_size: usize) -> Vec<String> {
    let chunk_size = if chunk_size == 0 {
        warn!(
            chunk_size,
            default = DEFAULT_CHUNK_SIZE,
            "invalid chunk_size, substituting default"
        );
        DEFAULT_CHUNK_SIZE
    } else {
        chunk_size
    };

    let chars: Vec<char> = text.chars().collect();
    let chunks: Vec<String> = chars
        .chunks(chunk_size)
        .map(|c| c.iter().collect())
        .collect();

    if chunks.is_empty() {
        vec![text.to_string()]
    } else {
        chunks
    }
}
