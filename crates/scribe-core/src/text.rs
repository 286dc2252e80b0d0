//! Char-safe text utilities.
//!
//! Byte-index slicing panics inside multi-byte characters, and the page and
//! prompt limits in this system are all expressed in characters, so everything
//! here counts and splits by `char`.

use std::borrow::Cow;

/// Marker inserted where prompt input was cut.
pub const TRUNCATION_NOTE: &str = "... (truncated) ...";

/// Number of characters in `s`.
#[must_use]
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split `s` after `n` characters. If `s` has `n` or fewer characters the
/// second half is empty.
#[must_use]
pub fn split_at_chars(s: &str, n: usize) -> (&str, &str) {
    match s.char_indices().nth(n) {
        Some((idx, _)) => s.split_at(idx),
        None => (s, ""),
    }
}

/// Keep the head of an over-long input.
///
/// If `s` exceeds `threshold` characters, keep the first `keep` characters
/// and append the truncation note on its own line. Used where the start of
/// the content carries the signal (file contents).
#[must_use]
pub fn head_truncate(s: &str, threshold: usize, keep: usize) -> Cow<'_, str> {
    if char_len(s) <= threshold {
        return Cow::Borrowed(s);
    }
    let (head, _) = split_at_chars(s, keep);
    Cow::Owned(format!("{head}\n{TRUNCATION_NOTE}"))
}

/// Keep the tail of an over-long input.
///
/// If `s` exceeds `threshold` characters, keep the last `keep` characters
/// and prepend the truncation note on its own line. Used where the end of
/// the content carries the signal (diffs, where later hunks matter most).
#[must_use]
pub fn tail_truncate(s: &str, threshold: usize, keep: usize) -> Cow<'_, str> {
    let len = char_len(s);
    if len <= threshold {
        return Cow::Borrowed(s);
    }
    let (_, tail) = split_at_chars(s, len.saturating_sub(keep));
    Cow::Owned(format!("{TRUNCATION_NOTE}\n{tail}"))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
