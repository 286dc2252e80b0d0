//! Book pagination: split arbitrary content into fixed-capacity pages.
//!
//! Pages hold at most [`MAX_LINES_PER_PAGE`] physical lines and
//! [`MAX_CHARS_PER_PAGE`] characters (newlines included). Logical lines wider
//! than [`WRAP_WIDTH`] columns are word-wrapped; a single word wider than the
//! column limit is hard-split at the boundary and its remainder re-enters the
//! wrap as a fresh word. Splitting is pure and deterministic — same input,
//! same pages.

use serde::{Deserialize, Serialize};

use crate::text::{char_len, split_at_chars};

/// Maximum characters per page, trailing newlines included.
pub const MAX_CHARS_PER_PAGE: usize = 256;

/// Maximum physical lines per page.
pub const MAX_LINES_PER_PAGE: usize = 14;

/// Column width at which logical lines are word-wrapped.
pub const WRAP_WIDTH: usize = 38;

/// Final page content when the page limit cut the document short.
pub const TRUNCATION_MARKER: &str = "... Content truncated due to page limit ...";

/// Single page content for empty input.
pub const EMPTY_CONTENT: &str = "Empty content";

/// An ordered, index-stable sequence of pages.
///
/// Never empty: empty input produces one [`EMPTY_CONTENT`] page. Every page
/// except a trailing truncation marker satisfies the line and character
/// bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Pages in order.
    pub pages: Vec<String>,
    /// Whether content was discarded because the page limit was reached.
    pub truncated: bool,
}

impl Document {
    /// Concatenate the pages back into one string.
    ///
    /// Pages store newline-terminated lines, so plain concatenation restores
    /// the original line structure; re-paginating the result yields the same
    /// pages.
    #[must_use]
    pub fn join(&self) -> String {
        self.pages.concat()
    }

    /// Number of pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Split `content` into at most `max_pages` pages.
///
/// When starting one more page would exceed `max_pages`, the remaining
/// content is discarded and a single [`TRUNCATION_MARKER`] page is appended
/// (that page is exempt from the size bounds).
#[must_use]
pub fn paginate(content: &str, max_pages: usize) -> Document {
    let mut lines: Vec<&str> = content.split('\n').collect();
    // Trailing blank lines carry nothing a reader would miss; dropping them
    // also makes paginate(join(paginate(c))) stable.
    while lines.last().is_some_and(|l| l.is_empty()) {
        let _ = lines.pop();
    }

    let mut pages: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0usize;
    let mut line_count = 0usize;

    for line in lines {
        let physical = if char_len(line) > WRAP_WIDTH {
            wrap_line(line, WRAP_WIDTH)
        } else {
            vec![line.to_owned()]
        };

        for physical_line in physical {
            let width = char_len(&physical_line);
            if line_count >= MAX_LINES_PER_PAGE
                || current_chars + width + 1 > MAX_CHARS_PER_PAGE
            {
                if !current.is_empty() {
                    pages.push(std::mem::take(&mut current));
                    current_chars = 0;
                    line_count = 0;
                }

                if pages.len() >= max_pages {
                    pages.push(TRUNCATION_MARKER.to_owned());
                    return Document {
                        pages,
                        truncated: true,
                    };
                }
            }

            current.push_str(&physical_line);
            current.push('\n');
            current_chars += width + 1;
            line_count += 1;
        }
    }

    if !current.is_empty() {
        pages.push(current);
    }

    if pages.is_empty() {
        pages.push(EMPTY_CONTENT.to_owned());
    }

    Document {
        pages,
        truncated: false,
    }
}

/// Word-wrap one logical line to `max_width` columns.
///
/// Greedy fill; a word wider than `max_width` is hard-split at the width
/// boundary repeatedly until the remainder fits, and the remainder continues
/// as an ordinary word.
fn wrap_line(line: &str, max_width: usize) -> Vec<String> {
    let mut wrapped: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_width = 0usize;

    for word in line.split(' ') {
        let mut word = word;
        let mut word_width = char_len(word);

        if current_width + word_width + 1 > max_width {
            if !current.is_empty() {
                wrapped.push(std::mem::take(&mut current));
                current_width = 0;
            }

            while word_width > max_width {
                let (head, rest) = split_at_chars(word, max_width);
                wrapped.push(head.to_owned());
                word = rest;
                word_width = char_len(word);
            }
        }

        if !current.is_empty() {
            current.push(' ');
            current_width += 1;
        }
        current.push_str(word);
        current_width += word_width;
    }

    if !current.is_empty() {
        wrapped.push(current);
    }

    wrapped
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
