//! Regex search over buffer lines.
//!
//! Patterns are compiled with the `regex` crate and run against each line
//! on its own, so a match never spans a line break. Columns in a [`Match`]
//! are char columns and `end` is **inclusive**: `"is"` found at column 2 has
//! `end.col == 3`.

use regex::{Regex, RegexBuilder};

use crate::buffer::Buffer;
use crate::error::SearchError;
use crate::position::Position;

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

/// A search hit on one line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Match {
    pub begin: Position,
    /// Position of the last matched char.
    pub end: Position,
    pub text: String,
}

impl Match {
    /// Length in chars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end.col + 1 - self.begin.col
    }

    /// Always false: empty matches are never produced.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }
}

// ---------------------------------------------------------------------------
// Search functions
// ---------------------------------------------------------------------------

/// Compile a user pattern.
///
/// # Errors
///
/// Returns [`SearchError`] when the pattern is not a valid regex.
pub fn compile(pattern: &str, ignore_case: bool) -> Result<Regex, SearchError> {
    Ok(RegexBuilder::new(pattern)
        .case_insensitive(ignore_case)
        .build()?)
}

/// Every non-empty, non-overlapping match in the buffer, in document order.
///
/// Empty lines are skipped entirely.
#[must_use]
pub fn find_all(buf: &Buffer, re: &Regex) -> Vec<Match> {
    let mut matches = Vec::new();

    for line_idx in 0..buf.line_count() {
        let Some(line) = buf.line(line_idx) else {
            continue;
        };
        if line.is_empty() {
            continue;
        }

        for m in re.find_iter(&line) {
            if m.is_empty() {
                continue;
            }
            let begin_col = byte_to_char(&line, m.start());
            let len = m.as_str().chars().count();
            matches.push(Match {
                begin: Position::new(line_idx, begin_col),
                end: Position::new(line_idx, begin_col + len - 1),
                text: m.as_str().to_owned(),
            });
        }
    }

    matches
}

/// Index of the first match starting strictly after `pos`, wrapping to the
/// first match of the document.
#[must_use]
pub fn next_after(matches: &[Match], pos: Position) -> Option<usize> {
    if matches.is_empty() {
        return None;
    }
    Some(matches.iter().position(|m| m.begin > pos).unwrap_or(0))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn byte_to_char(s: &str, byte_offset: usize) -> usize {
    s[..byte_offset].chars().count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
