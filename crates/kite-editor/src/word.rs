//! Word tokenizing and neighbour lookup.
//!
//! A **word** is a maximal run of word characters (letters, digits,
//! underscore). Every other non-blank character is a word of its own, so
//! `foo.bar()` tokenizes as `foo`, `.`, `bar`, `(`, `)`. Whitespace only
//! separates.
//!
//! [`nearby_words`] answers "which word is the cursor on, and what comes
//! before and after it", crossing line boundaries when the cursor's word is
//! first or last on its line.

use crate::buffer::Buffer;
use crate::position::Position;

// ---------------------------------------------------------------------------
// Character classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharClass {
    /// Letters, digits, underscore.
    Word,
    /// Non-blank, non-word characters.
    Punctuation,
    Blank,
}

pub(crate) fn classify(ch: char) -> CharClass {
    if ch.is_whitespace() {
        CharClass::Blank
    } else if ch.is_alphanumeric() || ch == '_' {
        CharClass::Word
    } else {
        CharClass::Punctuation
    }
}

// ---------------------------------------------------------------------------
// Word
// ---------------------------------------------------------------------------

/// A word on one line. `end_col` is inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub line: usize,
    pub begin_col: usize,
    pub end_col: usize,
    pub text: String,
}

/// The word under a position and its neighbours.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NearbyWords {
    pub prev: Option<Word>,
    pub curr: Option<Word>,
    pub next: Option<Word>,
}

/// Split a line into words, in column order.
#[must_use]
pub fn tokenize(line: usize, text: &str) -> Vec<Word> {
    let mut words: Vec<Word> = Vec::new();
    // Whether the last pushed word is a run that may still grow.
    let mut open = false;

    for (col, ch) in text.chars().enumerate() {
        match classify(ch) {
            CharClass::Word if open => {
                if let Some(word) = words.last_mut() {
                    word.end_col = col;
                    word.text.push(ch);
                }
            }
            CharClass::Blank => open = false,
            class => {
                words.push(Word {
                    line,
                    begin_col: col,
                    end_col: col,
                    text: ch.to_string(),
                });
                open = class == CharClass::Word;
            }
        }
    }

    words
}

/// Index of the last word starting at or before `col`, or 0 when none
/// does. `None` only for a line without words.
fn word_index_at(words: &[Word], col: usize) -> Option<usize> {
    if words.is_empty() {
        return None;
    }
    Some(
        words
            .iter()
            .rposition(|w| w.begin_col <= col)
            .unwrap_or(0),
    )
}

/// Nearest non-empty lines above and below `line`.
///
/// Both directions expand one step at a time from `line`; each side stops
/// independently at its first non-empty line or at the buffer edge.
#[must_use]
pub fn nearest_non_empty_lines(buf: &Buffer, line: usize) -> (Option<usize>, Option<usize>) {
    let non_empty = |i: usize| buf.line_len(i).is_some_and(|len| len > 0);

    let prev = (0..line).rev().find(|&i| non_empty(i));
    let next = (line + 1..buf.line_count()).find(|&i| non_empty(i));
    (prev, next)
}

/// The word at `pos` with its previous and next words.
///
/// `curr` is the last word starting at or before `pos.col` (the first word
/// when the cursor sits before all of them). Neighbours fall back to the
/// last word of the nearest non-empty line above and the first word of the
/// nearest non-empty line below.
#[must_use]
pub fn nearby_words(buf: &Buffer, pos: Position) -> NearbyWords {
    let words = buf
        .line(pos.line)
        .map(|text| tokenize(pos.line, &text))
        .unwrap_or_default();
    let (prev_line, next_line) = nearest_non_empty_lines(buf, pos.line);

    let idx = word_index_at(&words, pos.col);
    let curr = idx.map(|i| words[i].clone());
    let mut prev = idx.and_then(|i| i.checked_sub(1)).map(|i| words[i].clone());
    let mut next = idx.and_then(|i| words.get(i + 1)).cloned();

    if prev.is_none() {
        prev = prev_line
            .and_then(|l| buf.line(l).map(|text| tokenize(l, &text)))
            .and_then(|mut ws| ws.pop());
    }
    if next.is_none() {
        next = next_line
            .and_then(|l| buf.line(l).map(|text| tokenize(l, &text)))
            .and_then(|ws| ws.into_iter().next());
    }

    NearbyWords { prev, curr, next }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
