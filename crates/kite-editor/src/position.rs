//! Cursor coordinates and selections.
//!
//! All coordinates are **0-indexed** and columns count chars. A column equal
//! to the line length is valid: it is the slot after the last character,
//! where typing appends.
//!
//! A [`Selection`] is the pair of points the buffer tracks: the `cursor`
//! that moves and the `anchor` that stays put while selecting. Outside of
//! select mode both are the same point.

use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A point in a buffer: line, then column.
///
/// Ordered lexicographically, so `(0, 9) < (1, 0)`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub const ZERO: Self = Self { line: 0, col: 0 };

    #[inline]
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.line, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-indexed, as shown in the status line.
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

// ---------------------------------------------------------------------------
// Range
// ---------------------------------------------------------------------------

/// Two ordered positions, `start <= end`.
///
/// Whether `end` is inclusive depends on the producer: selections and
/// search matches include it, cursor spans do not.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Build a range from two arbitrary points, swapping if needed.
    #[inline]
    #[must_use]
    pub fn ordered(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.start.line == self.end.line && self.start.col == self.end.col
    }

    /// True when `pos` lies in `[start, end]`, both ends included.
    #[inline]
    #[must_use]
    pub fn contains_inclusive(self, pos: Position) -> bool {
        pos >= self.start && pos <= self.end
    }
}

impl fmt::Debug for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Range({:?} .. {:?})", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Cursor plus anchor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub cursor: Position,
    pub anchor: Position,
}

impl Selection {
    /// Cursor and anchor on the same point.
    #[inline]
    #[must_use]
    pub const fn collapsed(pos: Position) -> Self {
        Self {
            cursor: pos,
            anchor: pos,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_collapsed(self) -> bool {
        self.cursor.line == self.anchor.line && self.cursor.col == self.anchor.col
    }

    /// Endpoints low-to-high regardless of which way the cursor went.
    #[inline]
    #[must_use]
    pub fn range(self) -> Range {
        Range::ordered(self.cursor, self.anchor)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
