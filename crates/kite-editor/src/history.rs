//! Undo/redo history: a linear log of character edits.
//!
//! Every character the buffer inserts or deletes is recorded as one
//! [`EditRecord`]. The log is append-only with a cursor into it:
//!
//! ```text
//! records:  [r0] [r1] [r2] [r3]
//!                          ^ cursor = 3   (r3 is redoable)
//! ```
//!
//! Undo walks the cursor back, redo walks it forward. Recording a new
//! edit while the cursor is not at the end drops the redoable tail first.
//! There is no branching.

use crate::position::Position;

/// Whether a record added or removed its character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Insert,
    Delete,
}

/// One applied character edit.
///
/// `before` and `after` are the cursor positions around the edit, which is
/// all undo and redo need: undo puts the cursor at `after` and inverts,
/// redo puts it at `before` and re-applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditRecord {
    pub kind: EditKind,
    pub before: Position,
    pub after: Position,
    /// The character involved, `'\n'` for a line break.
    pub ch: char,
}

/// The log plus its cursor. Invariant: `cursor <= records.len()`.
#[derive(Debug, Default)]
pub struct History {
    records: Vec<EditRecord>,
    cursor: usize,
}

impl History {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
            cursor: 0,
        }
    }

    /// Append a record, discarding anything past the cursor.
    pub fn record(&mut self, record: EditRecord) {
        self.records.truncate(self.cursor);
        self.records.push(record);
        self.cursor = self.records.len();
    }

    /// Step back over the last applied record and return it.
    pub fn step_back(&mut self) -> Option<EditRecord> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.records[self.cursor])
    }

    /// Step forward over the next undone record and return it.
    pub fn step_forward(&mut self) -> Option<EditRecord> {
        let record = *self.records.get(self.cursor)?;
        self.cursor += 1;
        Some(record)
    }

    #[inline]
    #[must_use]
    pub const fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    #[inline]
    #[must_use]
    pub const fn can_redo(&self) -> bool {
        self.cursor < self.records.len()
    }

    /// Number of records, redoable ones included.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
