// SPDX-License-Identifier: MIT
//
// Row-level differential painter.
//
// The editor hands over a frame as one pre-styled `String` per screen
// row. The painter compares each row with what it painted last time and
// rewrites only the rows that changed, then positions the cursor. All
// output is accumulated in a byte buffer and written with one syscall,
// wrapped in synchronized-output markers (DEC 2026) to avoid tearing.

use std::io::{self, Write};

const BEGIN_SYNC: &str = "\x1b[?2026h";
const END_SYNC: &str = "\x1b[?2026l";
const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";
const RESET_STYLE: &str = "\x1b[0m";
const CLEAR_LINE: &str = "\x1b[2K";

/// Diffs rows against the previous frame and emits the changes.
#[derive(Debug, Default)]
pub struct RowPainter {
    painted: Vec<String>,
    out: Vec<u8>,
}

impl RowPainter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            painted: Vec::new(),
            out: Vec::new(),
        }
    }

    /// Forget the previous frame so the next paint rewrites every row.
    /// Needed after a resize or anything else that clobbers the screen.
    pub fn force_redraw(&mut self) {
        self.painted.clear();
    }

    /// Queue a frame. `cursor` is a 0-indexed `(col, row)` cell; `None`
    /// hides the hardware cursor. Returns the number of rows rewritten.
    pub fn paint(&mut self, rows: &[String], cursor: Option<(u16, u16)>) -> usize {
        self.out.extend_from_slice(BEGIN_SYNC.as_bytes());
        self.out.extend_from_slice(HIDE_CURSOR.as_bytes());

        let mut changed = 0;
        for (y, row) in rows.iter().enumerate() {
            if self.painted.get(y) == Some(row) {
                continue;
            }
            // Writing to Vec<u8> cannot fail.
            let _ = write!(self.out, "\x1b[{};1H{CLEAR_LINE}{row}{RESET_STYLE}", y + 1);
            changed += 1;
        }
        // Rows that disappeared since the last frame.
        for y in rows.len()..self.painted.len() {
            let _ = write!(self.out, "\x1b[{};1H{CLEAR_LINE}", y + 1);
        }

        if let Some((col, row)) = cursor {
            let _ = write!(self.out, "\x1b[{};{}H{SHOW_CURSOR}", row + 1, col + 1);
        }
        self.out.extend_from_slice(END_SYNC.as_bytes());

        self.painted.clear();
        self.painted.extend_from_slice(rows);
        changed
    }

    /// The bytes queued since the last flush.
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        &self.out
    }

    /// Write queued output to stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn flush(&mut self) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        self.flush_to(&mut stdout)
    }

    /// Write queued output to any writer (tests use a `Vec<u8>`).
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        w.write_all(&self.out)?;
        w.flush()?;
        self.out.clear();
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
