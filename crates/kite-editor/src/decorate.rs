//! Render decorators and input content modifiers.
//!
//! Two small pipelines sit on either side of the buffer:
//!
//! - A [`ContentModifier`] rewrites text on its way *into* the buffer
//!   (`insert_text`). Every modifier sees the raw input in `before_process`,
//!   then each `process` call feeds the next one.
//! - A [`Decorator`] rewrites rendered cells on their way *out* of the
//!   viewport. `before_process` runs once per frame, `process` once per
//!   cell.
//!
//! Both traits carry a `can_use` guard, checked once when the pipeline is
//! attached, so e.g. tab expansion is never installed on a Makefile.

use crate::buffer::{Buffer, BufferMode};
use crate::position::{Position, Range};
use crate::viewport::Window;

// ---------------------------------------------------------------------------
// ANSI attributes
// ---------------------------------------------------------------------------

const DIM: (&str, &str) = ("\x1b[2m", "\x1b[22m");
const REVERSE: (&str, &str) = ("\x1b[7m", "\x1b[27m");
const UNDERLINE: (&str, &str) = ("\x1b[4m", "\x1b[24m");

fn wrap(attr: (&str, &str), content: &str) -> String {
    format!("{}{content}{}", attr.0, attr.1)
}

// ---------------------------------------------------------------------------
// Content modifiers
// ---------------------------------------------------------------------------

/// Rewrites inserted text before the buffer applies it.
pub trait ContentModifier {
    /// Whether this modifier applies to `buf` at all.
    fn can_use(&self, buf: &Buffer) -> bool;

    /// Called with the raw input before any modifier's `process` runs.
    fn before_process(&mut self, buf: &Buffer, input: &str);

    fn process(&mut self, buf: &Buffer, input: String) -> String;
}

/// Expands `\t` to spaces up to the next tab stop.
///
/// Stops are computed from the cursor column at the start of the insert,
/// tracking newlines and backspaces inside the input.
#[derive(Debug)]
pub struct ExpandTabs {
    pub width: usize,
    start_col: usize,
}

impl ExpandTabs {
    #[must_use]
    pub const fn new(width: usize) -> Self {
        Self {
            width,
            start_col: 0,
        }
    }
}

impl ContentModifier for ExpandTabs {
    fn can_use(&self, buf: &Buffer) -> bool {
        if self.width == 0 {
            return false;
        }
        // Make recipes need literal tabs.
        !buf.path().is_some_and(|p| {
            p.file_name().is_some_and(|n| n == "Makefile" || n == "makefile")
                || p.extension().is_some_and(|e| e == "mk")
        })
    }

    fn before_process(&mut self, buf: &Buffer, _input: &str) {
        self.start_col = buf.cursor().col;
    }

    fn process(&mut self, _buf: &Buffer, input: String) -> String {
        if !input.contains('\t') {
            return input;
        }
        let mut out = String::with_capacity(input.len());
        let mut col = self.start_col;
        for ch in input.chars() {
            match ch {
                '\t' => {
                    let n = self.width - col % self.width;
                    out.extend(std::iter::repeat_n(' ', n));
                    col += n;
                }
                '\n' => {
                    out.push(ch);
                    col = 0;
                }
                '\u{8}' => {
                    out.push(ch);
                    col = col.saturating_sub(1);
                }
                _ => {
                    out.push(ch);
                    col += 1;
                }
            }
        }
        out
    }
}

/// Drops `\r` so pasted CRLF text lands as plain line breaks.
#[derive(Debug, Default)]
pub struct StripCarriageReturn;

impl ContentModifier for StripCarriageReturn {
    fn can_use(&self, _buf: &Buffer) -> bool {
        true
    }

    fn before_process(&mut self, _buf: &Buffer, _input: &str) {}

    fn process(&mut self, _buf: &Buffer, input: String) -> String {
        if input.contains('\r') {
            input.replace('\r', "")
        } else {
            input
        }
    }
}

/// The built-in modifiers. `tab_width == 0` leaves tabs literal.
#[must_use]
pub fn default_modifiers(tab_width: usize) -> Vec<Box<dyn ContentModifier>> {
    vec![
        Box::new(StripCarriageReturn),
        Box::new(ExpandTabs::new(tab_width)),
    ]
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// What part of a row a cell belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    /// The line-number column, one cell for the whole gutter.
    Gutter,
    /// A character of the line.
    Text,
    /// Fill past the end of a line.
    Blank,
    /// The `~` marker on rows past the end of the buffer.
    Filler,
}

/// A rendered cell handed to decorators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub kind: CellKind,
    /// Buffer position of the cell. For gutter and filler cells `col` is 0.
    pub pos: Position,
    /// Whether the owning viewport has focus.
    pub focused: bool,
}

// ---------------------------------------------------------------------------
// Decorators
// ---------------------------------------------------------------------------

/// Rewrites rendered cells.
pub trait Decorator {
    fn can_use(&self, buf: &Buffer) -> bool;

    /// Called once per frame before any cell is processed.
    fn before_process(&mut self, buf: &Buffer, window: &Window);

    fn process(&self, cell: &Cell, content: String) -> String;
}

/// Dims the gutter.
#[derive(Debug, Default)]
pub struct LineNumbers;

impl Decorator for LineNumbers {
    fn can_use(&self, _buf: &Buffer) -> bool {
        true
    }

    fn before_process(&mut self, _buf: &Buffer, _window: &Window) {}

    fn process(&self, cell: &Cell, content: String) -> String {
        if cell.kind == CellKind::Gutter {
            wrap(DIM, &content)
        } else {
            content
        }
    }
}

/// Reverse video on the cursor cell of the focused viewport.
#[derive(Debug, Default)]
pub struct CursorHighlight {
    cursor: Position,
}

impl Decorator for CursorHighlight {
    fn can_use(&self, _buf: &Buffer) -> bool {
        true
    }

    fn before_process(&mut self, buf: &Buffer, _window: &Window) {
        self.cursor = buf.cursor();
    }

    fn process(&self, cell: &Cell, content: String) -> String {
        let on_line = matches!(cell.kind, CellKind::Text | CellKind::Blank);
        if cell.focused && on_line && cell.pos == self.cursor {
            wrap(REVERSE, &content)
        } else {
            content
        }
    }
}

/// Underlines one screen column, e.g. the 80th, on every text row.
#[derive(Debug)]
pub struct ColumnMarker {
    /// 1-based column to mark; 0 disables.
    pub col: usize,
}

impl Default for ColumnMarker {
    fn default() -> Self {
        Self { col: 80 }
    }
}

impl Decorator for ColumnMarker {
    fn can_use(&self, _buf: &Buffer) -> bool {
        self.col > 0
    }

    fn before_process(&mut self, _buf: &Buffer, _window: &Window) {}

    fn process(&self, cell: &Cell, content: String) -> String {
        let on_line = matches!(cell.kind, CellKind::Text | CellKind::Blank);
        if on_line && cell.pos.col + 1 == self.col {
            wrap(UNDERLINE, &content)
        } else {
            content
        }
    }
}

/// Reverse video over the selected text while the buffer is selecting.
#[derive(Debug, Default)]
pub struct SelectionHighlight {
    range: Option<Range>,
}

impl Decorator for SelectionHighlight {
    fn can_use(&self, _buf: &Buffer) -> bool {
        true
    }

    fn before_process(&mut self, buf: &Buffer, _window: &Window) {
        self.range = (buf.mode() == BufferMode::Select).then(|| buf.selection_range());
    }

    fn process(&self, cell: &Cell, content: String) -> String {
        match self.range {
            Some(range) if cell.kind == CellKind::Text && range.contains_inclusive(cell.pos) => {
                wrap(REVERSE, &content)
            }
            _ => content,
        }
    }
}

/// The built-in decorators in pipeline order.
#[must_use]
pub fn default_decorators(column_marker: usize) -> Vec<Box<dyn Decorator>> {
    vec![
        Box::new(LineNumbers),
        Box::new(ColumnMarker { col: column_marker }),
        Box::new(SelectionHighlight::default()),
        Box::new(CursorHighlight::default()),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
