//! Editor: one buffer, one viewport, one mode.
//!
//! The editor is the object key handlers talk to. It owns the viewport and
//! shares its buffer with the [`Registry`](crate::registry::Registry), and
//! routes every buffer change through itself so the viewport is rescrolled
//! afterwards.
//!
//! | Mode     | Buffer mode | Keys do                      |
//! |----------|-------------|------------------------------|
//! | Navigate | ReadOnly    | move, switch mode, undo/redo |
//! | Insert   | Input       | type text                    |
//! | Select   | Select      | reserved, anchor is pinned   |

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;

use crate::buffer::{Buffer, BufferMode};
use crate::position::Position;
use crate::viewport::{Viewport, ViewportOptions};

pub type SharedBuffer = Rc<RefCell<Buffer>>;

// ---------------------------------------------------------------------------
// EditorMode
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorMode {
    #[default]
    Navigate,
    Insert,
    Select,
}

impl EditorMode {
    /// Name for the status line.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Navigate => "NAVIGATE",
            Self::Insert => "INSERT",
            Self::Select => "SELECT",
        }
    }

    /// The buffer mode this editor mode runs the buffer in.
    #[must_use]
    pub const fn buffer_mode(self) -> BufferMode {
        match self {
            Self::Navigate => BufferMode::ReadOnly,
            Self::Insert => BufferMode::Input,
            Self::Select => BufferMode::Select,
        }
    }
}

impl fmt::Display for EditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

pub struct Editor {
    buffer: SharedBuffer,
    viewport: Viewport,
    mode: EditorMode,
    /// Column vertical moves aim for (sticky column).
    last_target_col: usize,
    /// Line horizontal moves stay on.
    last_target_line: usize,
}

impl Editor {
    #[must_use]
    pub fn new(buffer: SharedBuffer, height: usize, width: usize, options: ViewportOptions) -> Self {
        let viewport = Viewport::new(&buffer.borrow(), height, width, options);
        Self::with_viewport(buffer, viewport)
    }

    /// An editor around a prepared viewport, e.g. one with custom decorators.
    #[must_use]
    pub fn with_viewport(buffer: SharedBuffer, viewport: Viewport) -> Self {
        let mut editor = Self {
            buffer,
            viewport,
            mode: EditorMode::Navigate,
            last_target_col: 0,
            last_target_line: 0,
        };
        editor.buffer.borrow_mut().set_mode(BufferMode::ReadOnly);
        editor.viewport.set_status_label(EditorMode::Navigate.display_name());
        editor.retarget();
        editor.viewport.sync(&editor.buffer.borrow());
        editor
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> EditorMode {
        self.mode
    }

    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &SharedBuffer {
        &self.buffer
    }

    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[must_use]
    pub fn cursor(&self) -> Position {
        self.buffer.borrow().cursor()
    }

    #[inline]
    #[must_use]
    pub const fn last_target_col(&self) -> usize {
        self.last_target_col
    }

    #[inline]
    #[must_use]
    pub const fn last_target_line(&self) -> usize {
        self.last_target_line
    }

    // -- Mode ---------------------------------------------------------------

    pub fn set_mode(&mut self, mode: EditorMode) {
        if mode == self.mode {
            return;
        }
        debug!(from = %self.mode, to = %mode, "mode change");
        self.mode = mode;
        self.buffer.borrow_mut().set_mode(mode.buffer_mode());
        self.viewport.set_status_label(mode.display_name());
    }

    // -- Movement -----------------------------------------------------------

    /// Move the cursor by a line or column delta.
    ///
    /// Vertical moves aim for the sticky column and land on the end of a
    /// shorter line without forgetting it. Horizontal moves stop at the line
    /// ends and reset the sticky column. Returns `false` when the cursor
    /// could not move at all, e.g. above line 0.
    pub fn move_by(&mut self, lines: isize, cols: isize) -> bool {
        let cursor = self.cursor();
        if lines != 0 {
            let Some(line) = cursor.line.checked_add_signed(lines) else {
                return false;
            };
            let Some(len) = self.buffer.borrow().line_len(line) else {
                return false;
            };
            let target = Position::new(line, self.last_target_col.min(len));
            if !self.viewport_goto(target) {
                return false;
            }
            self.last_target_line = line;
            true
        } else {
            let line = self.last_target_line;
            let Some(col) = cursor.col.checked_add_signed(cols) else {
                return false;
            };
            let Some(len) = self.buffer.borrow().line_len(line) else {
                return false;
            };
            let col = col.min(len);
            if !self.viewport_goto(Position::new(line, col)) {
                return false;
            }
            self.last_target_col = col;
            self.last_target_line = line;
            true
        }
    }

    /// Jump to `pos`. Resets the sticky column.
    pub fn goto(&mut self, pos: Position) -> bool {
        if !self.viewport_goto(pos) {
            return false;
        }
        self.retarget();
        true
    }

    fn viewport_goto(&mut self, pos: Position) -> bool {
        let mut buf = self.buffer.borrow_mut();
        self.viewport.goto(&mut buf, pos)
    }

    /// Take the sticky column and line from wherever the cursor is.
    fn retarget(&mut self) {
        let cursor = self.cursor();
        self.last_target_col = cursor.col;
        self.last_target_line = cursor.line;
    }

    fn resync(&mut self) {
        self.retarget();
        self.viewport.sync(&self.buffer.borrow());
    }

    // -- Editing ------------------------------------------------------------

    /// Type `text` at the cursor. Only has an effect in insert mode.
    pub fn input(&mut self, text: &str) {
        self.buffer.borrow_mut().insert_text(text);
        self.resync();
    }

    pub fn undo(&mut self) {
        self.buffer.borrow_mut().undo();
        self.resync();
    }

    pub fn redo(&mut self) {
        self.buffer.borrow_mut().redo();
        self.resync();
    }

    /// Run `f` against the buffer and resync afterwards, for commands that
    /// edit in bulk such as replace.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut Buffer) -> R) -> R {
        let out = f(&mut self.buffer.borrow_mut());
        self.resync();
        out
    }

    /// Show another buffer. The buffer takes the editor's current mode.
    pub fn open(&mut self, buffer: SharedBuffer) {
        self.buffer = buffer;
        self.buffer.borrow_mut().set_mode(self.mode.buffer_mode());
        self.retarget();
        let (height, width) = (self.viewport.height(), self.viewport.width());
        self.viewport.resize(&self.buffer.borrow(), height, width);
    }

    // -- Display ------------------------------------------------------------

    pub fn resize(&mut self, height: usize, width: usize) {
        self.viewport.resize(&self.buffer.borrow(), height, width);
    }

    pub const fn set_focused(&mut self, focused: bool) {
        self.viewport.set_focused(focused);
    }

    #[must_use]
    pub fn render(&mut self) -> Vec<String> {
        self.viewport.render(&self.buffer.borrow())
    }

    /// Terminal cell of the cursor as `(col, row)`.
    #[must_use]
    pub fn cursor_screen_position(&self) -> Option<(u16, u16)> {
        let (col, row) = self.viewport.cursor_screen_position(&self.buffer.borrow())?;
        Some((u16::try_from(col).ok()?, u16::try_from(row).ok()?))
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("mode", &self.mode)
            .field("buffer", &self.buffer.borrow())
            .field("viewport", &self.viewport)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn editor(text: &str) -> Editor {
        let buf = Rc::new(RefCell::new(Buffer::from_text(text)));
        Editor::new(buf, 10, 40, ViewportOptions::default())
    }

    // -- Mode ---------------------------------------------------------------

    #[test]
    fn starts_in_navigate_read_only() {
        let ed = editor("abc");
        assert_eq!(ed.mode(), EditorMode::Navigate);
        assert_eq!(ed.buffer().borrow().mode(), BufferMode::ReadOnly);
    }

    #[test]
    fn modes_map_to_buffer_modes() {
        let mut ed = editor("abc");
        ed.set_mode(EditorMode::Insert);
        assert_eq!(ed.buffer().borrow().mode(), BufferMode::Input);
        ed.set_mode(EditorMode::Select);
        assert_eq!(ed.buffer().borrow().mode(), BufferMode::Select);
        ed.set_mode(EditorMode::Navigate);
        assert_eq!(ed.buffer().borrow().mode(), BufferMode::ReadOnly);
    }

    #[test]
    fn input_ignored_outside_insert() {
        let mut ed = editor("abc");
        ed.input("x");
        assert_eq!(ed.buffer().borrow().text(), "abc");
        ed.set_mode(EditorMode::Insert);
        ed.input("x");
        assert_eq!(ed.buffer().borrow().text(), "xabc");
    }

    // -- Movement -----------------------------------------------------------

    #[test]
    fn sticky_column_survives_short_lines() {
        let mut ed = editor("a long first line\nab\nanother long line");
        assert!(ed.goto(Position::new(0, 10)));

        assert!(ed.move_by(1, 0));
        assert_eq!(ed.cursor(), Position::new(1, 2));
        assert_eq!(ed.last_target_col(), 10);

        assert!(ed.move_by(1, 0));
        assert_eq!(ed.cursor(), Position::new(2, 10));
    }

    #[test]
    fn horizontal_move_resets_sticky_column() {
        let mut ed = editor("a long first line\nab\nanother long line");
        assert!(ed.goto(Position::new(0, 10)));
        assert!(ed.move_by(1, 0));
        assert!(ed.move_by(0, -1));
        assert_eq!(ed.cursor(), Position::new(1, 1));
        assert_eq!(ed.last_target_col(), 1);

        assert!(ed.move_by(1, 0));
        assert_eq!(ed.cursor(), Position::new(2, 1));
    }

    #[test]
    fn horizontal_move_clamps_at_line_end() {
        let mut ed = editor("abc");
        assert!(ed.goto(Position::new(0, 3)));
        assert!(ed.move_by(0, 1));
        assert_eq!(ed.cursor(), Position::new(0, 3));
        assert!(ed.move_by(0, -3));
        assert_eq!(ed.cursor(), Position::ZERO);
        assert!(!ed.move_by(0, -1));
    }

    #[test]
    fn vertical_move_past_edges_fails() {
        let mut ed = editor("one\ntwo");
        assert!(!ed.move_by(-1, 0));
        assert!(ed.move_by(1, 0));
        assert!(!ed.move_by(1, 0));
        assert_eq!(ed.cursor(), Position::new(1, 0));
        assert_eq!(ed.last_target_line(), 1);
    }

    #[test]
    fn moves_scroll_the_viewport() {
        let text: Vec<String> = (0..50).map(|i| i.to_string()).collect();
        let mut ed = editor(&text.join("\n"));
        for _ in 0..30 {
            assert!(ed.move_by(1, 0));
        }
        assert!(ed.viewport().window().contains_line(30));
        assert!(ed.viewport().window().begin_line > 0);
    }

    // -- Editing ------------------------------------------------------------

    #[test]
    fn undo_redo_resync_sticky_column() {
        let mut ed = editor("");
        ed.set_mode(EditorMode::Insert);
        ed.input("hello");
        assert_eq!(ed.last_target_col(), 5);
        ed.undo();
        ed.undo();
        assert_eq!(ed.cursor(), Position::new(0, 3));
        assert_eq!(ed.last_target_col(), 3);
        ed.redo();
        assert_eq!(ed.buffer().borrow().text(), "hell");
    }

    #[test]
    fn open_binds_new_buffer_in_current_mode() {
        let mut ed = editor("first");
        ed.set_mode(EditorMode::Insert);
        let other = Rc::new(RefCell::new(Buffer::from_text("second")));
        ed.open(Rc::clone(&other));
        assert!(Rc::ptr_eq(ed.buffer(), &other));
        assert_eq!(other.borrow().mode(), BufferMode::Input);
        ed.input("2");
        assert_eq!(other.borrow().text(), "2second");
    }

    // -- Display ------------------------------------------------------------

    #[test]
    fn render_has_one_row_per_screen_line() {
        let mut ed = editor("abc");
        assert_eq!(ed.render().len(), 10);
        ed.resize(5, 20);
        assert_eq!(ed.render().len(), 5);
    }

    #[test]
    fn cursor_screen_position_after_gutter() {
        let mut ed = editor("abc");
        assert!(ed.goto(Position::new(0, 2)));
        assert_eq!(ed.cursor_screen_position(), Some((4, 0)));
    }
}
