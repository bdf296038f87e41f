//! Viewport: the visible window onto a buffer.
//!
//! A `Viewport` tracks which lines and columns of a [`Buffer`] are on
//! screen and turns them into rows of text for the terminal. It does not
//! own the buffer; every method takes it as a parameter, so one viewport
//! can be pointed at another buffer by the editor.
//!
//! ```text
//! ┌──────┬────────────────────────┐
//! │gutter│      text area         │ ← text_height rows
//! │      │                        │
//! ├──────┴────────────────────────┤
//! │         status line           │ ← 1 row, optional
//! └───────────────────────────────┘
//! ```
//!
//! # Scrolling
//!
//! The window moves by the smallest shift that keeps `margin` lines (and
//! columns) between the cursor and the window edge. It never re-centers.
//! At the buffer edges the margin gives way: the window cannot start above
//! line 0 or run past the last line. Columns are fitted by display cells,
//! so a wide character takes two of the window's cells.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::buffer::Buffer;
use crate::decorate::{self, Cell, CellKind, Decorator};
use crate::position::Position;

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

/// Visible buffer region. All four bounds are inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Window {
    pub begin_line: usize,
    pub end_line: usize,
    pub begin_col: usize,
    pub end_col: usize,
}

impl Window {
    #[must_use]
    pub const fn contains_line(&self, line: usize) -> bool {
        line >= self.begin_line && line <= self.end_line
    }
}

/// Display settings fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportOptions {
    /// Lines/columns kept between the cursor and the window edge.
    pub margin: usize,
    pub show_gutter: bool,
    pub show_status: bool,
    pub focused: bool,
    /// 1-based column for the [`ColumnMarker`](decorate::ColumnMarker); 0 disables.
    pub column_marker: usize,
}

impl Default for ViewportOptions {
    fn default() -> Self {
        Self {
            margin: 2,
            show_gutter: true,
            show_status: true,
            focused: true,
            column_marker: 80,
        }
    }
}

/// Digits of the last line number plus one separator space.
#[must_use]
pub fn gutter_width(line_count: usize) -> usize {
    line_count.max(1).ilog10() as usize + 2
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

pub struct Viewport {
    height: usize,
    width: usize,
    text_height: usize,
    text_width: usize,
    gutter: usize,
    margin: usize,
    window: Window,
    options: ViewportOptions,
    status_label: String,
    decorators: Vec<Box<dyn Decorator>>,
}

impl Viewport {
    /// A viewport with the built-in decorators.
    #[must_use]
    pub fn new(buf: &Buffer, height: usize, width: usize, options: ViewportOptions) -> Self {
        let decorators = decorate::default_decorators(options.column_marker);
        Self::with_decorators(buf, height, width, options, decorators)
    }

    /// A viewport with a chosen decorator pipeline, filtered by `can_use`.
    #[must_use]
    pub fn with_decorators(
        buf: &Buffer,
        height: usize,
        width: usize,
        options: ViewportOptions,
        decorators: Vec<Box<dyn Decorator>>,
    ) -> Self {
        let mut view = Self {
            height: 0,
            width: 0,
            text_height: 0,
            text_width: 0,
            gutter: 0,
            margin: options.margin,
            window: Window::default(),
            options,
            status_label: String::new(),
            decorators: decorators.into_iter().filter(|d| d.can_use(buf)).collect(),
        };
        view.resize(buf, height, width);
        view
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn window(&self) -> Window {
        self.window
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Rows available for text, status line excluded.
    #[inline]
    #[must_use]
    pub const fn text_height(&self) -> usize {
        self.text_height
    }

    /// Columns available for text, gutter excluded.
    #[inline]
    #[must_use]
    pub const fn text_width(&self) -> usize {
        self.text_width
    }

    /// Gutter columns, 0 when hidden.
    #[inline]
    #[must_use]
    pub const fn gutter(&self) -> usize {
        self.gutter
    }

    #[inline]
    #[must_use]
    pub const fn margin(&self) -> usize {
        self.margin
    }

    #[inline]
    #[must_use]
    pub const fn is_focused(&self) -> bool {
        self.options.focused
    }

    pub const fn set_focused(&mut self, focused: bool) {
        self.options.focused = focused;
    }

    /// Text shown at the start of the status line, e.g. the mode name.
    pub fn set_status_label(&mut self, label: &str) {
        label.clone_into(&mut self.status_label);
    }

    // -- Geometry -----------------------------------------------------------

    /// Take a new size. The window is rebuilt from the top of the buffer
    /// and scrolled to the cursor, so calling this twice with the same size
    /// changes nothing.
    pub fn resize(&mut self, buf: &Buffer, height: usize, width: usize) {
        self.height = height;
        self.width = width;
        self.layout(buf);
        self.window.begin_line = 0;
        self.window.begin_col = 0;
        self.scroll(buf);
    }

    /// Move the cursor and scroll to it. `false` and no change when the
    /// buffer rejects `pos`.
    pub fn goto(&mut self, buf: &mut Buffer, pos: Position) -> bool {
        if !buf.goto(pos) {
            return false;
        }
        self.layout(buf);
        self.scroll(buf);
        true
    }

    /// Scroll to wherever the buffer's cursor is now, e.g. after an edit.
    pub fn sync(&mut self, buf: &Buffer) {
        self.layout(buf);
        self.scroll(buf);
    }

    /// Split the size into text area, gutter and status line. The gutter
    /// depends on the line count, so this runs after edits too.
    fn layout(&mut self, buf: &Buffer) {
        self.text_height = if self.options.show_status {
            self.height.saturating_sub(1)
        } else {
            self.height
        };
        self.gutter = if self.options.show_gutter {
            gutter_width(buf.line_count())
        } else {
            0
        };
        if self.gutter >= self.width {
            self.gutter = 0;
        }
        self.text_width = self.width - self.gutter;
    }

    fn scroll(&mut self, buf: &Buffer) {
        let cursor = buf.cursor();

        let begin_line = scroll_axis(
            self.window.begin_line,
            self.text_height,
            self.margin,
            cursor.line,
            buf.line_count().saturating_sub(1),
        );

        let cells: Vec<usize> = buf
            .line(cursor.line)
            .unwrap_or_default()
            .chars()
            .map(char_cells)
            .collect();
        let mut begin_col = self.window.begin_col;
        if cells.len() < begin_col {
            begin_col = 0;
        }
        let begin_col = scroll_cols(&cells, begin_col, self.text_width, self.margin, cursor.col);

        self.window = Window {
            begin_line,
            end_line: (begin_line + self.text_height).saturating_sub(1),
            begin_col,
            end_col: last_visible_col(&cells, begin_col, self.text_width),
        };
    }

    /// Screen cell of the cursor as `(col, row)`, 0-indexed from the
    /// viewport's top-left. `None` when the cursor is off screen.
    #[must_use]
    pub fn cursor_screen_position(&self, buf: &Buffer) -> Option<(usize, usize)> {
        let cursor = buf.cursor();
        if !self.window.contains_line(cursor.line) || cursor.col < self.window.begin_col {
            return None;
        }
        let row = cursor.line - self.window.begin_line;
        if row >= self.text_height {
            return None;
        }

        let line = buf.line(cursor.line)?;
        let offset: usize = line
            .chars()
            .skip(self.window.begin_col)
            .take(cursor.col - self.window.begin_col)
            .map(char_cells)
            .sum();
        if offset >= self.text_width {
            return None;
        }
        Some((self.gutter + offset, row))
    }

    // -- Rendering ----------------------------------------------------------

    /// One string per screen row: the text rows, then the status line.
    ///
    /// Every row fills exactly `width` terminal cells; escape sequences
    /// added by decorators take no cells.
    pub fn render(&mut self, buf: &Buffer) -> Vec<String> {
        let window = self.window;
        for d in &mut self.decorators {
            d.before_process(buf, &window);
        }

        let mut rows = Vec::with_capacity(self.height);
        for r in 0..self.text_height {
            let line = window.begin_line + r;
            let row = match buf.line(line) {
                Some(text) => self.render_line(line, &text),
                None => self.render_filler(line),
            };
            rows.push(row);
        }
        if self.options.show_status && self.height > 0 {
            rows.push(self.render_status(buf));
        }
        rows
    }

    fn decorate(&self, kind: CellKind, pos: Position, content: String) -> String {
        let cell = Cell {
            kind,
            pos,
            focused: self.options.focused,
        };
        self.decorators
            .iter()
            .fold(content, |acc, d| d.process(&cell, acc))
    }

    fn render_line(&self, line: usize, text: &str) -> String {
        let mut row = String::with_capacity(self.width);
        if self.gutter > 0 {
            let num = format!("{:>w$} ", line + 1, w = self.gutter - 1);
            row.push_str(&self.decorate(CellKind::Gutter, Position::new(line, 0), num));
        }

        let chars: Vec<char> = text.chars().collect();
        let mut used = 0;
        let mut col = self.window.begin_col;
        while used < self.text_width {
            let pos = Position::new(line, col);
            let (kind, content, w) = match chars.get(col) {
                Some(&ch) => {
                    let (s, w) = display_char(ch);
                    if used + w > self.text_width {
                        // A wide char that does not fit.
                        (CellKind::Blank, " ".to_owned(), 1)
                    } else {
                        (CellKind::Text, s, w)
                    }
                }
                None => (CellKind::Blank, " ".to_owned(), 1),
            };
            row.push_str(&self.decorate(kind, pos, content));
            used += w;
            col += 1;
        }
        row
    }

    fn render_filler(&self, line: usize) -> String {
        let mut row = " ".repeat(self.gutter);
        if self.text_width > 0 {
            row.push_str(&self.decorate(CellKind::Filler, Position::new(line, 0), "~".to_owned()));
            row.push_str(&" ".repeat(self.text_width - 1));
        }
        row
    }

    /// `" LABEL | name [+]"` on the left, `" line:col "` on the right.
    fn render_status(&self, buf: &Buffer) -> String {
        let modified = if buf.is_modified() { " [+]" } else { "" };
        let left = if self.status_label.is_empty() {
            format!(" {}{modified}", buf.display_name())
        } else {
            format!(" {} | {}{modified}", self.status_label, buf.display_name())
        };
        let right = format!(" {} ", buf.cursor());

        let width = self.width;
        let right_w = right.width();
        let line = if right_w > width {
            truncate(&right, width)
        } else {
            let left = truncate(&left, width - right_w);
            let fill = width - right_w - left.width();
            format!("{left}{}{right}", " ".repeat(fill))
        };
        format!("\x1b[7m{line}\x1b[27m")
    }
}

impl std::fmt::Debug for Viewport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewport")
            .field("height", &self.height)
            .field("width", &self.width)
            .field("window", &self.window)
            .field("decorators", &self.decorators.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// New start of one axis of the window.
///
/// `size` cells wide, `cursor` must end up at least `margin` cells from
/// either edge, and the window may not run past `last`. The margin shrinks
/// to fit tiny windows.
fn scroll_axis(begin: usize, size: usize, margin: usize, cursor: usize, last: usize) -> usize {
    if size == 0 {
        return 0;
    }
    let margin = margin.min((size - 1) / 2);
    let end = begin + size - 1;

    if cursor + margin > end {
        let shifted_end = cursor + margin;
        if shifted_end > last {
            (last + 1).saturating_sub(size)
        } else {
            shifted_end + 1 - size
        }
    } else if cursor < begin + margin {
        cursor.saturating_sub(margin)
    } else {
        begin
    }
}

/// Horizontal [`scroll_axis`], in display cells. `cells` holds the width
/// of each char on the cursor line; past its end every column is one cell.
/// The cursor plus `margin` columns to its right must fit in `size` cells
/// starting at `begin`, and the window never starts right of the cursor.
fn scroll_cols(cells: &[usize], begin: usize, size: usize, margin: usize, cursor: usize) -> usize {
    if size == 0 {
        return 0;
    }
    let margin = margin.min((size - 1) / 2);
    if cursor < begin + margin {
        return cursor.saturating_sub(margin);
    }

    let cell = |col: usize| cells.get(col).copied().unwrap_or(1);
    let last = (cursor + margin).min(cells.len());
    let mut begin = begin;
    let mut span: usize = (begin..=last).map(cell).sum();
    while span > size && begin < cursor {
        span -= cell(begin);
        begin += 1;
    }
    begin
}

/// Last column that fits whole in `size` cells from `begin`.
fn last_visible_col(cells: &[usize], begin: usize, size: usize) -> usize {
    let mut used = 0;
    let mut col = begin;
    loop {
        let w = cells.get(col).copied().unwrap_or(1);
        if used + w > size {
            break;
        }
        used += w;
        col += 1;
    }
    col.saturating_sub(1)
}

/// Cells one char takes on screen.
fn char_cells(ch: char) -> usize {
    match ch.width() {
        Some(w @ 1..=2) if ch != '\t' => w,
        _ => 1,
    }
}

/// Screen text and cell count for one char.
fn display_char(ch: char) -> (String, usize) {
    match ch {
        '\t' => (" ".to_owned(), 1),
        _ => match ch.width() {
            Some(w @ 1..=2) => (ch.to_string(), w),
            // Control and zero-width chars.
            _ => ("?".to_owned(), 1),
        },
    }
}

/// Longest prefix of `s` that fits in `width` cells.
fn truncate(s: &str, width: usize) -> String {
    let mut used = 0;
    s.chars()
        .take_while(|ch| {
            used += ch.width().unwrap_or(0);
            used <= width
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::buffer::BufferMode;

    fn plain(buf: &Buffer, height: usize, width: usize, options: ViewportOptions) -> Viewport {
        Viewport::with_decorators(buf, height, width, options, Vec::new())
    }

    fn bare() -> ViewportOptions {
        ViewportOptions {
            show_gutter: false,
            show_status: false,
            ..ViewportOptions::default()
        }
    }

    fn numbered(n: usize) -> Buffer {
        let text: Vec<String> = (0..n).map(|i| format!("line {i}")).collect();
        Buffer::from_text(&text.join("\n"))
    }

    fn strip_ansi(s: &str) -> String {
        let mut out = String::new();
        let mut chars = s.chars();
        while let Some(ch) = chars.next() {
            if ch == '\x1b' {
                for c in chars.by_ref() {
                    if c.is_ascii_alphabetic() {
                        break;
                    }
                }
            } else {
                out.push(ch);
            }
        }
        out
    }

    // -- Helpers ------------------------------------------------------------

    #[test]
    fn gutter_width_grows_with_digits() {
        assert_eq!(gutter_width(0), 2);
        assert_eq!(gutter_width(9), 2);
        assert_eq!(gutter_width(10), 3);
        assert_eq!(gutter_width(999), 4);
        assert_eq!(gutter_width(1000), 5);
    }

    #[test]
    fn scroll_axis_minimal_shift() {
        // Already inside the margins.
        assert_eq!(scroll_axis(0, 10, 2, 5, 99), 0);
        // Down past the bottom margin: shift by the overflow only.
        assert_eq!(scroll_axis(0, 10, 2, 8, 99), 1);
        // Up past the top margin.
        assert_eq!(scroll_axis(20, 10, 2, 21, 99), 19);
        // Clamped at both ends.
        assert_eq!(scroll_axis(0, 10, 2, 99, 99), 90);
        assert_eq!(scroll_axis(5, 10, 2, 0, 99), 0);
        // Buffer smaller than the window.
        assert_eq!(scroll_axis(0, 10, 2, 3, 4), 0);
    }

    #[test]
    fn scroll_axis_shrinks_margin_for_small_windows() {
        assert_eq!(scroll_axis(0, 1, 2, 5, 99), 5);
        assert_eq!(scroll_axis(0, 3, 5, 3, 99), 2);
        assert_eq!(scroll_axis(0, 0, 2, 5, 99), 0);
    }

    #[test]
    fn truncate_by_display_width() {
        assert_eq!(truncate("hello", 3), "hel");
        assert_eq!(truncate("日本語", 3), "日");
        assert_eq!(truncate("ab", 5), "ab");
    }

    // -- Geometry -----------------------------------------------------------

    #[test]
    fn layout_reserves_gutter_and_status() {
        let buf = numbered(120);
        let view = plain(&buf, 10, 40, ViewportOptions::default());
        assert_eq!(view.text_height(), 9);
        assert_eq!(view.gutter(), 4);
        assert_eq!(view.text_width(), 36);
        assert_eq!(
            view.window(),
            Window {
                begin_line: 0,
                end_line: 8,
                begin_col: 0,
                end_col: 35,
            }
        );
    }

    #[test]
    fn gutter_hidden_when_no_room() {
        let buf = numbered(120);
        let view = plain(&buf, 5, 4, ViewportOptions::default());
        assert_eq!(view.gutter(), 0);
        assert_eq!(view.text_width(), 4);
    }

    #[test]
    fn vertical_scroll_keeps_margin() {
        let mut buf = numbered(100);
        let mut view = plain(&buf, 10, 40, ViewportOptions::default());

        assert!(view.goto(&mut buf, Position::new(20, 0)));
        assert_eq!(view.window().begin_line, 14);
        assert_eq!(view.window().end_line, 22);

        assert!(view.goto(&mut buf, Position::new(15, 0)));
        assert_eq!(view.window().begin_line, 13);

        assert!(view.goto(&mut buf, Position::new(99, 0)));
        assert_eq!(view.window().begin_line, 91);
        assert_eq!(view.window().end_line, 99);

        assert!(view.goto(&mut buf, Position::new(0, 0)));
        assert_eq!(view.window().begin_line, 0);
    }

    #[test]
    fn margin_holds_on_every_line() {
        let mut buf = numbered(60);
        let mut view = plain(&buf, 12, 40, ViewportOptions::default());
        let last = buf.line_count() - 1;

        let down = 0..=last;
        let up = (0..=last).rev();
        for line in down.chain(up) {
            assert!(view.goto(&mut buf, Position::new(line, 0)));
            let w = view.window();
            let m = view.margin();
            assert!(w.contains_line(line));
            if w.begin_line > 0 {
                assert!(line >= w.begin_line + m, "line {line} in {w:?}");
            }
            if w.end_line < last {
                assert!(line + m <= w.end_line, "line {line} in {w:?}");
            }
        }
    }

    #[test]
    fn small_buffer_stays_at_top() {
        let mut buf = numbered(3);
        let mut view = plain(&buf, 10, 40, ViewportOptions::default());
        assert!(view.goto(&mut buf, Position::new(2, 0)));
        assert_eq!(view.window().begin_line, 0);
    }

    #[test]
    fn goto_invalid_changes_nothing() {
        let mut buf = numbered(3);
        let mut view = plain(&buf, 10, 40, ViewportOptions::default());
        let before = view.window();
        assert!(!view.goto(&mut buf, Position::new(7, 0)));
        assert!(!view.goto(&mut buf, Position::new(0, 50)));
        assert_eq!(view.window(), before);
        assert_eq!(buf.cursor(), Position::ZERO);
    }

    #[test]
    fn horizontal_scroll_and_reset() {
        let mut buf = Buffer::from_text(&format!("{}\nshort", "x".repeat(200)));
        let mut view = plain(&buf, 5, 20, bare());

        assert!(view.goto(&mut buf, Position::new(0, 30)));
        assert_eq!(view.window().begin_col, 13);
        assert_eq!(view.window().end_col, 32);

        // A line shorter than the scroll offset resets to column 0.
        assert!(view.goto(&mut buf, Position::new(1, 0)));
        assert_eq!(view.window().begin_col, 0);
    }

    #[test]
    fn scroll_cols_counts_cells() {
        let ascii = vec![1; 200];
        assert_eq!(scroll_cols(&ascii, 0, 20, 2, 30), 13);
        assert_eq!(scroll_cols(&ascii, 13, 20, 2, 14), 12);
        assert_eq!(scroll_cols(&ascii, 0, 0, 2, 30), 0);

        let wide = vec![2; 40];
        assert_eq!(scroll_cols(&wide, 0, 20, 2, 15), 8);
        // End of line: the cell after the last char counts as one.
        assert_eq!(scroll_cols(&wide, 0, 20, 2, 40), 31);
        assert_eq!(last_visible_col(&wide, 8, 20), 17);
        assert_eq!(last_visible_col(&ascii, 13, 20), 32);
    }

    #[test]
    fn horizontal_scroll_keeps_wide_cursor_visible() {
        let mut buf = Buffer::from_text(&"日".repeat(40));
        let mut view = plain(&buf, 1, 20, bare());

        assert!(view.goto(&mut buf, Position::new(0, 15)));
        assert_eq!(view.window().begin_col, 8);
        assert_eq!(view.window().end_col, 17);
        assert_eq!(view.cursor_screen_position(&buf), Some((14, 0)));
        assert_eq!(view.render(&buf), vec!["日".repeat(10)]);

        assert!(view.goto(&mut buf, Position::new(0, 40)));
        assert_eq!(view.cursor_screen_position(&buf), Some((18, 0)));

        assert!(view.goto(&mut buf, Position::new(0, 5)));
        assert_eq!(view.window().begin_col, 3);
        assert_eq!(view.cursor_screen_position(&buf), Some((4, 0)));
    }

    #[test]
    fn every_column_of_a_mixed_line_is_visible() {
        let text = "a日b本c語".repeat(6);
        let mut buf = Buffer::from_text(&text);
        let mut view = plain(&buf, 1, 9, bare());
        let len = buf.line_len(0).unwrap();
        for col in 0..=len {
            assert!(view.goto(&mut buf, Position::new(0, col)));
            assert!(
                view.cursor_screen_position(&buf).is_some(),
                "col {col} off screen in {:?}",
                view.window()
            );
        }
    }

    #[test]
    fn resize_is_idempotent() {
        let mut buf = numbered(100);
        let mut view = plain(&buf, 10, 40, ViewportOptions::default());
        assert!(view.goto(&mut buf, Position::new(50, 3)));

        view.resize(&buf, 20, 60);
        let once = view.window();
        view.resize(&buf, 20, 60);
        assert_eq!(view.window(), once);
        assert!(once.contains_line(50));
    }

    #[test]
    fn sync_follows_edits() {
        let mut buf = numbered(9);
        let mut view = plain(&buf, 6, 40, ViewportOptions::default());
        assert_eq!(view.gutter(), 2);

        assert!(buf.goto(Position::new(8, 6)));
        buf.set_mode(BufferMode::Input);
        buf.insert_text("\n\n\n");
        view.sync(&buf);

        // Now 12 lines: wider gutter, cursor still visible.
        assert_eq!(view.gutter(), 3);
        assert!(view.window().contains_line(11));
    }

    // -- Rendering ----------------------------------------------------------

    #[test]
    fn render_gutter_text_and_tildes() {
        let buf = Buffer::from_text("ab\ncd");
        let mut view = plain(&buf, 4, 20, ViewportOptions::default());
        let rows = view.render(&buf);

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], format!("1 ab{}", " ".repeat(16)));
        assert_eq!(rows[1], format!("2 cd{}", " ".repeat(16)));
        assert_eq!(rows[2], format!("  ~{}", " ".repeat(17)));
        assert_eq!(
            strip_ansi(&rows[3]),
            format!(" [No Name]{} 1:1 ", " ".repeat(5))
        );
    }

    #[test]
    fn render_rows_fill_width() {
        let mut buf = numbered(30);
        let mut view = Viewport::new(&buf, 8, 25, ViewportOptions::default());
        assert!(view.goto(&mut buf, Position::new(17, 4)));
        for row in view.render(&buf) {
            assert_eq!(strip_ansi(&row).width(), 25);
        }
    }

    #[test]
    fn render_scrolled_columns() {
        let mut buf = Buffer::from_text("0123456789abcdef");
        let mut view = plain(&buf, 1, 6, bare());
        assert!(view.goto(&mut buf, Position::new(0, 9)));
        assert_eq!(view.render(&buf), vec!["6789ab"]);
    }

    #[test]
    fn render_wide_chars_fit_width() {
        let buf = Buffer::from_text("日本語");
        let mut view = plain(&buf, 1, 5, bare());
        let rows = view.render(&buf);
        assert_eq!(rows, vec!["日本 "]);
    }

    #[test]
    fn status_shows_label_and_modified_flag() {
        let mut buf = Buffer::from_text("");
        buf.set_mode(BufferMode::Input);
        buf.insert_text("x");
        let mut view = plain(&buf, 2, 30, bare_status());
        view.set_status_label("INSERT");
        let rows = view.render(&buf);
        assert_eq!(
            strip_ansi(&rows[1]),
            format!(" INSERT | [No Name] [+]{} 1:2 ", " ".repeat(2))
        );
    }

    fn bare_status() -> ViewportOptions {
        ViewportOptions {
            show_gutter: false,
            ..ViewportOptions::default()
        }
    }

    #[test]
    fn status_truncates_left_side() {
        let buf = Buffer::from_text("");
        let mut view = plain(&buf, 1, 8, bare_status());
        let rows = view.render(&buf);
        assert_eq!(rows.len(), 1);
        assert_eq!(strip_ansi(&rows[0]), " [N 1:1 ");
    }

    #[test]
    fn cursor_highlight_in_render() {
        let mut buf = Buffer::from_text("abc");
        let mut view = Viewport::new(&buf, 1, 3, bare());
        assert!(view.goto(&mut buf, Position::new(0, 1)));
        let rows = view.render(&buf);
        assert_eq!(rows[0], "a\x1b[7mb\x1b[27mc");

        view.set_focused(false);
        assert_eq!(view.render(&buf)[0], "abc");
    }

    // -- Cursor position ----------------------------------------------------

    #[test]
    fn cursor_screen_position_accounts_for_gutter_and_scroll() {
        let mut buf = numbered(100);
        let mut view = plain(&buf, 10, 40, ViewportOptions::default());
        assert!(view.goto(&mut buf, Position::new(20, 3)));
        // begin_line 14, gutter 4.
        assert_eq!(view.cursor_screen_position(&buf), Some((7, 6)));
    }

    #[test]
    fn cursor_screen_position_wide_chars() {
        let mut buf = Buffer::from_text("日本語");
        let mut view = plain(&buf, 1, 10, bare());
        assert!(view.goto(&mut buf, Position::new(0, 2)));
        assert_eq!(view.cursor_screen_position(&buf), Some((4, 0)));
    }
}
