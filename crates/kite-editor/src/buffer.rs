//! Text buffer: lines, cursor, history.
//!
//! A `Buffer` wraps a [`ropey::Rope`] that always uses `\n` breaks (input
//! with `\r\n` or `\r` is normalized on load), plus the cursor/anchor pair,
//! the edit mode and a linear [`History`] of single-character edits.
//!
//! # Editing model
//!
//! All mutation flows through [`insert_text`](Buffer::insert_text), one
//! char at a time. The backspace character `'\u{8}'` inside the input
//! deletes the char before the cursor; `'\n'` splits the line. Each applied
//! char becomes one [`EditRecord`], so undo and redo move one character at
//! a time, and a search-and-replace is just more typed input.
//!
//! Columns are char offsets. Byte offsets never leak into the API.

use std::fmt;
use std::fs;
use std::io;
use std::mem;
use std::path::{Path, PathBuf};

use ropey::Rope;
use tracing::debug;

use crate::decorate::ContentModifier;
use crate::error::{Error, Result, SearchError};
use crate::history::{EditKind, EditRecord, History};
use crate::position::{Position, Range, Selection};
use crate::search::{self, Match};
use crate::word::{self, NearbyWords};

/// The char that deletes instead of inserting.
pub const BACKSPACE: char = '\u{8}';

// ---------------------------------------------------------------------------
// BufferMode
// ---------------------------------------------------------------------------

/// What the buffer accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BufferMode {
    /// `insert_text` applies.
    Input,
    /// `insert_text` is ignored.
    #[default]
    ReadOnly,
    /// Like `ReadOnly`, and the anchor stays where selecting began.
    Select,
}

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

/// A text buffer backed by a rope.
///
/// There is always at least one line; an empty document is `[""]`.
pub struct Buffer {
    rope: Rope,
    path: Option<PathBuf>,
    modified: bool,
    sel: Selection,
    mode: BufferMode,
    history: History,
    modifiers: Vec<Box<dyn ContentModifier>>,
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    /// An empty buffer with no file path.
    #[must_use]
    pub fn new() -> Self {
        Self::from_text("")
    }

    /// A buffer holding `text`, line breaks normalized to `\n`.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let rope = if text.contains('\r') {
            Rope::from_str(&normalize_line_endings(text))
        } else {
            Rope::from_str(text)
        };
        Self {
            rope,
            path: None,
            modified: false,
            sel: Selection::default(),
            mode: BufferMode::default(),
            history: History::new(),
            modifiers: Vec::new(),
        }
    }

    /// Load `path` into a new buffer. A file that does not exist yet gives
    /// an empty buffer bound to that path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] when the file exists but cannot be read.
    pub fn load(path: &Path) -> Result<Self> {
        let text = read_file(path)?;
        let mut buf = Self::from_text(&text);
        buf.path = Some(path.to_path_buf());
        Ok(buf)
    }

    /// Attach content modifiers, keeping those whose `can_use` accepts this
    /// buffer. Set the path first: some modifiers look at the file name.
    pub fn set_modifiers(&mut self, modifiers: Vec<Box<dyn ContentModifier>>) {
        let kept: Vec<_> = modifiers.into_iter().filter(|m| m.can_use(self)).collect();
        self.modifiers = kept;
    }

    /// Builder form of [`set_modifiers`](Self::set_modifiers).
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Vec<Box<dyn ContentModifier>>) -> Self {
        self.set_modifiers(modifiers);
        self
    }

    // -- Text access --------------------------------------------------------

    /// Number of lines, at least 1. A trailing `\n` adds an empty last line.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Line `idx` without its line break.
    #[must_use]
    pub fn line(&self, idx: usize) -> Option<String> {
        if idx >= self.rope.len_lines() {
            return None;
        }
        let mut s = self.rope.line(idx).to_string();
        if s.ends_with('\n') {
            s.pop();
        }
        Some(s)
    }

    /// Char count of line `idx`, line break excluded.
    #[must_use]
    pub fn line_len(&self, idx: usize) -> Option<usize> {
        if idx >= self.rope.len_lines() {
            return None;
        }
        let line = self.rope.line(idx);
        let total = line.len_chars();
        if total > 0 && line.char(total - 1) == '\n' {
            Some(total - 1)
        } else {
            Some(total)
        }
    }

    /// The whole document, lines joined with `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// All lines, for tests and snapshots.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        (0..self.line_count()).filter_map(|i| self.line(i)).collect()
    }

    // -- Cursor and mode ----------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Position {
        self.sel.cursor
    }

    #[inline]
    #[must_use]
    pub const fn anchor(&self) -> Position {
        self.sel.anchor
    }

    #[inline]
    #[must_use]
    pub const fn selection(&self) -> Selection {
        self.sel
    }

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> BufferMode {
        self.mode
    }

    /// True when `pos` is a place the cursor may sit: an existing line and
    /// a column up to one past its last char.
    #[must_use]
    pub fn is_valid(&self, pos: Position) -> bool {
        self.line_len(pos.line).is_some_and(|len| pos.col <= len)
    }

    /// Move the cursor. Outside select mode the anchor follows.
    ///
    /// Returns `false` and changes nothing when `pos` is not valid.
    pub fn goto(&mut self, pos: Position) -> bool {
        if !self.is_valid(pos) {
            return false;
        }
        self.place_cursor(pos);
        true
    }

    /// Switch mode. Entering select mode pins the anchor at the cursor;
    /// leaving it collapses the selection.
    pub fn set_mode(&mut self, mode: BufferMode) {
        if mode == self.mode {
            return;
        }
        self.sel = Selection::collapsed(self.sel.cursor);
        self.mode = mode;
    }

    fn place_cursor(&mut self, pos: Position) {
        self.sel.cursor = pos;
        if self.mode != BufferMode::Select {
            self.sel.anchor = pos;
        }
    }

    // -- Editing ------------------------------------------------------------

    /// Type `text` at the cursor. Ignored unless the mode is
    /// [`BufferMode::Input`].
    ///
    /// The text first runs through the content modifiers, then each char is
    /// applied and recorded in the history. A backspace at the very start
    /// of the buffer does nothing and records nothing.
    pub fn insert_text(&mut self, text: &str) {
        if self.mode != BufferMode::Input {
            return;
        }

        let mut modifiers = mem::take(&mut self.modifiers);
        for m in &mut modifiers {
            m.before_process(self, text);
        }
        let mut input = text.to_owned();
        for m in &mut modifiers {
            input = m.process(self, input);
        }
        self.modifiers = modifiers;

        for ch in input.chars() {
            let before = self.sel.cursor;
            if ch == BACKSPACE {
                if let Some(deleted) = self.delete_char_before_cursor() {
                    self.record(EditKind::Delete, before, deleted);
                }
            } else {
                self.insert_char(ch);
                self.record(EditKind::Insert, before, ch);
            }
        }
    }

    fn record(&mut self, kind: EditKind, before: Position, ch: char) {
        self.history.record(EditRecord {
            kind,
            before,
            after: self.sel.cursor,
            ch,
        });
    }

    /// Put `ch` at the cursor and advance. `'\n'` splits the line.
    /// Not recorded in the history.
    fn insert_char(&mut self, ch: char) {
        let Position { line, col } = self.sel.cursor;
        let idx = self.rope.line_to_char(line) + col;
        self.rope.insert_char(idx, ch);
        self.modified = true;
        let next = if ch == '\n' {
            Position::new(line + 1, 0)
        } else {
            Position::new(line, col + 1)
        };
        self.place_cursor(next);
    }

    /// Remove the char before the cursor and return it.
    ///
    /// At column 0 the line is joined onto the previous one and `'\n'` is
    /// returned; at the very start of the buffer nothing happens. This is
    /// the raw operation: it is **not** recorded in the history, type
    /// [`BACKSPACE`] through [`insert_text`](Self::insert_text) for an
    /// undoable delete.
    pub fn delete_char_before_cursor(&mut self) -> Option<char> {
        let Position { line, col } = self.sel.cursor;
        let target = if col > 0 {
            Position::new(line, col - 1)
        } else if line > 0 {
            Position::new(line - 1, self.line_len(line - 1)?)
        } else {
            return None;
        };

        let idx = self.rope.line_to_char(line) + col;
        let ch = self.rope.char(idx - 1);
        self.rope.remove(idx - 1..idx);
        self.modified = true;
        self.place_cursor(target);
        Some(ch)
    }

    /// Revert the last applied edit. No-op with nothing to undo.
    pub fn undo(&mut self) {
        let Some(rec) = self.history.step_back() else {
            return;
        };
        self.place_cursor(rec.after);
        match rec.kind {
            EditKind::Insert => {
                self.delete_char_before_cursor();
            }
            EditKind::Delete => self.insert_char(rec.ch),
        }
    }

    /// Re-apply the last undone edit. No-op with nothing to redo.
    pub fn redo(&mut self) {
        let Some(rec) = self.history.step_forward() else {
            return;
        };
        self.place_cursor(rec.before);
        match rec.kind {
            EditKind::Insert => self.insert_char(rec.ch),
            EditKind::Delete => {
                self.delete_char_before_cursor();
            }
        }
    }

    #[inline]
    #[must_use]
    pub const fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    #[inline]
    #[must_use]
    pub const fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    #[inline]
    #[must_use]
    pub const fn history_len(&self) -> usize {
        self.history.len()
    }

    #[inline]
    #[must_use]
    pub const fn history_cursor(&self) -> usize {
        self.history.cursor()
    }

    // -- Selection ----------------------------------------------------------

    /// Cursor and anchor, low to high.
    #[must_use]
    pub fn selection_range(&self) -> Range {
        self.sel.range()
    }

    /// The selected text, **including** the char under the end position.
    /// Empty when nothing is selected.
    #[must_use]
    pub fn selection_text(&self) -> String {
        if self.sel.is_collapsed() {
            return String::new();
        }
        let Range { start, end } = self.selection_range();

        let mut parts = Vec::with_capacity(end.line - start.line + 1);
        for idx in start.line..=end.line {
            let Some(line) = self.line(idx) else {
                break;
            };
            let from = if idx == start.line { start.col } else { 0 };
            let to = if idx == end.line { end.col + 1 } else { usize::MAX };
            parts.push(line.chars().skip(from).take(to.saturating_sub(from)).collect::<String>());
        }
        parts.join("\n")
    }

    // -- Words and search ---------------------------------------------------

    /// The word at `pos` and its neighbours.
    #[must_use]
    pub fn nearby_words(&self, pos: Position) -> NearbyWords {
        word::nearby_words(self, pos)
    }

    /// All matches of a regex `pattern`, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] when `pattern` does not compile.
    pub fn find(&self, pattern: &str, ignore_case: bool) -> Result<Vec<Match>, SearchError> {
        let re = search::compile(pattern, ignore_case)?;
        Ok(search::find_all(self, &re))
    }

    /// Replace each match, in the order given, by backspacing over it and
    /// typing `replacement`. Every char is an ordinary edit, so the whole
    /// replacement undoes char by char.
    ///
    /// Matches are not re-validated against earlier replacements on the
    /// same line; pass them last-to-first when that matters.
    pub fn replace(&mut self, matches: &[Match], replacement: &str) {
        let mode = self.mode;
        self.set_mode(BufferMode::Input);
        for m in matches {
            if !self.goto(Position::new(m.end.line, m.end.col + 1)) {
                continue;
            }
            let mut input: String = std::iter::repeat_n(BACKSPACE, m.len()).collect();
            input.push_str(replacement);
            self.insert_text(&input);
        }
        self.set_mode(mode);
    }

    // -- Metadata -----------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    #[inline]
    pub fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
    }

    /// File name for the status line, or `[No Name]`.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map_or_else(|| "[No Name]".to_owned(), |n| n.to_string_lossy().into_owned())
    }

    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    #[inline]
    pub const fn mark_saved(&mut self) {
        self.modified = false;
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("lines", &self.line_count())
            .field("cursor", &self.sel.cursor)
            .field("mode", &self.mode)
            .field("modified", &self.modified)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// File helpers
// ---------------------------------------------------------------------------

/// Read a file as text. A missing file reads as empty.
///
/// # Errors
///
/// Returns [`Error::Io`] for any failure other than "not found".
pub fn read_file(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(text) => {
            debug!(path = %path.display(), bytes = text.len(), "read file");
            Ok(text)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "new file");
            Ok(String::new())
        }
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Write `text` through a sibling temp file and a rename, so the target is
/// either the old content or the new, never a partial write. An existing
/// target keeps its permissions.
///
/// # Errors
///
/// Returns [`Error::Io`] when the temp file cannot be written or renamed.
pub fn write_file(path: &Path, text: &str) -> Result<()> {
    let dir = path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .map_or_else(|| "buffer".into(), |n| n.to_string_lossy());
    let temp = dir.join(format!(".{name}.kite-{}", std::process::id()));

    let perms = fs::metadata(path).ok().map(|m| m.permissions());

    fs::write(&temp, text).map_err(|e| Error::io(&temp, e))?;
    if let Some(perms) = perms {
        if let Err(e) = fs::set_permissions(&temp, perms) {
            let _ = fs::remove_file(&temp);
            return Err(Error::io(&temp, e));
        }
    }
    if let Err(e) = fs::rename(&temp, path) {
        let _ = fs::remove_file(&temp);
        return Err(Error::io(path, e));
    }
    debug!(path = %path.display(), bytes = text.len(), "wrote file");
    Ok(())
}

/// Turn `\r\n` and lone `\r` into `\n`.
fn normalize_line_endings(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\r' {
            out.push('\n');
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
        } else {
            out.push(ch);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::decorate::default_modifiers;

    const SAMPLE: &str = "this is a simple test!\n\nthe current file will be used for specs\n\\o/";

    fn sample() -> Buffer {
        Buffer::from_text(SAMPLE)
    }

    fn input_buf(text: &str) -> Buffer {
        let mut buf = Buffer::from_text(text);
        buf.set_mode(BufferMode::Input);
        buf
    }

    // -- Construction -------------------------------------------------------

    #[test]
    fn empty_buffer_has_one_line() {
        let buf = Buffer::new();
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line(0).as_deref(), Some(""));
        assert_eq!(buf.cursor(), Position::ZERO);
        assert_eq!(buf.mode(), BufferMode::ReadOnly);
    }

    #[test]
    fn from_text_splits_lines() {
        let buf = sample();
        assert_eq!(buf.line_count(), 4);
        assert_eq!(buf.line(1).as_deref(), Some(""));
        assert_eq!(buf.line(3).as_deref(), Some("\\o/"));
        assert_eq!(buf.line(4), None);
        assert_eq!(buf.line_len(0), Some(22));
        assert_eq!(buf.line_len(3), Some(3));
    }

    #[test]
    fn crlf_is_normalized() {
        let buf = Buffer::from_text("a\r\nb\rc\n");
        assert_eq!(buf.lines(), vec!["a", "b", "c", ""]);
        assert_eq!(buf.text(), "a\nb\nc\n");
    }

    #[test]
    fn only_newline_breaks_lines() {
        let buf = Buffer::from_text("a\u{c}b\nx\u{2028}y\u{b}\u{85}\u{2029}");
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line(0).as_deref(), Some("a\u{c}b"));
        assert_eq!(buf.line_len(1), Some(6));
    }

    #[test]
    fn backspace_after_line_separator_char() {
        let mut buf = input_buf("x\u{2028}y");
        assert!(buf.goto(Position::new(0, 2)));
        buf.insert_text("\u{8}Z");
        assert_eq!(buf.text(), "xZy");
        assert_eq!(buf.cursor(), Position::new(0, 2));
    }

    #[test]
    fn typing_form_feed_and_separator_stays_on_line() {
        let mut buf = input_buf("x");
        assert!(buf.goto(Position::new(0, 1)));
        buf.insert_text("\u{2028}\u{c}y");
        assert_eq!(buf.lines(), vec!["x\u{2028}\u{c}y"]);
        assert_eq!(buf.cursor(), Position::new(0, 4));
        assert!(buf.is_valid(buf.cursor()));

        buf.undo();
        buf.undo();
        buf.undo();
        assert_eq!(buf.text(), "x");
        assert_eq!(buf.cursor(), Position::new(0, 1));
    }

    #[test]
    fn trailing_newline_gives_empty_last_line() {
        let buf = Buffer::from_text("one\n");
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line_len(1), Some(0));
    }

    // -- goto and modes -----------------------------------------------------

    #[test]
    fn goto_validates() {
        let mut buf = sample();
        assert!(buf.goto(Position::new(0, 22)));
        assert!(!buf.goto(Position::new(0, 23)));
        assert!(!buf.goto(Position::new(4, 0)));
        assert_eq!(buf.cursor(), Position::new(0, 22));
        assert_eq!(buf.anchor(), Position::new(0, 22));
    }

    #[test]
    fn select_mode_pins_anchor() {
        let mut buf = sample();
        assert!(buf.goto(Position::new(0, 6)));
        buf.set_mode(BufferMode::Select);
        assert!(buf.goto(Position::new(0, 1)));
        assert_eq!(buf.anchor(), Position::new(0, 6));
        assert_eq!(buf.cursor(), Position::new(0, 1));

        buf.set_mode(BufferMode::ReadOnly);
        assert_eq!(buf.anchor(), Position::new(0, 1));
    }

    #[test]
    fn read_only_ignores_input() {
        let mut buf = sample();
        buf.insert_text("xyz");
        assert_eq!(buf.text(), SAMPLE);
        assert_eq!(buf.history_len(), 0);
        assert!(!buf.is_modified());
    }

    // -- Editing ------------------------------------------------------------

    #[test]
    fn insert_splits_line_and_records_each_char() {
        let mut buf = sample();
        buf.set_mode(BufferMode::Input);
        assert!(buf.goto(Position::new(0, 5)));
        buf.insert_text("EDITED\n");

        assert_eq!(buf.line(0).as_deref(), Some("this EDITED"));
        assert_eq!(buf.line(1).as_deref(), Some("is a simple test!"));
        assert_eq!(buf.cursor(), Position::new(1, 0));
        assert_eq!(buf.history_len(), 7);
        assert!(buf.is_modified());
    }

    #[test]
    fn backspace_deletes_and_joins_lines() {
        let mut buf = input_buf("ab\ncd");
        assert!(buf.goto(Position::new(1, 0)));
        buf.insert_text("\u{8}");
        assert_eq!(buf.lines(), vec!["abcd"]);
        assert_eq!(buf.cursor(), Position::new(0, 2));

        buf.insert_text("\u{8}");
        assert_eq!(buf.lines(), vec!["acd"]);
        assert_eq!(buf.cursor(), Position::new(0, 1));
    }

    #[test]
    fn backspace_at_origin_is_noop() {
        let mut buf = input_buf("abc");
        buf.insert_text("\u{8}\u{8}");
        assert_eq!(buf.text(), "abc");
        assert_eq!(buf.history_len(), 0);
    }

    #[test]
    fn raw_delete_returns_char() {
        let mut buf = Buffer::from_text("ab\ncd");
        assert!(buf.goto(Position::new(1, 1)));
        assert_eq!(buf.delete_char_before_cursor(), Some('c'));
        assert_eq!(buf.delete_char_before_cursor(), Some('\n'));
        assert_eq!(buf.cursor(), Position::new(0, 2));
        assert!(buf.goto(Position::ZERO));
        assert_eq!(buf.delete_char_before_cursor(), None);
        assert_eq!(buf.history_len(), 0);
    }

    #[test]
    fn modifiers_run_before_insert() {
        let mut buf = Buffer::from_text("").with_modifiers(default_modifiers(4));
        buf.set_mode(BufferMode::Input);
        buf.insert_text("a\tb\r\n");
        assert_eq!(buf.lines(), vec!["a   b", ""]);
    }

    // -- Undo and redo ------------------------------------------------------

    #[test]
    fn undo_round_trip() {
        let mut buf = sample();
        buf.set_mode(BufferMode::Input);
        assert!(buf.goto(Position::new(0, 5)));
        buf.insert_text("EDITED\n");

        for _ in 0..7 {
            buf.undo();
        }
        assert_eq!(buf.text(), SAMPLE);
        assert_eq!(buf.cursor(), Position::new(0, 5));
        assert!(!buf.can_undo());

        for _ in 0..7 {
            buf.redo();
        }
        assert_eq!(buf.line(0).as_deref(), Some("this EDITED"));
        assert_eq!(buf.line(1).as_deref(), Some("is a simple test!"));
        assert!(!buf.can_redo());
    }

    #[test]
    fn undo_deleted_chars() {
        let mut buf = input_buf("ab\ncd");
        assert!(buf.goto(Position::new(1, 1)));
        buf.insert_text("\u{8}\u{8}");
        assert_eq!(buf.lines(), vec!["abd"]);

        buf.undo();
        assert_eq!(buf.lines(), vec!["ab", "d"]);
        buf.undo();
        assert_eq!(buf.lines(), vec!["ab", "cd"]);
        assert_eq!(buf.cursor(), Position::new(1, 1));

        buf.redo();
        buf.redo();
        assert_eq!(buf.lines(), vec!["abd"]);
    }

    #[test]
    fn undo_and_redo_past_bounds_are_noops() {
        let mut buf = input_buf("x");
        buf.undo();
        buf.redo();
        assert_eq!(buf.text(), "x");
        assert_eq!(buf.history_cursor(), 0);
    }

    #[test]
    fn edit_after_undo_drops_redo_tail() {
        let mut buf = input_buf("");
        buf.insert_text("abc");
        buf.undo();
        buf.undo();
        buf.insert_text("z");
        assert_eq!(buf.text(), "az");
        assert_eq!(buf.history_len(), 2);
        assert!(!buf.can_redo());
    }

    #[test]
    fn undo_works_in_read_only_mode() {
        let mut buf = input_buf("");
        buf.insert_text("hi");
        buf.set_mode(BufferMode::ReadOnly);
        buf.undo();
        assert_eq!(buf.text(), "h");
    }

    // -- Selection ----------------------------------------------------------

    #[test]
    fn selection_range_is_normalized() {
        let mut buf = sample();
        assert!(buf.goto(Position::new(0, 6)));
        buf.set_mode(BufferMode::Select);
        assert!(buf.goto(Position::new(0, 1)));
        let r = buf.selection_range();
        assert_eq!((r.start, r.end), (Position::new(0, 1), Position::new(0, 6)));
        assert_eq!(buf.selection_text(), "his is");
    }

    #[test]
    fn selection_text_spans_lines() {
        let mut buf = sample();
        assert!(buf.goto(Position::new(0, 17)));
        buf.set_mode(BufferMode::Select);
        assert!(buf.goto(Position::new(2, 2)));
        assert_eq!(buf.selection_text(), "test!\n\nthe");
    }

    #[test]
    fn collapsed_selection_is_empty() {
        let buf = sample();
        assert_eq!(buf.selection_text(), "");
    }

    // -- Search and replace -------------------------------------------------

    #[test]
    fn find_reports_inclusive_columns() {
        let buf = sample();
        let matches = buf.find("is", false).unwrap();
        let spans: Vec<_> = matches.iter().map(|m| (m.begin.col, m.end.col)).collect();
        assert_eq!(spans, vec![(2, 3), (5, 6)]);
    }

    #[test]
    fn find_bad_pattern() {
        assert!(sample().find("[", false).is_err());
    }

    #[test]
    fn replace_is_undo_safe() {
        let mut buf = sample();
        let mut matches = buf.find("is", false).unwrap();
        matches.reverse();
        buf.replace(&matches, "OK");

        assert_eq!(buf.line(0).as_deref(), Some("thOK OK a simple test!"));
        assert_eq!(buf.mode(), BufferMode::ReadOnly);

        // Two backspaces and two chars per match.
        assert_eq!(buf.history_len(), 8);
        for _ in 0..8 {
            buf.undo();
        }
        assert_eq!(buf.line(0).as_deref(), Some("this is a simple test!"));
    }

    #[test]
    fn replace_with_different_length() {
        let mut buf = Buffer::from_text("a-b-c");
        let mut matches = buf.find("-", false).unwrap();
        matches.reverse();
        buf.replace(&matches, " :: ");
        assert_eq!(buf.text(), "a :: b :: c");
    }

    // -- Metadata -----------------------------------------------------------

    #[test]
    fn display_name() {
        let mut buf = Buffer::new();
        assert_eq!(buf.display_name(), "[No Name]");
        buf.set_path(PathBuf::from("/tmp/notes.txt"));
        assert_eq!(buf.display_name(), "notes.txt");
    }

    // -- File I/O -----------------------------------------------------------

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.txt");
        let buf = Buffer::load(&path).unwrap();
        assert_eq!(buf.lines(), vec![""]);
        assert_eq!(buf.path(), Some(path.as_path()));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        let mut buf = input_buf("");
        buf.insert_text("one\ntwo");
        write_file(&path, &buf.text()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo");

        let loaded = Buffer::load(&path).unwrap();
        assert_eq!(loaded.lines(), vec!["one", "two"]);
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.txt");
        write_file(&path, "data").unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("x.txt")]);
    }

    #[cfg(unix)]
    #[test]
    fn overwrite_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.sh");
        fs::write(&path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

        write_file(&path, "#!/bin/sh\necho hi").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
        assert_eq!(fs::read_to_string(&path).unwrap(), "#!/bin/sh\necho hi");
    }

    #[test]
    fn write_into_missing_dir_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("x.txt");
        let err = write_file(&path, "data").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
