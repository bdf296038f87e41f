//! Key names and per-mode key tables.
//!
//! A terminal [`KeyEvent`] is first reduced to a **key name**, a short
//! string such as `"j"`, `"ctrl-r"`, `"up"` or `"\n"`. Each editor mode then
//! has a table from names to handlers plus a fallback for names the table
//! does not list. Insert mode's fallback is what types text.

use std::collections::HashMap;

use kite_term::input::{KeyCode, KeyEvent, Modifiers};
use tracing::trace;

use crate::buffer::BACKSPACE;
use crate::editor::EditorMode;
use crate::position::Position;
use crate::session::{Focus, Outcome, Workspace};

/// A key handler. Gets the workspace and the key name that triggered it.
pub type Handler = fn(&mut Workspace, &str) -> Outcome;

// ---------------------------------------------------------------------------
// Key names
// ---------------------------------------------------------------------------

/// The key name for `key`, or `None` for keys that have no binding at all
/// (Escape, Alt combinations, bare modifiers).
#[must_use]
pub fn normalize(key: &KeyEvent) -> Option<String> {
    if key.modifiers.contains(Modifiers::ALT) {
        return None;
    }
    if key.modifiers.contains(Modifiers::CTRL) {
        return match key.code {
            KeyCode::Char(' ') => Some("ctrl-space".to_owned()),
            KeyCode::Char(c) => Some(format!("ctrl-{}", c.to_ascii_lowercase())),
            _ => None,
        };
    }

    let name = match key.code {
        KeyCode::Char(c) => return Some(c.to_string()),
        KeyCode::Backspace => return Some(BACKSPACE.to_string()),
        KeyCode::Enter => "\n",
        KeyCode::Tab => "\t",
        KeyCode::Up => "up",
        KeyCode::Down => "down",
        KeyCode::Left => "left",
        KeyCode::Right => "right",
        KeyCode::Home => "home",
        KeyCode::End => "end",
        KeyCode::PageUp => "pageup",
        KeyCode::PageDown => "pagedown",
        KeyCode::Delete => "delete",
        KeyCode::Insert => "insert",
        KeyCode::Escape => return None,
    };
    Some(name.to_owned())
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Bindings for one mode.
pub struct ModeTable {
    bindings: HashMap<&'static str, Handler>,
    default: Handler,
}

impl ModeTable {
    #[must_use]
    pub fn new(default: Handler) -> Self {
        Self {
            bindings: HashMap::new(),
            default,
        }
    }

    /// Bind every name in `names` to `handler`.
    #[must_use]
    pub fn bind(mut self, names: &[&'static str], handler: Handler) -> Self {
        for name in names {
            self.bindings.insert(*name, handler);
        }
        self
    }

    /// The handler for `name`, else the fallback.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Handler {
        self.bindings.get(name).copied().unwrap_or(self.default)
    }

    #[must_use]
    pub fn is_bound(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }
}

/// Tables for every editor mode.
pub struct Keymap {
    navigate: ModeTable,
    insert: ModeTable,
    select: ModeTable,
}

impl Keymap {
    #[must_use]
    pub fn new(navigate: ModeTable, insert: ModeTable, select: ModeTable) -> Self {
        Self {
            navigate,
            insert,
            select,
        }
    }

    #[must_use]
    pub const fn table(&self, mode: EditorMode) -> &ModeTable {
        match mode {
            EditorMode::Navigate => &self.navigate,
            EditorMode::Insert => &self.insert,
            EditorMode::Select => &self.select,
        }
    }

    /// Run the handler for `name` in the editor's current mode.
    pub fn dispatch(&self, ws: &mut Workspace, name: &str) -> Outcome {
        let mode = ws.editor.mode();
        trace!(%mode, key = ?name, "dispatch");
        (self.table(mode).lookup(name))(ws, name)
    }
}

impl Default for Keymap {
    fn default() -> Self {
        let motions = |table: ModeTable| {
            table
                .bind(&["left"], move_left)
                .bind(&["right"], move_right)
                .bind(&["up"], move_up)
                .bind(&["down"], move_down)
                .bind(&["home"], line_start)
                .bind(&["end"], line_end)
                .bind(&["pageup"], page_up)
                .bind(&["pagedown"], page_down)
        };

        let navigate = motions(ModeTable::new(ignore))
            .bind(&["h"], move_left)
            .bind(&["l"], move_right)
            .bind(&["k"], move_up)
            .bind(&["j"], move_down)
            .bind(&["i", "\n"], enter_insert)
            .bind(&["v"], enter_select)
            .bind(&[":"], focus_command_line)
            .bind(&["u"], undo)
            .bind(&["ctrl-r"], redo);

        let insert = motions(ModeTable::new(type_text)).bind(&["ctrl-h"], enter_navigate);

        let select = motions(ModeTable::new(ignore))
            .bind(&["h"], move_left)
            .bind(&["l"], move_right)
            .bind(&["k"], move_up)
            .bind(&["j"], move_down)
            .bind(&["ctrl-h"], enter_navigate);

        Self::new(navigate, insert, select)
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn ignore(_ws: &mut Workspace, _name: &str) -> Outcome {
    Outcome::Handled
}

/// Insert-mode fallback: single chars (including `\n`, `\t` and
/// backspace) are typed; other names are dropped.
fn type_text(ws: &mut Workspace, name: &str) -> Outcome {
    let mut chars = name.chars();
    if let (Some(_), None) = (chars.next(), chars.next()) {
        ws.editor.input(name);
    }
    Outcome::Handled
}

fn move_left(ws: &mut Workspace, _name: &str) -> Outcome {
    ws.editor.move_by(0, -1);
    Outcome::Handled
}

fn move_right(ws: &mut Workspace, _name: &str) -> Outcome {
    ws.editor.move_by(0, 1);
    Outcome::Handled
}

fn move_up(ws: &mut Workspace, _name: &str) -> Outcome {
    ws.editor.move_by(-1, 0);
    Outcome::Handled
}

fn move_down(ws: &mut Workspace, _name: &str) -> Outcome {
    ws.editor.move_by(1, 0);
    Outcome::Handled
}

fn line_start(ws: &mut Workspace, _name: &str) -> Outcome {
    let line = ws.editor.cursor().line;
    ws.editor.goto(Position::new(line, 0));
    Outcome::Handled
}

fn line_end(ws: &mut Workspace, _name: &str) -> Outcome {
    let line = ws.editor.cursor().line;
    let len = ws.editor.buffer().borrow().line_len(line).unwrap_or(0);
    ws.editor.goto(Position::new(line, len));
    Outcome::Handled
}

fn page_by(ws: &mut Workspace, down: bool) {
    let page = ws.editor.viewport().text_height().max(1);
    let last = ws.editor.buffer().borrow().line_count() - 1;
    let line = ws.editor.cursor().line;
    let target = if down {
        (line + page).min(last)
    } else {
        line.saturating_sub(page)
    };
    if target != line {
        #[allow(clippy::cast_possible_wrap)]
        let delta = target as isize - line as isize;
        ws.editor.move_by(delta, 0);
    }
}

fn page_up(ws: &mut Workspace, _name: &str) -> Outcome {
    page_by(ws, false);
    Outcome::Handled
}

fn page_down(ws: &mut Workspace, _name: &str) -> Outcome {
    page_by(ws, true);
    Outcome::Handled
}

fn enter_insert(ws: &mut Workspace, _name: &str) -> Outcome {
    ws.editor.set_mode(EditorMode::Insert);
    Outcome::Handled
}

fn enter_select(ws: &mut Workspace, _name: &str) -> Outcome {
    ws.editor.set_mode(EditorMode::Select);
    Outcome::Handled
}

fn enter_navigate(ws: &mut Workspace, _name: &str) -> Outcome {
    ws.editor.set_mode(EditorMode::Navigate);
    Outcome::Handled
}

fn focus_command_line(ws: &mut Workspace, _name: &str) -> Outcome {
    ws.set_focus(Focus::CommandLine);
    Outcome::Handled
}

fn undo(ws: &mut Workspace, _name: &str) -> Outcome {
    ws.editor.undo();
    Outcome::Handled
}

fn redo(ws: &mut Workspace, _name: &str) -> Outcome {
    ws.editor.redo();
    Outcome::Handled
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
