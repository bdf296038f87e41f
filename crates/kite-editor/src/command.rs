//! The `:` command line.
//!
//! Pressing `:` in navigate mode moves focus here. Printable keys build the
//! input, backspace edits it (and hands focus back once it is empty), Enter
//! runs it.
//!
//! | Command                         | Action                               |
//! |---------------------------------|--------------------------------------|
//! | `save [path]`, `w [path]`       | Write the buffer, optionally save-as |
//! | `open <path>`, `e <path>`       | Show a file, loading it if needed    |
//! | `find <regex>`                  | Jump to the next match               |
//! | `replace <regex> <text>`        | Replace every match                  |
//! | `quit`, `q`                     | Quit                                 |

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::buffer::BACKSPACE;
use crate::error::Error;
use crate::position::Position;
use crate::search;
use crate::session::{Focus, Outcome, Task, Workspace};

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Save(Option<PathBuf>),
    Open(PathBuf),
    Find(String),
    Replace { pattern: String, value: String },
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Command not found.")]
    NotFound,

    #[error("Usage: {0}")]
    Usage(&'static str),
}

impl Command {
    /// Parse a command line. Words are split on whitespace; `find` and
    /// `replace` rejoin trailing words with single spaces.
    ///
    /// # Errors
    ///
    /// [`CommandError::NotFound`] for an unknown or empty command,
    /// [`CommandError::Usage`] when arguments are missing.
    pub fn parse(input: &str) -> Result<Self, CommandError> {
        let mut words = input.split_whitespace();
        let name = words.next().ok_or(CommandError::NotFound)?;
        let args: Vec<&str> = words.collect();

        match name {
            "save" | "w" => Ok(Self::Save(args.first().map(PathBuf::from))),
            "open" | "e" => args
                .first()
                .map(|p| Self::Open(PathBuf::from(p)))
                .ok_or(CommandError::Usage("open <path>")),
            "find" if !args.is_empty() => Ok(Self::Find(args.join(" "))),
            "find" => Err(CommandError::Usage("find <pattern>")),
            "replace" if args.len() >= 2 => Ok(Self::Replace {
                pattern: args[0].to_owned(),
                value: args[1..].join(" "),
            }),
            "replace" => Err(CommandError::Usage("replace <pattern> <value>")),
            "quit" | "q" => Ok(Self::Quit),
            _ => Err(CommandError::NotFound),
        }
    }
}

// ---------------------------------------------------------------------------
// CommandLine
// ---------------------------------------------------------------------------

/// The text typed after `:`. The prompt itself is not stored.
#[derive(Debug, Clone, Default)]
pub struct CommandLine {
    input: String,
}

impl CommandLine {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            input: String::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.input.is_empty()
    }

    pub fn insert_char(&mut self, ch: char) {
        self.input.push(ch);
    }

    /// Delete the last char. `false` when there was nothing to delete.
    pub fn backspace(&mut self) -> bool {
        self.input.pop().is_some()
    }

    pub fn clear(&mut self) {
        self.input.clear();
    }

    /// Take the input, leaving the line empty.
    pub fn take(&mut self) -> String {
        std::mem::take(&mut self.input)
    }

    /// The prompt row as shown on screen.
    #[must_use]
    pub fn prompt(&self) -> String {
        format!(":{}", self.input)
    }
}

// ---------------------------------------------------------------------------
// Key handling and execution
// ---------------------------------------------------------------------------

/// Handle a key while the command line has focus.
pub fn handle_key(ws: &mut Workspace, name: &str) -> Outcome {
    if name == "\n" {
        let input = ws.command_line.take();
        ws.set_focus(Focus::Editor);
        return match Command::parse(&input) {
            Ok(cmd) => execute(ws, cmd),
            Err(e) => {
                ws.message = Some(e.to_string());
                Outcome::Handled
            }
        };
    }

    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(BACKSPACE), None) => {
            if !ws.command_line.backspace() {
                ws.set_focus(Focus::Editor);
            }
        }
        (Some(ch), None) if !ch.is_control() => ws.command_line.insert_char(ch),
        _ => {}
    }
    Outcome::Handled
}

/// Run a parsed command against the workspace.
pub fn execute(ws: &mut Workspace, cmd: Command) -> Outcome {
    debug!(?cmd, "command");
    match cmd {
        Command::Save(path) => save(ws, path),
        Command::Open(path) => ws.open(path),
        Command::Find(pattern) => {
            find(ws, &pattern);
            Outcome::Handled
        }
        Command::Replace { pattern, value } => {
            replace(ws, &pattern, &value);
            Outcome::Handled
        }
        Command::Quit => Outcome::Quit,
    }
}

fn save(ws: &mut Workspace, path: Option<PathBuf>) -> Outcome {
    let (path, text) = {
        let buf = ws.editor.buffer().borrow();
        (path.or_else(|| buf.path().map(PathBuf::from)), buf.text())
    };
    let Some(path) = path else {
        ws.message = Some(Error::NoPath.to_string());
        return Outcome::Handled;
    };
    ws.message = Some(format!("Writing {}...", path.display()));
    Outcome::Task(Task::Save { path, text })
}

fn find(ws: &mut Workspace, pattern: &str) {
    let result = ws
        .editor
        .buffer()
        .borrow()
        .find(pattern, ws.config.ignore_case);
    let matches = match result {
        Ok(m) => m,
        Err(e) => {
            ws.message = Some(e.to_string());
            return;
        }
    };

    let cursor = ws.editor.cursor();
    let Some(idx) = search::next_after(&matches, cursor) else {
        ws.message = Some(format!("Pattern not found: {pattern}"));
        return;
    };
    ws.editor.goto(matches[idx].begin);
    ws.message = Some(format!("match {}/{}", idx + 1, matches.len()));
}

fn replace(ws: &mut Workspace, pattern: &str, value: &str) {
    let result = ws
        .editor
        .buffer()
        .borrow()
        .find(pattern, ws.config.ignore_case);
    let mut matches = match result {
        Ok(m) => m,
        Err(e) => {
            ws.message = Some(e.to_string());
            return;
        }
    };
    if matches.is_empty() {
        ws.message = Some(format!("Pattern not found: {pattern}"));
        return;
    }

    // Last match first, so earlier columns on a line stay valid.
    matches.sort_by(|a, b| b.begin.cmp(&a.begin));
    let first: Position = matches[matches.len() - 1].begin;
    ws.editor.edit(|buf| buf.replace(&matches, value));
    ws.editor.goto(first);
    ws.message = Some(format!("{} replaced", matches.len()));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn workspace(text: &str) -> Workspace {
        Workspace::with_text(text, &Config::default(), 10, 40)
    }

    fn run(ws: &mut Workspace, line: &str) -> Outcome {
        ws.set_focus(Focus::CommandLine);
        for ch in line.chars() {
            handle_key(ws, &ch.to_string());
        }
        handle_key(ws, "\n")
    }

    // -- parse --------------------------------------------------------------

    #[test]
    fn parse_commands() {
        assert_eq!(Command::parse("save"), Ok(Command::Save(None)));
        assert_eq!(
            Command::parse("w out.txt"),
            Ok(Command::Save(Some(PathBuf::from("out.txt"))))
        );
        assert_eq!(
            Command::parse("  open   a.txt "),
            Ok(Command::Open(PathBuf::from("a.txt")))
        );
        assert_eq!(Command::parse("find is"), Ok(Command::Find("is".into())));
        assert_eq!(
            Command::parse("replace is OK"),
            Ok(Command::Replace {
                pattern: "is".into(),
                value: "OK".into(),
            })
        );
        assert_eq!(Command::parse("q"), Ok(Command::Quit));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(Command::parse("frobnicate"), Err(CommandError::NotFound));
        assert_eq!(Command::parse(""), Err(CommandError::NotFound));
        assert!(matches!(Command::parse("open"), Err(CommandError::Usage(_))));
        assert!(matches!(Command::parse("replace x"), Err(CommandError::Usage(_))));
        assert_eq!(CommandError::NotFound.to_string(), "Command not found.");
    }

    // -- CommandLine --------------------------------------------------------

    #[test]
    fn command_line_editing() {
        let mut cl = CommandLine::new();
        cl.insert_char('w');
        cl.insert_char('q');
        assert_eq!(cl.prompt(), ":wq");
        assert!(cl.backspace());
        assert_eq!(cl.input(), "w");
        assert!(cl.backspace());
        assert!(!cl.backspace());
        assert!(cl.is_empty());
    }

    // -- handle_key ---------------------------------------------------------

    #[test]
    fn backspace_on_empty_returns_focus() {
        let mut ws = workspace("");
        ws.set_focus(Focus::CommandLine);
        handle_key(&mut ws, "a");
        handle_key(&mut ws, "\u{8}");
        assert_eq!(ws.focus, Focus::CommandLine);
        handle_key(&mut ws, "\u{8}");
        assert_eq!(ws.focus, Focus::Editor);
    }

    #[test]
    fn special_names_are_not_typed() {
        let mut ws = workspace("");
        ws.set_focus(Focus::CommandLine);
        handle_key(&mut ws, "up");
        handle_key(&mut ws, "\t");
        assert!(ws.command_line.is_empty());
    }

    #[test]
    fn unknown_command_changes_nothing() {
        let mut ws = workspace("abc");
        let out = run(&mut ws, "bogus");
        assert!(matches!(out, Outcome::Handled));
        assert_eq!(ws.message.as_deref(), Some("Command not found."));
        assert_eq!(ws.editor.buffer().borrow().text(), "abc");
        assert_eq!(ws.focus, Focus::Editor);
    }

    // -- execute ------------------------------------------------------------

    #[test]
    fn find_moves_to_next_match_and_wraps() {
        let mut ws = workspace("this is a simple test!\n\nthe current file will be used for specs\n\\o/");
        run(&mut ws, "find is");
        assert_eq!(ws.editor.cursor(), Position::new(0, 2));
        assert_eq!(ws.message.as_deref(), Some("match 1/2"));
        run(&mut ws, "find is");
        assert_eq!(ws.editor.cursor(), Position::new(0, 5));
        run(&mut ws, "find is");
        assert_eq!(ws.editor.cursor(), Position::new(0, 2));
    }

    #[test]
    fn find_reports_misses_and_bad_patterns() {
        let mut ws = workspace("abc");
        run(&mut ws, "find zzz");
        assert_eq!(ws.message.as_deref(), Some("Pattern not found: zzz"));
        run(&mut ws, "find (");
        assert!(ws.message.as_deref().is_some_and(|m| m.starts_with("invalid pattern")));
        assert_eq!(ws.editor.cursor(), Position::ZERO);
    }

    #[test]
    fn replace_all_matches() {
        let mut ws = workspace("this is a simple test!\nis it?");
        run(&mut ws, "replace is OK");
        assert_eq!(
            ws.editor.buffer().borrow().lines(),
            vec!["thOK OK a simple test!", "OK it?"]
        );
        assert_eq!(ws.message.as_deref(), Some("3 replaced"));
        assert_eq!(ws.editor.cursor(), Position::new(0, 2));
    }

    #[test]
    fn replace_then_undo_restores() {
        let mut ws = workspace("this is a simple test!");
        run(&mut ws, "replace is OK");
        let edits = ws.editor.buffer().borrow().history_len();
        for _ in 0..edits {
            ws.editor.undo();
        }
        assert_eq!(ws.editor.buffer().borrow().text(), "this is a simple test!");
    }

    #[test]
    fn save_without_name() {
        let mut ws = workspace("abc");
        let out = run(&mut ws, "save");
        assert!(matches!(out, Outcome::Handled));
        assert_eq!(ws.message.as_deref(), Some("buffer has no file name"));
    }

    #[test]
    fn save_as_returns_task() {
        let mut ws = workspace("abc");
        let out = run(&mut ws, "w /tmp/out.txt");
        match out {
            Outcome::Task(Task::Save { path, text }) => {
                assert_eq!(path, PathBuf::from("/tmp/out.txt"));
                assert_eq!(text, "abc");
            }
            other => panic!("expected save task, got {other:?}"),
        }
    }

    #[test]
    fn quit_command() {
        let mut ws = workspace("");
        assert!(matches!(run(&mut ws, "quit"), Outcome::Quit));
    }
}
