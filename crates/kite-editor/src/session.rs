//! Key dispatch and deferred I/O.
//!
//! A [`Session`] is the single entry point the host talks to. It turns key
//! events into key names and runs them against the [`Workspace`], one at a
//! time, on the caller's thread.
//!
//! Handlers never block on the filesystem. One that needs I/O returns a
//! [`Task`]; the session parks it in its single pending slot and hands it
//! to the host, which runs it (typically on a worker thread) and reports
//! back through [`Session::complete`]. Keys that arrive meanwhile are
//! queued and replayed, in order, once the task is done:
//!
//! ```text
//! key ─▶ pending? ──yes──▶ queue
//!           │no
//!           ▼
//!        dispatch ──Task──▶ pending slot ──▶ host runs I/O
//!                                               │
//!        drain queue ◀── complete(TaskOutput) ◀─┘
//! ```

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use kite_term::input::KeyEvent;
use tracing::{debug, trace, warn};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::buffer::{self, Buffer};
use crate::command::{self, CommandLine};
use crate::config::Config;
use crate::decorate::default_modifiers;
use crate::editor::{Editor, SharedBuffer};
use crate::error::Error;
use crate::keymap::{self, Keymap};
use crate::registry::Registry;

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Blocking work a handler asks the host to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Load { path: PathBuf },
    Save { path: PathBuf, text: String },
}

/// The result of a [`Task`], handed back to [`Session::complete`].
#[derive(Debug)]
pub enum TaskOutput {
    Loaded {
        path: PathBuf,
        result: Result<String, Error>,
    },
    Saved {
        path: PathBuf,
        result: Result<(), Error>,
    },
}

impl Task {
    /// Do the I/O. Blocks; call it off the UI thread.
    #[must_use]
    pub fn run(self) -> TaskOutput {
        match self {
            Self::Load { path } => {
                let result = buffer::read_file(&path);
                TaskOutput::Loaded { path, result }
            }
            Self::Save { path, text } => {
                let result = buffer::write_file(&path, &text);
                TaskOutput::Saved { path, result }
            }
        }
    }
}

/// What a handler asks of the session.
#[derive(Debug)]
pub enum Outcome {
    Handled,
    Task(Task),
    Quit,
}

/// What the session asks of the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Nothing to do beyond repainting.
    Idle,
    /// Run this task and call [`Session::complete`] with its output.
    Task(Task),
    Quit,
}

// ---------------------------------------------------------------------------
// Workspace
// ---------------------------------------------------------------------------

/// Which widget receives keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Editor,
    CommandLine,
}

/// Everything key handlers may touch.
#[derive(Debug)]
pub struct Workspace {
    pub registry: Registry,
    pub editor: Editor,
    pub command_line: CommandLine,
    pub focus: Focus,
    /// One-line feedback shown under the editor.
    pub message: Option<String>,
    pub config: Config,
    height: usize,
    width: usize,
}

impl Workspace {
    /// An empty, unnamed buffer filling `height` by `width` cells.
    #[must_use]
    pub fn new(config: &Config, height: usize, width: usize) -> Self {
        Self::with_text("", config, height, width)
    }

    /// An unnamed buffer holding `text`.
    #[must_use]
    pub fn with_text(text: &str, config: &Config, height: usize, width: usize) -> Self {
        let buf = Buffer::from_text(text).with_modifiers(default_modifiers(config.tab_width));
        let mut registry = Registry::new();
        let shared = registry.insert(buf);
        let editor = Editor::new(
            shared,
            editor_height(height),
            width,
            config.viewport_options(),
        );
        Self {
            registry,
            editor,
            command_line: CommandLine::new(),
            focus: Focus::Editor,
            message: None,
            config: config.clone(),
            height,
            width,
        }
    }

    pub fn set_focus(&mut self, focus: Focus) {
        if focus == Focus::CommandLine {
            self.command_line.clear();
            self.message = None;
        }
        self.focus = focus;
        self.editor.set_focused(focus == Focus::Editor);
    }

    /// A buffer for `path` with this workspace's modifiers.
    fn make_buffer(&self, path: PathBuf, text: &str) -> Buffer {
        let mut buf = Buffer::from_text(text);
        buf.set_path(path);
        buf.set_modifiers(default_modifiers(self.config.tab_width));
        buf
    }

    /// Show `path`: straight away when it is already open, else via a
    /// [`Task::Load`].
    pub fn open(&mut self, path: PathBuf) -> Outcome {
        if let Some(buf) = self.registry.get(&path) {
            self.show(buf);
            return Outcome::Handled;
        }
        self.message = Some(format!("Opening {}...", path.display()));
        Outcome::Task(Task::Load { path })
    }

    /// Load `path` into the registry now, without showing it.
    ///
    /// # Errors
    ///
    /// [`Error::Io`] when the file exists but cannot be read.
    pub fn preload(&mut self, path: &Path) -> Result<(), Error> {
        let tab_width = self.config.tab_width;
        self.registry.open_cached(path, |p| {
            Ok(Buffer::load(p)?.with_modifiers(default_modifiers(tab_width)))
        })?;
        Ok(())
    }

    fn show(&mut self, buf: SharedBuffer) {
        let summary = {
            let b = buf.borrow();
            format!("\"{}\" {} lines", b.display_name(), b.line_count())
        };
        self.editor.open(buf);
        self.message = Some(summary);
    }

    /// Apply a finished task.
    pub fn apply(&mut self, output: TaskOutput) {
        match output {
            TaskOutput::Loaded { path, result } => match result {
                Ok(text) => {
                    let buf = self.make_buffer(path, &text);
                    let shared = self.registry.insert(buf);
                    self.show(shared);
                }
                Err(e) => {
                    warn!(error = %e, "load failed");
                    self.message = Some(e.to_string());
                }
            },
            TaskOutput::Saved { path, result } => match result {
                Ok(()) => {
                    let shared = self.editor.buffer();
                    let name = {
                        let mut b = shared.borrow_mut();
                        b.set_path(path);
                        b.mark_saved();
                        b.display_name()
                    };
                    self.registry.register(shared);
                    self.message = Some(format!("\"{name}\" written"));
                }
                Err(e) => {
                    warn!(error = %e, "save failed");
                    self.message = Some(e.to_string());
                }
            },
        }
    }

    pub fn resize(&mut self, height: usize, width: usize) {
        self.height = height;
        self.width = width;
        self.editor.resize(editor_height(height), width);
    }

    /// Screen rows: the editor, then the command/message line.
    #[must_use]
    pub fn frame(&mut self) -> Vec<String> {
        if self.height == 0 {
            return Vec::new();
        }
        let mut rows = self.editor.render();
        let bottom = match self.focus {
            Focus::CommandLine => self.command_line.prompt(),
            Focus::Editor => self.message.clone().unwrap_or_default(),
        };
        rows.push(fit(&bottom, self.width));
        rows
    }

    /// Terminal cell for the hardware cursor as `(col, row)`.
    #[must_use]
    pub fn cursor(&self) -> Option<(u16, u16)> {
        match self.focus {
            Focus::Editor => self.editor.cursor_screen_position(),
            Focus::CommandLine => {
                let col = self.command_line.prompt().width().min(self.width.saturating_sub(1));
                let row = self.height.checked_sub(1)?;
                Some((u16::try_from(col).ok()?, u16::try_from(row).ok()?))
            }
        }
    }
}

/// Rows left for the editor once the bottom line is taken.
const fn editor_height(height: usize) -> usize {
    height.saturating_sub(1)
}

/// Pad or cut `s` to exactly `width` cells.
fn fit(s: &str, width: usize) -> String {
    let mut out = String::with_capacity(width);
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.extend(std::iter::repeat_n(' ', width - used));
    out
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Input held back while a task is pending.
#[derive(Debug)]
enum Deferred {
    Key(String),
    Open(PathBuf),
}

pub struct Session {
    ws: Workspace,
    keymap: Keymap,
    pending: Option<Task>,
    queue: VecDeque<Deferred>,
}

impl Session {
    #[must_use]
    pub fn new(config: &Config, height: usize, width: usize) -> Self {
        Self::with_workspace(Workspace::new(config, height, width))
    }

    #[must_use]
    pub fn with_workspace(ws: Workspace) -> Self {
        Self {
            ws,
            keymap: Keymap::default(),
            pending: None,
            queue: VecDeque::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn workspace(&self) -> &Workspace {
        &self.ws
    }

    #[inline]
    pub const fn workspace_mut(&mut self) -> &mut Workspace {
        &mut self.ws
    }

    /// The task the host is running, if any.
    #[inline]
    #[must_use]
    pub const fn pending(&self) -> Option<&Task> {
        self.pending.as_ref()
    }

    /// Keys and open requests waiting for the pending task.
    #[inline]
    #[must_use]
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    // -- Input --------------------------------------------------------------

    /// Feed one key event from the terminal.
    pub fn handle_key(&mut self, key: &KeyEvent) -> Response {
        match keymap::normalize(key) {
            Some(name) => self.handle_name(&name),
            None => Response::Idle,
        }
    }

    /// Feed one key name.
    pub fn handle_name(&mut self, name: &str) -> Response {
        if self.pending.is_some() {
            trace!(key = ?name, "queued behind task");
            self.queue.push_back(Deferred::Key(name.to_owned()));
            return Response::Idle;
        }
        let outcome = self.dispatch(name);
        self.settle(outcome)
    }

    /// Open `path` in the editor, e.g. a file named on the command line.
    /// Waits its turn behind a pending task like a key does.
    pub fn open(&mut self, path: PathBuf) -> Response {
        if self.pending.is_some() {
            debug!(path = %path.display(), "open queued behind task");
            self.queue.push_back(Deferred::Open(path));
            return Response::Idle;
        }
        let outcome = self.ws.open(path);
        self.settle(outcome)
    }

    /// Report the output of the pending task, then replay queued keys.
    pub fn complete(&mut self, output: TaskOutput) -> Response {
        if let Some(task) = self.pending.take() {
            debug!(?task, "task finished");
        }
        self.ws.apply(output);

        while let Some(next) = self.queue.pop_front() {
            let outcome = match next {
                Deferred::Key(name) => self.dispatch(&name),
                Deferred::Open(path) => self.ws.open(path),
            };
            match self.settle(outcome) {
                Response::Idle => {}
                other => return other,
            }
        }
        Response::Idle
    }

    fn dispatch(&mut self, name: &str) -> Outcome {
        if name == "ctrl-z" || name == "ctrl-q" {
            return Outcome::Quit;
        }
        match self.ws.focus {
            Focus::Editor => self.keymap.dispatch(&mut self.ws, name),
            Focus::CommandLine => command::handle_key(&mut self.ws, name),
        }
    }

    fn settle(&mut self, outcome: Outcome) -> Response {
        match outcome {
            Outcome::Handled => Response::Idle,
            Outcome::Quit => {
                debug!("quit requested");
                Response::Quit
            }
            Outcome::Task(task) => {
                debug!(?task, "task started");
                self.pending = Some(task.clone());
                Response::Task(task)
            }
        }
    }

    // -- Display ------------------------------------------------------------

    pub fn resize(&mut self, height: usize, width: usize) {
        self.ws.resize(height, width);
    }

    #[must_use]
    pub fn frame(&mut self) -> Vec<String> {
        self.ws.frame()
    }

    #[must_use]
    pub fn cursor(&self) -> Option<(u16, u16)> {
        self.ws.cursor()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
