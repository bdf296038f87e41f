// SPDX-License-Identifier: MIT
//
// kite: a small modal terminal text editor.
//
// The binary wires the two crates together:
//
//   kite-term   → raw mode, key parsing, row painting, event loop
//   kite-editor → buffers, viewports, modes, key dispatch
//
// `Kite` implements kite-term's App trait around a kite-editor Session.
// Keys run on the loop thread. File loads and saves come back from the
// session as tasks and run on a worker thread; their results are picked
// up on the next idle tick:
//
//   stdin → parser → on_key → Session::handle_key ─Task─▶ worker
//   on_tick ◀─ results channel ◀─────────────────────────── worker
//
// Layout:
//
//   ┌──────────────────────────────┐
//   │ gutter + text                │  ← rows - 2
//   ├──────────────────────────────┤
//   │ status line (reverse video)  │  ← 1 row (viewport)
//   ├──────────────────────────────┤
//   │ command / message line       │  ← 1 row (workspace)
//   └──────────────────────────────┘

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use kite_editor::config::Config;
use kite_editor::session::{Response, Session, Task, TaskOutput};
use kite_term::event_loop::{Action, App, EventLoop};
use kite_term::input::KeyEvent;
use kite_term::terminal::{self, Size};

// ─── Command line ───────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(name = "kite", version, about)]
struct Cli {
    /// Files to open. The first is shown; the rest are loaded in the
    /// background and can be switched to with `:open`.
    files: Vec<PathBuf>,

    /// Config file (default: <config dir>/kite/config.toml).
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write a log to this file. Overrides `log_file` in the config.
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,

    /// More log detail: -v info, -vv debug, -vvv trace. `KITE_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// ─── Logging ────────────────────────────────────────────────────────────────

const fn level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Log to `path` when one is given. The screen belongs to the editor, so
/// there is no console output. Keep the guard alive until exit so buffered
/// lines are flushed.
fn init_logging(path: Option<&Path>, verbose: u8) -> Result<Option<WorkerGuard>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .with_context(|| format!("log path has no file name: {}", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_env("KITE_LOG").unwrap_or_else(|_| EnvFilter::new(level(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))?;
    Ok(Some(guard))
}

// ─── I/O worker ─────────────────────────────────────────────────────────────

/// One background thread that runs tasks in submission order.
struct Worker {
    tasks: Sender<Task>,
    results: Receiver<TaskOutput>,
}

impl Worker {
    fn spawn() -> Result<Self> {
        let (tasks, task_rx) = mpsc::channel::<Task>();
        let (result_tx, results) = mpsc::channel();
        thread::Builder::new()
            .name("kite-io".into())
            .spawn(move || {
                for task in task_rx {
                    debug!(?task, "running task");
                    if result_tx.send(task.run()).is_err() {
                        break;
                    }
                }
            })
            .context("spawning I/O thread")?;
        Ok(Self { tasks, results })
    }
}

// ─── App ────────────────────────────────────────────────────────────────────

struct Kite {
    session: Session,
    worker: Worker,
    done: bool,
}

impl Kite {
    /// Act on what the session asked for.
    fn respond(&mut self, response: Response) {
        match response {
            Response::Idle => {}
            Response::Quit => self.done = true,
            Response::Task(task) => {
                if let Err(mpsc::SendError(task)) = self.worker.tasks.send(task) {
                    // The worker is gone; finish the task here.
                    warn!("I/O thread stopped, running task inline");
                    let next = self.session.complete(task.run());
                    self.respond(next);
                }
            }
        }
    }
}

impl App for Kite {
    fn on_key(&mut self, key: &KeyEvent) -> Action {
        let response = self.session.handle_key(key);
        self.respond(response);
        if self.done { Action::Quit } else { Action::Continue }
    }

    fn on_resize(&mut self, size: Size) {
        self.session
            .resize(usize::from(size.rows), usize::from(size.cols));
    }

    fn on_tick(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.worker.results.try_recv() {
                Ok(output) => {
                    let next = self.session.complete(output);
                    self.respond(next);
                    changed = true;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return changed,
            }
        }
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn frame(&mut self) -> Vec<String> {
        self.session.frame()
    }

    fn cursor(&self) -> Option<(u16, u16)> {
        self.session.cursor()
    }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("loading config")?;
    let log_path = cli.log.as_deref().or(config.log_file.as_deref());
    let _guard = init_logging(log_path, cli.verbose)?;

    if !terminal::is_tty() {
        bail!("stdin is not a terminal");
    }

    let mut event_loop = EventLoop::new();
    let size = event_loop.size();
    info!(cols = size.cols, rows = size.rows, "starting");

    let mut session = Session::new(&config, usize::from(size.rows), usize::from(size.cols));
    let mut files = cli.files.into_iter();
    let first = files.next();
    for path in files {
        session
            .workspace_mut()
            .preload(&path)
            .with_context(|| format!("opening {}", path.display()))?;
    }

    let mut kite = Kite {
        session,
        worker: Worker::spawn()?,
        done: false,
    };
    if let Some(path) = first {
        let response = kite.session.open(path);
        kite.respond(response);
    }

    event_loop.run(&mut kite).context("terminal")?;
    info!("exiting");
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────────────
