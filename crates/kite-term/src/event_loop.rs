// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop: stdin bytes in, painted rows out.
//
// The loop blocks on the stdin channel with a short timeout. Bytes are
// parsed into keys and handed to the app; a timeout flushes a pending
// lone ESC and gives the app a tick (the editor polls finished I/O
// there). A SIGWINCH handler flips an `AtomicBool` that the loop checks
// every iteration. The frame is rebuilt only when something changed.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::input::{KeyEvent, Parser};
use crate::paint::RowPainter;
use crate::reader::StdinReader;
use crate::terminal::{Size, Terminal};

// ─── SIGWINCH ───────────────────────────────────────────────────────────────

static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
const fn install_sigwinch_handler() {}

// ─── App ────────────────────────────────────────────────────────────────────

/// What the app wants after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// Application side of the loop. Only [`frame`](App::frame) is required.
pub trait App {
    fn on_key(&mut self, _key: &KeyEvent) -> Action {
        Action::Continue
    }

    /// The terminal changed size.
    fn on_resize(&mut self, _size: Size) {}

    /// Called on every idle timeout. Return `true` to request a repaint.
    fn on_tick(&mut self) -> bool {
        false
    }

    /// Checked after every tick; `true` ends the loop.
    fn is_done(&self) -> bool {
        false
    }

    /// One string per screen row.
    fn frame(&mut self) -> Vec<String>;

    /// Hardware cursor cell `(col, row)`, or `None` to hide it.
    fn cursor(&self) -> Option<(u16, u16)> {
        None
    }
}

// ─── EventLoop ──────────────────────────────────────────────────────────────

/// Timeout for `recv_timeout`; doubles as the ESC disambiguation delay.
const TICK: Duration = Duration::from_millis(10);

pub struct EventLoop {
    terminal: Terminal,
    parser: Parser,
    painter: RowPainter,
}

impl EventLoop {
    #[must_use]
    pub fn new() -> Self {
        Self {
            terminal: Terminal::new(),
            parser: Parser::new(),
            painter: RowPainter::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Run until the app returns [`Action::Quit`] or stdin closes. The
    /// terminal is restored even when the inner loop fails.
    ///
    /// # Errors
    ///
    /// Returns an error if entering/leaving the terminal or painting fails.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_sigwinch_handler();
        app.on_resize(self.terminal.size());

        let result = match StdinReader::spawn() {
            Ok((mut reader, rx)) => {
                let result = self.run_inner(app, &rx);
                reader.stop();
                result
            }
            Err(e) => Err(e),
        };

        self.terminal.leave()?;
        result
    }

    fn run_inner(&mut self, app: &mut impl App, rx: &Receiver<Vec<u8>>) -> io::Result<()> {
        let mut dirty = true;

        loop {
            let keys = match rx.recv_timeout(TICK) {
                Ok(bytes) => self.parser.advance(&bytes),
                Err(RecvTimeoutError::Timeout) => {
                    if app.on_tick() {
                        dirty = true;
                    }
                    if app.is_done() {
                        return Ok(());
                    }
                    if self.parser.has_pending() {
                        self.parser.flush()
                    } else {
                        Vec::new()
                    }
                }
                Err(RecvTimeoutError::Disconnected) => return Ok(()),
            };

            for key in &keys {
                if app.on_key(key) == Action::Quit {
                    return Ok(());
                }
                dirty = true;
            }

            if SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
                let size = self.terminal.refresh_size();
                self.painter.force_redraw();
                app.on_resize(size);
                dirty = true;
            }

            if dirty {
                let rows = app.frame();
                self.painter.paint(&rows, app.cursor());
                self.painter.flush()?;
                dirty = false;
            }
        }
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
