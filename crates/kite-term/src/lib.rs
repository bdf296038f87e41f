// SPDX-License-Identifier: MIT
//
// kite-term: terminal adapter for kite.
//
// Just enough terminal plumbing to host the editor core: raw mode and
// the alternate screen, a key parser for legacy terminal encodings, a
// background stdin reader, and a painter that rewrites only the rows
// that changed since the previous frame. Direct termios and ANSI, no
// TUI framework underneath.

pub mod event_loop;
pub mod input;
pub mod paint;
pub mod reader;
pub mod terminal;
