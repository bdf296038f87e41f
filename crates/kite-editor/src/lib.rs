//! # kite-editor: Editor core for kite
//!
//! Everything except the terminal itself:
//!
//! - **[`position`]**: `Position`, `Range` and `Selection`, 0-indexed
//! - **[`buffer`]**: `Buffer`: a rope with cursor, selection, undo history and file I/O
//! - **[`word`]** / **[`search`]**: word tokenizing and regex matches over a buffer
//! - **[`decorate`]**: content modifiers (typed text) and render decorators (cells)
//! - **[`viewport`]**: the visible window of a buffer and its rendering
//! - **[`editor`]**: `Navigate` / `Insert` / `Select` modes over one viewport
//! - **[`keymap`]** / **[`command`]**: key tables and `:` commands
//! - **[`session`]**: key dispatch with deferred file I/O
//!
//! The host owns the terminal: it feeds key events to a
//! [`Session`](session::Session), runs the [`Task`](session::Task)s it gets
//! back, and paints [`Session::frame`](session::Session::frame).

pub mod buffer;
pub mod command;
pub mod config;
pub mod decorate;
pub mod editor;
pub mod error;
pub mod history;
pub mod keymap;
pub mod position;
pub mod registry;
pub mod search;
pub mod session;
pub mod viewport;
pub mod word;

pub use error::{ConfigError, Error, Result, SearchError};
