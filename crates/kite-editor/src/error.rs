//! Error types for the editor core.
//!
//! Recoverable failures only: each is shown to the user as a one-line
//! message and leaves editor state untouched.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Buffer file I/O failure.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("buffer has no file name")]
    NoPath,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A search pattern that does not compile.
#[derive(Debug, Error)]
#[error("invalid pattern: {0}")]
pub struct SearchError(#[from] pub regex::Error);

/// Configuration file failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("bad config {}: {source}", path.display())]
    BadConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
