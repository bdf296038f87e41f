//! User configuration, read from `config.toml`.
//!
//! Every field is optional; anything left out keeps its default.
//!
//! ```toml
//! margin = 2
//! line_numbers = true
//! status_line = true
//! column_marker = 80
//! tab_width = 4
//! ignore_case = false
//! log_file = "/tmp/kite.log"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;
use crate::viewport::ViewportOptions;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Lines and columns kept between the cursor and the window edge.
    pub margin: usize,
    pub line_numbers: bool,
    pub status_line: bool,
    /// 1-based column to underline; 0 disables.
    pub column_marker: usize,
    /// Spaces per tab stop when typing; 0 keeps literal tabs.
    pub tab_width: usize,
    /// Case-insensitive `find` and `replace`.
    pub ignore_case: bool,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            margin: 2,
            line_numbers: true,
            status_line: true,
            column_marker: 80,
            tab_width: 4,
            ignore_case: false,
            log_file: None,
        }
    }
}

impl Config {
    /// `<config dir>/kite/config.toml`, e.g. `~/.config/kite/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("kite").join("config.toml"))
    }

    /// Load from `path`, or from [`default_path`](Self::default_path) when
    /// `None`. A missing file gives the defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] when the file exists but cannot be read,
    /// [`ConfigError::BadConfig`] when it is not valid config TOML.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path.map(Path::to_path_buf).or_else(Self::default_path) else {
            return Ok(Self::default());
        };
        match fs::read_to_string(&path) {
            Ok(text) => {
                debug!(path = %path.display(), "loading config");
                Self::parse(&text).map_err(|source| ConfigError::BadConfig { path, source })
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }

    /// Parse config TOML.
    ///
    /// # Errors
    ///
    /// The TOML error for malformed input or unknown keys.
    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Viewport settings for a focused editor view.
    #[must_use]
    pub const fn viewport_options(&self) -> ViewportOptions {
        ViewportOptions {
            margin: self.margin,
            show_gutter: self.line_numbers,
            show_status: self.status_line,
            focused: true,
            column_marker: self.column_marker,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
