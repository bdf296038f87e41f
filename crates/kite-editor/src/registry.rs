//! Open buffers, keyed by canonical path.
//!
//! Opening a file that is already open hands back the same shared buffer,
//! so its edits and history survive switching away and back.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::debug;

use crate::buffer::Buffer;
use crate::editor::SharedBuffer;
use crate::error::Result;

#[derive(Debug, Default)]
pub struct Registry {
    buffers: HashMap<PathBuf, SharedBuffer>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The open buffer for `path`, if any.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<SharedBuffer> {
        self.buffers.get(&canonical(path)).map(Rc::clone)
    }

    /// Share `buffer`, keyed by its path. Unnamed buffers are not kept.
    /// A buffer already open under the same path is replaced.
    pub fn insert(&mut self, buffer: Buffer) -> SharedBuffer {
        let key = buffer.path().map(canonical);
        let shared = Rc::new(RefCell::new(buffer));
        if let Some(key) = key {
            debug!(path = %key.display(), "registered buffer");
            self.buffers.insert(key, Rc::clone(&shared));
        }
        shared
    }

    /// Key an already shared buffer by its current path, e.g. after it was
    /// saved under a new name. Does nothing for an unnamed buffer.
    pub fn register(&mut self, shared: &SharedBuffer) {
        let Some(key) = shared.borrow().path().map(canonical) else {
            return;
        };
        debug!(path = %key.display(), "registered buffer");
        self.buffers.insert(key, Rc::clone(shared));
    }

    /// The open buffer for `path`, or a new one from `load`.
    ///
    /// # Errors
    ///
    /// Whatever `load` returns; nothing is registered in that case.
    pub fn open_cached(
        &mut self,
        path: &Path,
        load: impl FnOnce(&Path) -> Result<Buffer>,
    ) -> Result<SharedBuffer> {
        if let Some(buf) = self.get(path) {
            return Ok(buf);
        }
        let buf = load(path)?;
        Ok(self.insert(buf))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

/// Absolute, symlink-free form of `path`. A file that does not exist yet is
/// resolved through its parent directory.
#[must_use]
pub fn canonical(path: &Path) -> PathBuf {
    if let Ok(p) = fs::canonicalize(path) {
        return p;
    }
    if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };
        if let Ok(dir) = fs::canonicalize(parent) {
            return dir.join(name);
        }
    }
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
