//! Record of files the pipeline wrote.
//!
//! The change notifier consults it to drop events caused by the
//! pipeline's own writes (markup rewritten in place by cache busting).

use std::fs;
use std::path::{Path, PathBuf};

use dashmap::DashMap;

use crate::utils::hash;

/// Content hash of each file at the time the pipeline wrote it.
#[derive(Debug, Default)]
pub struct WriteRegistry {
    written: DashMap<PathBuf, u64>,
}

impl WriteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, path: &Path, bytes: &[u8]) {
        self.written.insert(path.to_path_buf(), hash::compute(bytes));
    }

    /// Whether `path` still holds exactly what the pipeline wrote.
    ///
    /// A user edit changes the content and is therefore not suppressed.
    pub fn is_own_write(&self, path: &Path) -> bool {
        let Some(expected) = self.written.get(path).map(|h| *h) else {
            return false;
        };
        fs::read(path).is_ok_and(|bytes| hash::compute(&bytes) == expected)
    }
}
