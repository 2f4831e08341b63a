use std::path::PathBuf;

use rustc_hash::FxHashMap;

use super::types::{ChangeKind, Changes};
use crate::config::ProjectConfig;
use crate::fileset::FileSets;
use crate::pipeline::WriteRegistry;

/// Turns raw debounced events into the changes worth a rebuild.
///
/// Pipeline: correct_by_existence → drop_ignored → match_sets
pub(super) struct ChangeFilter<'a> {
    config: &'a ProjectConfig,
    sets: &'a FileSets,
    writes: &'a WriteRegistry,
}

impl<'a> ChangeFilter<'a> {
    pub(super) fn new(
        config: &'a ProjectConfig,
        sets: &'a FileSets,
        writes: &'a WriteRegistry,
    ) -> Self {
        Self {
            config,
            sets,
            writes,
        }
    }

    pub(super) fn filter(&self, raw: FxHashMap<PathBuf, ChangeKind>) -> Option<Changes> {
        let mut changes = raw;

        correct_by_existence(&mut changes);
        self.drop_ignored(&mut changes);
        let changes = self.match_sets(changes);

        (!changes.is_empty()).then_some(changes)
    }

    /// Drop output files, directories and files the pipeline just wrote.
    fn drop_ignored(&self, changes: &mut FxHashMap<PathBuf, ChangeKind>) {
        let output = self.config.output_dir();
        changes.retain(|path, kind| {
            if path.starts_with(output) {
                return false;
            }
            if *kind == ChangeKind::Removed {
                return true;
            }
            if path.is_dir() {
                return false;
            }
            if self.writes.is_own_write(path) {
                crate::debug!("watch"; "ignore own write: {}", path.display());
                return false;
            }
            true
        });
    }

    fn match_sets(&self, changes: FxHashMap<PathBuf, ChangeKind>) -> Changes {
        let root = self.config.get_root();
        let mut result = Changes::default();

        for (path, kind) in changes {
            if path == self.config.config_path {
                result.config_changed = true;
                continue;
            }
            let kinds = self.sets.matching(&path, root);
            if kinds.is_empty() {
                crate::debug!("watch"; "untracked {}: {}", kind.label(), path.display());
                continue;
            }
            result.kinds.extend(kinds);
            result.paths.push((path, kind));
        }

        result.paths.sort_by(|a, b| a.0.cmp(&b.0));
        result
    }
}

/// Reconcile event kinds with actual filesystem state.
///
/// Atomic saves often report a removal for a file that exists again, or a
/// modification for a file that is already gone.
fn correct_by_existence(changes: &mut FxHashMap<PathBuf, ChangeKind>) {
    changes.retain(|path, kind| {
        let exists = path.exists();
        match *kind {
            ChangeKind::Created if !exists => {
                crate::debug!("watch"; "discard created (gone): {}", path.display());
                false
            }
            ChangeKind::Modified if !exists => {
                *kind = ChangeKind::Removed;
                true
            }
            ChangeKind::Removed if exists => {
                *kind = ChangeKind::Modified;
                true
            }
            _ => true,
        }
    });
}
