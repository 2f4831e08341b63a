use std::path::PathBuf;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashSet;

use crate::config::ProjectConfig;
use crate::fileset::FileSets;

/// Watch-root consistency manager.
///
/// Responsibility:
/// - Attach existing roots at startup
/// - Re-attach roots that were removed and recreated
/// - Follow root changes after a config reload
pub(super) struct WatchRoots {
    desired: Vec<PathBuf>,
    attached: FxHashSet<PathBuf>,
}

impl WatchRoots {
    pub(super) fn new(paths: Vec<PathBuf>) -> Self {
        Self {
            desired: paths,
            attached: FxHashSet::default(),
        }
    }

    pub(super) fn attach_existing(
        &mut self,
        watcher: &mut RecommendedWatcher,
    ) -> notify::Result<()> {
        for path in &self.desired {
            if !path.exists() {
                continue;
            }
            watcher.watch(path, RecursiveMode::Recursive)?;
            self.attached.insert(path.clone());
        }

        Ok(())
    }

    /// Replace the desired roots, unwatching the ones no longer wanted.
    pub(super) fn retarget(&mut self, watcher: &mut RecommendedWatcher, paths: Vec<PathBuf>) {
        if paths == self.desired {
            return;
        }
        self.attached.retain(|path| {
            if paths.contains(path) {
                return true;
            }
            let _ = watcher.unwatch(path);
            crate::debug!("watch"; "detached watch: {}", path.display());
            false
        });
        self.desired = paths;
    }

    pub(super) fn maintain(&mut self, watcher: &mut RecommendedWatcher) {
        // Drop stale handles for roots that no longer exist.
        self.attached.retain(|path| path.exists());

        for path in &self.desired {
            if self.attached.contains(path) || !path.exists() {
                continue;
            }

            if watcher.watch(path, RecursiveMode::Recursive).is_ok() {
                self.attached.insert(path.clone());
                crate::debug!("watch"; "attached watch: {}", path.display());
            }
        }
    }
}

/// Directories (and the config file) the watcher subscribes to.
pub(super) fn collect_watch_paths(config: &ProjectConfig, sets: &FileSets) -> Vec<PathBuf> {
    let mut paths = sets.watch_roots(config.get_root());
    if config.config_path.is_file() && !paths.contains(&config.config_path) {
        paths.push(config.config_path.clone());
    }
    dedupe_nested(&mut paths);
    paths
}

/// Drop paths already covered by a recursive watch on an ancestor.
fn dedupe_nested(paths: &mut Vec<PathBuf>) {
    let all = paths.clone();
    paths.retain(|path| !all.iter().any(|other| other != path && path.starts_with(other)));
}
