use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use super::types::ChangeKind;
use crate::utils::path::normalize_path;

/// Quiet window after the last event before a batch is released.
pub(super) const DEBOUNCE: Duration = Duration::from_millis(300);
/// Minimum gap between two released batches.
pub(super) const COOLDOWN: Duration = Duration::from_millis(800);

/// Sleep used while nothing is pending.
const IDLE_SLEEP: Duration = Duration::from_secs(86400);

/// Collects raw notify events into one batch per save burst.
///
/// Knows nothing about file sets or the config; filtering happens on the
/// released batch.
pub(super) struct Debouncer {
    pub(super) changes: FxHashMap<PathBuf, ChangeKind>,
    pub(super) last_event: Option<Instant>,
    pub(super) last_batch: Option<Instant>,
}

/// Outcome of a second event for a path already in the batch.
#[derive(Debug, PartialEq, Eq)]
enum Merge {
    Replace(ChangeKind),
    Drop,
    Keep,
}

/// Combine the pending kind of a path with a newer one.
///
/// A removal followed by a write is a restore (atomic save). A write
/// followed by a removal is a deletion, unless the file was created in
/// the same burst, in which case it never existed for us.
fn merge(pending: ChangeKind, incoming: ChangeKind) -> Merge {
    use ChangeKind::*;
    match (pending, incoming) {
        (Removed, Created | Modified) => Merge::Replace(incoming),
        (Modified, Removed) => Merge::Replace(Removed),
        (Created, Removed) => Merge::Drop,
        _ => Merge::Keep,
    }
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self {
            changes: FxHashMap::default(),
            last_event: None,
            last_batch: None,
        }
    }

    pub(super) fn add_event(&mut self, event: &notify::Event) {
        use notify::EventKind;
        use notify::event::ModifyKind;

        let kind = match event.kind {
            EventKind::Create(_) => ChangeKind::Created,
            EventKind::Remove(_) => ChangeKind::Removed,
            // mtime/chmod noise, the cache-bust rewrite alone produces plenty
            EventKind::Modify(ModifyKind::Metadata(_)) => return,
            EventKind::Modify(_) => ChangeKind::Modified,
            _ => return,
        };

        crate::debug!("watch"; "raw notify: {:?} {:?}", event.kind, event.paths);

        for path in event.paths.iter().filter(|p| !is_temp_file(p)) {
            self.record(normalize_path(path), kind);
        }
    }

    fn record(&mut self, path: PathBuf, kind: ChangeKind) {
        let Some(&pending) = self.changes.get(&path) else {
            crate::debug!("watch"; "{}: {}", kind.label(), path.display());
            self.changes.insert(path, kind);
            self.last_event = Some(Instant::now());
            return;
        };

        match merge(pending, kind) {
            Merge::Replace(next) => {
                crate::debug!("watch"; "{}->{}: {}", pending.label(), next.label(), path.display());
                self.changes.insert(path, next);
            }
            Merge::Drop => {
                crate::debug!("watch"; "created and removed: {}", path.display());
                self.changes.remove(&path);
            }
            Merge::Keep => return,
        }
        self.last_event = Some(Instant::now());
    }

    /// Release the batch once the burst is over and the cooldown passed.
    pub(super) fn take_if_ready(&mut self) -> Option<FxHashMap<PathBuf, ChangeKind>> {
        if !self.is_ready() {
            return None;
        }

        self.last_event = None;
        self.last_batch = Some(Instant::now());
        Some(std::mem::take(&mut self.changes))
    }

    pub(super) fn is_ready(&self) -> bool {
        let Some(last_event) = self.last_event else {
            return false;
        };
        let cooled = self.last_batch.is_none_or(|t| t.elapsed() >= COOLDOWN);

        last_event.elapsed() >= DEBOUNCE && cooled && !self.changes.is_empty()
    }

    /// Time until the batch could be released.
    pub(super) fn sleep_duration(&self) -> Duration {
        let Some(last_event) = self.last_event.filter(|_| !self.changes.is_empty()) else {
            return IDLE_SLEEP;
        };

        let debounce = DEBOUNCE.saturating_sub(last_event.elapsed());
        let cooldown = self
            .last_batch
            .map_or(Duration::ZERO, |t| COOLDOWN.saturating_sub(t.elapsed()));

        debounce.max(cooldown).max(Duration::from_millis(1))
    }
}

/// Editor swap and backup files.
///
/// `4913` is the file vim creates to test directory writability.
pub(super) fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(
        ext,
        "bck" | "bak" | "backup" | "swp" | "swo" | "swx" | "tmp" | "crdownload"
    ) || name.ends_with('~')
        || name.starts_with(['.', '#'])
        || name == "4913"
}

#[cfg(test)]
mod tests {
    use super::*;
    use ChangeKind::*;

    #[test]
    fn test_merge_rules() {
        assert_eq!(merge(Removed, Created), Merge::Replace(Created));
        assert_eq!(merge(Removed, Modified), Merge::Replace(Modified));
        assert_eq!(merge(Modified, Removed), Merge::Replace(Removed));
        assert_eq!(merge(Created, Removed), Merge::Drop);
        assert_eq!(merge(Created, Modified), Merge::Keep);
        assert_eq!(merge(Modified, Modified), Merge::Keep);
    }
}
