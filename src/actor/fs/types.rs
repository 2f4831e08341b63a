use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::fileset::SetKind;

/// What happened to a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub(super) fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}

/// Debounced changes that survived filtering.
#[derive(Debug, Default)]
pub(super) struct Changes {
    /// The project config file itself changed.
    pub(super) config_changed: bool,
    /// File sets touched by the changes.
    pub(super) kinds: BTreeSet<SetKind>,
    /// Matched paths, for logging.
    pub(super) paths: Vec<(PathBuf, ChangeKind)>,
}

impl Changes {
    pub(super) fn is_empty(&self) -> bool {
        !self.config_changed && self.kinds.is_empty()
    }
}
