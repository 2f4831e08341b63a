use std::path::{Path, PathBuf};

use glob::PatternError;

use super::FileSet;

/// The file sets a pipeline tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SetKind {
    Styles,
    Scripts,
    Vendors,
    Markup,
    Images,
}

impl SetKind {
    pub const ALL: [SetKind; 5] = [
        SetKind::Styles,
        SetKind::Scripts,
        SetKind::Vendors,
        SetKind::Markup,
        SetKind::Images,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Styles => "styles",
            Self::Scripts => "scripts",
            Self::Vendors => "vendors",
            Self::Markup => "markup",
            Self::Images => "images",
        }
    }
}

/// All tracked file sets, compiled once from config.
#[derive(Debug, Clone)]
pub struct FileSets {
    sets: Vec<(SetKind, FileSet)>,
}

impl FileSets {
    /// Compile every set from its pattern list.
    pub fn compile(
        patterns: impl IntoIterator<Item = (SetKind, Vec<String>)>,
    ) -> Result<Self, PatternError> {
        let mut sets = Vec::new();
        for (kind, list) in patterns {
            sets.push((kind, FileSet::new(kind.name(), &list)?));
        }
        sets.sort_by_key(|(kind, _)| *kind);
        Ok(Self { sets })
    }

    /// Get a set by kind. Unconfigured kinds yield an empty set.
    pub fn get(&self, kind: SetKind) -> Option<&FileSet> {
        self.sets
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, set)| set)
    }

    /// Kinds whose patterns match `path`.
    pub fn matching(&self, path: &Path, root: &Path) -> Vec<SetKind> {
        self.sets
            .iter()
            .filter(|(_, set)| set.matches(path, root))
            .map(|(kind, _)| *kind)
            .collect()
    }

    /// Union of the watch roots of every set.
    pub fn watch_roots(&self, root: &Path) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = Vec::new();
        for (_, set) in &self.sets {
            for dir in set.watch_roots(root) {
                if !roots.contains(&dir) {
                    roots.push(dir);
                }
            }
        }
        roots
    }
}
