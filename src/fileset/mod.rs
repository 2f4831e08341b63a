//! File-set resolution.
//!
//! A [`FileSet`] is a named list of glob patterns relative to the project
//! root. Patterns starting with `!` exclude matches of the others:
//!
//! ```toml
//! [files]
//! scripts = ["app/scripts/**/*.js", "!app/scripts/**/*.min.js"]
//! ```
//!
//! Resolution happens on every run, so files created or deleted between
//! runs are picked up without restarting.

mod sets;

pub use sets::{FileSets, SetKind};

use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern, PatternError};
use rustc_hash::FxHashSet;

/// Match options shared by resolution and change matching.
///
/// `*` never crosses a path separator; `**` does.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A source file matched by a [`FileSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Path relative to the base of the pattern that matched it.
    ///
    /// `app/vendors/**/*` matching `app/vendors/jquery/jquery.js`
    /// gives `jquery/jquery.js`.
    pub rel: PathBuf,
}

impl SourceFile {
    /// Directory `rel` is relative to.
    pub fn base(&self) -> &Path {
        let depth = self.rel.components().count();
        self.path.ancestors().nth(depth).unwrap_or(&self.path)
    }
}

/// One include pattern with its literal base directory.
#[derive(Debug, Clone)]
struct IncludePattern {
    raw: String,
    pattern: Pattern,
    base: PathBuf,
}

/// Named glob pattern list.
#[derive(Debug, Clone)]
pub struct FileSet {
    name: String,
    include: Vec<IncludePattern>,
    exclude: Vec<Pattern>,
}

impl FileSet {
    /// Compile a set from raw patterns. `!pattern` entries are excludes.
    pub fn new(name: impl Into<String>, patterns: &[String]) -> Result<Self, PatternError> {
        let mut include = Vec::new();
        let mut exclude = Vec::new();

        for raw in patterns {
            if let Some(negated) = raw.strip_prefix('!') {
                exclude.push(Pattern::new(&clean_pattern(negated))?);
                continue;
            }
            let cleaned = clean_pattern(raw);
            include.push(IncludePattern {
                pattern: Pattern::new(&cleaned)?,
                base: literal_base(&cleaned),
                raw: cleaned,
            });
        }

        Ok(Self {
            name: name.into(),
            include,
            exclude,
        })
    }

    /// Expand the patterns against `root`.
    ///
    /// Order follows the include patterns, then the glob traversal order
    /// within each pattern. A file matched by several patterns is listed
    /// once, at its first position. No match is not an error.
    pub fn resolve(&self, root: &Path) -> Vec<SourceFile> {
        let mut seen = FxHashSet::default();
        let mut files = Vec::new();

        for include in &self.include {
            let full = format!(
                "{}/{}",
                Pattern::escape(&root.to_string_lossy()),
                include.raw
            );
            let Ok(entries) = glob::glob_with(&full, MATCH_OPTIONS) else {
                continue;
            };

            for entry in entries {
                let path = match entry {
                    Ok(path) => path,
                    Err(e) => {
                        crate::debug!("files"; "{}: skipping unreadable entry: {}", self.name, e);
                        continue;
                    }
                };
                if !path.is_file() {
                    continue;
                }
                let Ok(rel_root) = path.strip_prefix(root) else {
                    continue;
                };
                if self.is_excluded(rel_root) || !seen.insert(path.clone()) {
                    continue;
                }
                let rel = rel_root
                    .strip_prefix(&include.base)
                    .unwrap_or(rel_root)
                    .to_path_buf();
                files.push(SourceFile { path, rel });
            }
        }

        files
    }

    /// Check whether `path` (absolute, under `root`) belongs to this set.
    ///
    /// Works for files that no longer exist, so removals are matched too.
    pub fn matches(&self, path: &Path, root: &Path) -> bool {
        let Ok(rel) = path.strip_prefix(root) else {
            return false;
        };
        self.include
            .iter()
            .any(|include| include.pattern.matches_path_with(rel, MATCH_OPTIONS))
            && !self.is_excluded(rel)
    }

    /// Directories to watch for this set (literal bases of the includes).
    pub fn watch_roots(&self, root: &Path) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = Vec::new();
        for include in &self.include {
            let dir = root.join(&include.base);
            if !roots.contains(&dir) {
                roots.push(dir);
            }
        }
        roots
    }

    fn is_excluded(&self, rel: &Path) -> bool {
        self.exclude
            .iter()
            .any(|pattern| pattern.matches_path_with(rel, MATCH_OPTIONS))
    }
}

/// Strip a leading `./` so patterns compare against root-relative paths.
fn clean_pattern(raw: &str) -> String {
    let mut pattern = raw.trim();
    while let Some(rest) = pattern.strip_prefix("./") {
        pattern = rest;
    }
    pattern.to_string()
}

/// Leading path components that contain no glob metacharacters.
///
/// `app/styles/**/*.scss` → `app/styles`, `*.html` → ``.
/// A pattern without wildcards names a single file, its base is the parent.
fn literal_base(pattern: &str) -> PathBuf {
    let path = Path::new(pattern);
    let components: Vec<Component<'_>> = path.components().collect();
    let mut base = PathBuf::new();

    for (i, component) in components.iter().enumerate() {
        let text = component.as_os_str().to_string_lossy();
        if text.contains(['*', '?', '[', ']']) {
            return base;
        }
        if i + 1 == components.len() {
            // Last literal component is the file itself.
            return base;
        }
        base.push(component);
    }
    base
}
