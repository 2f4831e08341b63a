//! Cache-bust stage: rewrite `cb=<digits>` query values in markup.
//!
//! ```text
//! <link href="dist/main.css?cb=1">  →  <link href="dist/main.css?cb=1700000000000">
//! ```
//!
//! Markup is rewritten in place, so the produced artifacts point back at
//! the source files. Files whose content would not change produce no
//! artifact, which keeps watch mode from rewriting (and re-detecting)
//! identical markup.

use std::fmt;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;

use super::{Artifact, StageError, read_to_string};

static CACHE_BUST_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"cb=[0-9]+").unwrap());

/// Value substituted into every `cb=` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheBustToken(pub u64);

impl CacheBustToken {
    /// Milliseconds since the Unix epoch.
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self(millis)
    }
}

impl fmt::Display for CacheBustToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Replace every `cb=<digits>` in `content` with `cb=<token>`.
pub fn rewrite(content: &str, token: CacheBustToken) -> String {
    let replacement = format!("cb={token}");
    CACHE_BUST_RE
        .replace_all(content, replacement.as_str())
        .into_owned()
}

/// Rewrite each markup file that exists. Missing files are skipped.
pub fn run(files: &[PathBuf], token: CacheBustToken) -> Result<Vec<Artifact>, StageError> {
    let mut artifacts = Vec::new();
    for path in files {
        if !path.is_file() {
            crate::debug!("cachebust"; "skipping missing {}", path.display());
            continue;
        }
        let content = read_to_string(path)?;
        let rewritten = rewrite(&content, token);
        if rewritten != content {
            artifacts.push(Artifact::new(path.clone(), rewritten));
        }
    }
    Ok(artifacts)
}
