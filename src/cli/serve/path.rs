//! URL to filesystem path resolution.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

/// What a request URL maps to under the serve root.
#[derive(Debug, PartialEq, Eq)]
pub enum Resolved {
    File(PathBuf),
    /// Directory requested without trailing slash; relative links need it.
    Redirect(String),
    NotFound,
}

/// Resolve URL to a file under `serve_root`, handling `index.html`.
///
/// Anything escaping the root (`..`, symlinks) is `NotFound`.
pub fn resolve_path(url: &str, serve_root: &Path) -> Resolved {
    let raw = url.split(['?', '#']).next().unwrap_or(url);
    let path = decode(raw);
    let clean = path.trim_matches('/');

    if clean.split('/').any(|segment| segment == "..") {
        return Resolved::NotFound;
    }

    let Ok(root) = serve_root.canonicalize() else {
        return Resolved::NotFound;
    };
    let Ok(canonical) = root.join(clean).canonicalize() else {
        return Resolved::NotFound;
    };
    if !canonical.starts_with(&root) {
        return Resolved::NotFound;
    }

    if canonical.is_file() {
        return Resolved::File(canonical);
    }

    if canonical.is_dir() {
        if !raw.ends_with('/') {
            // Keep the still-encoded form, it goes into a header
            return Resolved::Redirect(format!("{raw}/"));
        }
        let index = canonical.join("index.html");
        if index.is_file() {
            return Resolved::File(index);
        }
    }

    Resolved::NotFound
}

fn decode(raw: &str) -> Cow<'_, str> {
    percent_decode_str(raw)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(raw))
}
