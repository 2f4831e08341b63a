//! `[files]` section configuration.
//!
//! Glob patterns of the file sets, relative to the project root.
//! Entries starting with `!` exclude matches.
//!
//! # Example
//!
//! ```toml
//! [files]
//! styles  = ["app/styles/**/*.scss"]
//! scripts = ["app/scripts/**/*.js", "!app/scripts/**/*.test.js"]
//! vendors = ["app/vendors/**/*"]
//! markup  = ["*.html"]
//! images  = ["app/images/**/*"]
//! ```

use glob::Pattern;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};
use crate::fileset::SetKind;

/// Glob patterns per file set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    pub styles: Vec<String>,
    pub scripts: Vec<String>,
    pub vendors: Vec<String>,
    pub markup: Vec<String>,
    pub images: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            styles: vec!["app/styles/**/*.scss".into()],
            scripts: vec!["app/scripts/**/*.js".into()],
            vendors: vec!["app/vendors/**/*".into()],
            markup: vec!["*.html".into()],
            images: vec!["app/images/**/*".into()],
        }
    }
}

impl FilesConfig {
    /// Patterns paired with the set they belong to.
    pub fn patterns(&self) -> Vec<(SetKind, Vec<String>)> {
        SetKind::ALL
            .into_iter()
            .map(|kind| (kind, self.get(kind).to_vec()))
            .collect()
    }

    pub fn get(&self, kind: SetKind) -> &[String] {
        match kind {
            SetKind::Styles => &self.styles,
            SetKind::Scripts => &self.scripts,
            SetKind::Vendors => &self.vendors,
            SetKind::Markup => &self.markup,
            SetKind::Images => &self.images,
        }
    }

    /// Report syntactically invalid or absolute patterns.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for kind in SetKind::ALL {
            let field = field_for(kind);
            for raw in self.get(kind) {
                let pattern = raw.strip_prefix('!').unwrap_or(raw);
                if std::path::Path::new(pattern).is_absolute() {
                    diag.error_with_hint(
                        field,
                        format!("pattern `{raw}` must be relative"),
                        "patterns are resolved against the project root",
                    );
                    continue;
                }
                if let Err(e) = Pattern::new(pattern) {
                    diag.error(field, format!("invalid glob `{raw}`: {e}"));
                }
            }
        }
    }
}

const fn field_for(kind: SetKind) -> FieldPath {
    match kind {
        SetKind::Styles => FieldPath::new("files.styles"),
        SetKind::Scripts => FieldPath::new("files.scripts"),
        SetKind::Vendors => FieldPath::new("files.vendors"),
        SetKind::Markup => FieldPath::new("files.markup"),
        SetKind::Images => FieldPath::new("files.images"),
    }
}
