//! `[build]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [build]
//! output = "dist"          # Output directory (relative to project root)
//! minify = true            # Minify stylesheets and scripts
//! sourcemaps = true        # Emit .css.map next to each stylesheet
//! bundle = "main.js"       # Name of the concatenated script bundle
//! jpeg_quality = 85        # Re-encode quality for JPEG images (1-100)
//!
//! [build.targets]          # Browsers that need vendor prefixes
//! chrome = 80
//! safari = 13
//!
//! [build.cache_bust]
//! enable = true
//! files = ["index.html"]   # Markup rewritten in place
//! refresh = "process"      # "process" (once per start) or "run"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Build settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSectionConfig {
    /// Output directory.
    pub output: PathBuf,

    /// Minify stylesheets and scripts.
    pub minify: bool,

    /// Emit stylesheet source maps.
    pub sourcemaps: bool,

    /// File name of the script bundle.
    pub bundle: String,

    /// JPEG re-encode quality.
    pub jpeg_quality: u8,

    /// Browser targets for vendor prefixing.
    pub targets: BrowserTargets,

    /// Cache-bust rewrite of markup files.
    pub cache_bust: CacheBustConfig,
}

impl Default for BuildSectionConfig {
    fn default() -> Self {
        Self {
            output: "dist".into(),
            minify: true,
            sourcemaps: true,
            bundle: "main.js".into(),
            jpeg_quality: 85,
            targets: BrowserTargets::default(),
            cache_bust: CacheBustConfig::default(),
        }
    }
}

impl BuildSectionConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let bundle = std::path::Path::new(&self.bundle);
        if self.bundle.is_empty() || bundle.components().count() != 1 {
            diag.error_with_hint(
                FieldPath::new("build.bundle"),
                format!("invalid bundle name `{}`", self.bundle),
                "use a plain file name such as \"main.js\"",
            );
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            diag.error(
                FieldPath::new("build.jpeg_quality"),
                format!("quality must be within 1-100, got {}", self.jpeg_quality),
            );
        }

        if self.output.as_os_str().is_empty() {
            diag.error(FieldPath::new("build.output"), "output directory is empty");
        }

        if self.cache_bust.enable && self.cache_bust.files.is_empty() {
            diag.warn(
                FieldPath::new("build.cache_bust.files"),
                "cache busting is enabled but no markup file is listed",
            );
        }
    }
}

/// Minimum browser major versions.
///
/// Unset browsers are not considered when deciding which prefixes
/// to emit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrowserTargets {
    pub chrome: Option<u32>,
    pub firefox: Option<u32>,
    pub safari: Option<u32>,
    pub edge: Option<u32>,
    pub ios_saf: Option<u32>,
    pub android: Option<u32>,
    pub opera: Option<u32>,
    pub samsung: Option<u32>,
}

impl Default for BrowserTargets {
    fn default() -> Self {
        Self {
            chrome: Some(80),
            firefox: Some(78),
            safari: Some(13),
            edge: Some(80),
            ios_saf: Some(13),
            android: None,
            opera: None,
            samsung: None,
        }
    }
}

/// When the cache-bust token is recomputed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenRefresh {
    /// Once when the process starts; watch re-runs reuse it.
    #[default]
    Process,
    /// Fresh token for every run.
    Run,
}

/// Cache-bust rewrite settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheBustConfig {
    pub enable: bool,
    /// Markup files rewritten in place (relative to project root).
    pub files: Vec<PathBuf>,
    pub refresh: TokenRefresh,
}

impl Default for CacheBustConfig {
    fn default() -> Self {
        Self {
            enable: true,
            files: vec!["index.html".into()],
            refresh: TokenRefresh::Process,
        }
    }
}
