//! Project configuration management for `assetpipe.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── files      # [files]
//! │   ├── build      # [build] and [build.cache_bust]
//! │   ├── pipeline   # [pipeline]
//! │   └── serve      # [serve]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   ├── field      # FieldPath
//! │   └── handle     # Global config handle
//! └── mod.rs         # ProjectConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section              | Purpose                                      |
//! |----------------------|----------------------------------------------|
//! | `[files]`            | Glob patterns of the tracked file sets       |
//! | `[build]`            | Output, minify, source maps, targets         |
//! | `[build.cache_bust]` | Markup rewritten with the cache-bust token   |
//! | `[pipeline]`         | Parallel or sequential scheduling            |
//! | `[serve]`            | Development server (port, interface, watch)  |
//!
//! A missing config file is not an error: every section has defaults
//! and the current directory becomes the project root.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

// Re-export from section/
pub use section::{
    BrowserTargets, BuildSectionConfig, CacheBustConfig, FilesConfig, PipelineSectionConfig,
    ServeConfig, TokenRefresh,
};

// Re-export from types/
pub use types::{ConfigDiagnostics, ConfigError, FieldPath, cfg, init_config, reload_config};

use crate::{
    cli::{BuildArgs, Cli, ServeArgs},
    fileset::FileSets,
    log,
    utils::path::normalize_path,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing assetpipe.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// CLI arguments reference (internal use only)
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// File set patterns
    #[serde(default)]
    pub files: FilesConfig,

    /// Build settings
    #[serde(default)]
    pub build: BuildSectionConfig,

    /// Scheduling settings
    #[serde(default)]
    pub pipeline: PipelineSectionConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl ProjectConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. The project root is
    /// the config file's parent directory, or cwd when no file exists.
    pub fn load(cli: &'static Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let (config_path, mut config) = match find_config_file(&cli.config) {
            Some(path) => {
                let config = Self::from_path(&path)?;
                (path, config)
            }
            None => {
                crate::debug!("config"; "{} not found, using defaults", cli.config.display());
                (cwd.join(&cli.config), Self::default())
            }
        };

        let root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or(cwd);

        config.cli = Some(cli);
        config.config_path = config_path;
        config.apply_cli(cli);
        config.validate()?;
        config.normalize_paths(&root);

        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {field}");
        }
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        &self.root
    }

    /// Get path relative to the project root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    /// Absolute output directory.
    pub fn output_dir(&self) -> &Path {
        &self.build.output
    }

    /// Compile the `[files]` patterns.
    pub fn file_sets(&self) -> Result<FileSets> {
        FileSets::compile(self.files.patterns()).context("Invalid file set pattern")
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply CLI overrides. Flags the user did not pass keep file values.
    fn apply_cli(&mut self, cli: &Cli) {
        crate::logger::set_verbose(cli.verbose);
        Self::update_option(&mut self.build.output, cli.output.as_ref());
        self.apply_build_args(&cli.build_args());
        if let Some(serve) = cli.serve_args() {
            self.apply_serve_args(&serve);
        }
    }

    fn apply_build_args(&mut self, args: &BuildArgs) {
        Self::update_option(&mut self.build.minify, args.minify.as_ref());
        Self::update_option(&mut self.build.sourcemaps, args.sourcemaps.as_ref());
        if args.sequential {
            self.pipeline.parallel = false;
        }
    }

    fn apply_serve_args(&mut self, args: &ServeArgs) {
        Self::update_option(&mut self.serve.interface, args.interface.as_ref());
        Self::update_option(&mut self.serve.port, args.port.as_ref());
        Self::update_option(&mut self.serve.watch, args.watch.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // path normalization
    // ========================================================================

    /// Resolve every configured path against the project root.
    fn normalize_paths(&mut self, root: &Path) {
        let root = normalize_path(root);
        self.config_path = normalize_path(&self.config_path);
        self.build.output = normalize_path(&root.join(&self.build.output));
        self.serve.root = normalize_path(&root.join(&self.serve.root));
        self.build.cache_bust.files = self
            .build
            .cache_bust
            .files
            .iter()
            .map(|p| normalize_path(&root.join(p)))
            .collect();
        self.root = root;
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate raw (un-normalized) values.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.files.validate(&mut diag);
        self.build.validate(&mut diag);

        for file in &self.build.cache_bust.files {
            if file.is_absolute() {
                diag.error_with_hint(
                    FieldPath::new("build.cache_bust.files"),
                    format!("absolute path `{}`", file.display()),
                    "paths are relative to the project root",
                );
            }
        }

        if self.serve.port == self.serve.ws_port {
            diag.error(
                FieldPath::new("serve.ws_port"),
                format!("reload port {} collides with the HTTP port", self.serve.ws_port),
            );
        }

        diag.print_warnings();
        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config from a TOML snippet.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> ProjectConfig {
    let (parsed, ignored) = ProjectConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Config rooted at `root` with paths normalized, as `load` would leave it.
#[cfg(test)]
pub fn test_config_at(root: &Path, content: &str) -> ProjectConfig {
    let mut config = test_parse_config(content);
    config.config_path = root.join("assetpipe.toml");
    config.normalize_paths(root);
    config
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn leak_cli(args: &[&str]) -> &'static Cli {
        Box::leak(Box::new(Cli::parse_from(args)))
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let result = ProjectConfig::parse_with_ignored("[files\nstyles = []");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_project_config_default() {
        let config = ProjectConfig::default();
        assert!(config.cli.is_none());
        assert_eq!(config.get_root(), Path::new(""));
        assert_eq!(config.files.markup, vec!["*.html".to_string()]);
        assert!(config.pipeline.parallel);
        assert_eq!(config.serve.port, 3000);
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[build]\nminify = false\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = ProjectConfig::parse_with_ignored(content).unwrap();
        assert!(!config.build.minify);
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_no_unknown_fields() {
        let (_, ignored) = ProjectConfig::parse_with_ignored("[pipeline]\nparallel = true").unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_cli_overrides_file_values() {
        let cli = leak_cli(&[
            "assetpipe",
            "serve",
            "--minify=false",
            "--sequential",
            "--port",
            "4000",
            "-o",
            "public",
        ]);
        let mut config = test_parse_config("[build]\nminify = true\n[serve]\nport = 5000");
        config.apply_cli(cli);

        assert!(!config.build.minify);
        assert!(config.build.sourcemaps);
        assert!(!config.pipeline.parallel);
        assert_eq!(config.serve.port, 4000);
        assert_eq!(config.build.output, PathBuf::from("public"));
    }

    #[test]
    fn test_build_command_ignores_serve_section() {
        let cli = leak_cli(&["assetpipe", "build"]);
        let mut config = test_parse_config("[serve]\nport = 5000");
        config.apply_cli(cli);
        assert_eq!(config.serve.port, 5000);
        assert!(config.pipeline.parallel);
    }

    #[test]
    fn test_normalize_paths() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "[build]\noutput = \"out\"");
        let root = normalize_path(dir.path());

        assert_eq!(config.get_root(), root);
        assert_eq!(config.output_dir(), root.join("out"));
        assert_eq!(config.build.cache_bust.files, vec![root.join("index.html")]);
        assert_eq!(config.root_relative(root.join("out/main.js")), PathBuf::from("out/main.js"));
    }

    #[test]
    fn test_validate_collects_errors() {
        let config = test_parse_config(
            "[files]\nstyles = [\"[\"]\n[build]\njpeg_quality = 200\n[serve]\nport = 35729",
        );
        let err = config.validate().unwrap_err();
        let Some(ConfigError::Diagnostics(diag)) = err.downcast_ref::<ConfigError>() else {
            panic!("expected diagnostics, got {err:?}");
        };
        assert_eq!(diag.len(), 3);
    }

    #[test]
    fn test_validate_defaults_ok() {
        assert!(ProjectConfig::default().validate().is_ok());
    }

    #[test]
    fn test_file_sets_from_defaults() {
        let sets = ProjectConfig::default().file_sets().unwrap();
        assert!(sets.get(crate::fileset::SetKind::Styles).is_some());
    }
}
