//! Transform stages.
//!
//! Every stage is a pure function from an ordered list of source files to
//! an ordered list of in-memory [`Artifact`]s. Stages never touch the
//! output directory; the pipeline writes artifacts once a stage has
//! returned successfully, so a failing stage leaves prior output intact.
//!
//! | Stage       | Input        | Output                                  |
//! |-------------|--------------|-----------------------------------------|
//! | `styles`    | `.scss`      | prefixed, minified `.css` + `.css.map`  |
//! | `scripts`   | `.js`        | one concatenated, minified bundle       |
//! | `vendors`   | any          | verbatim copies                         |
//! | `images`    | png/jpg/svg  | recompressed images                     |
//! | `cachebust` | markup       | markup with `cb=<token>` rewritten      |

pub mod cachebust;
pub mod images;
mod minify;
pub mod scripts;
pub mod styles;
pub mod vendors;

pub use cachebust::CacheBustToken;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{BrowserTargets, ProjectConfig};

/// A file produced by a stage, not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Absolute destination path.
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            bytes: bytes.into(),
        }
    }
}

/// Settings shared by the stages of one run.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    pub output: &'a Path,
    pub minify: bool,
    pub sourcemaps: bool,
    pub bundle: &'a str,
    pub targets: &'a BrowserTargets,
    pub jpeg_quality: u8,
}

impl<'a> StageContext<'a> {
    pub fn from_config(config: &'a ProjectConfig) -> Self {
        Self {
            output: config.output_dir(),
            minify: config.build.minify,
            sourcemaps: config.build.sourcemaps,
            bundle: &config.build.bundle,
            targets: &config.build.targets,
            jpeg_quality: config.build.jpeg_quality,
        }
    }
}

/// Stage failure, always tied to the offending file.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("failed to read `{}`", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sass error in `{}`:\n{message}", .path.display())]
    Sass { path: PathBuf, message: String },

    #[error("css error in `{}`: {message}", .path.display())]
    Css { path: PathBuf, message: String },

    #[error("script error in `{}`: {message}", .path.display())]
    Script { path: PathBuf, message: String },

    #[error("cannot optimize image `{}`", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("invalid svg `{}`: {message}", .path.display())]
    Svg { path: PathBuf, message: String },
}

impl StageError {
    /// The file the error is about.
    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. }
            | Self::Sass { path, .. }
            | Self::Css { path, .. }
            | Self::Script { path, .. }
            | Self::Image { path, .. }
            | Self::Svg { path, .. } => path,
        }
    }
}

/// Read a source file, tagging I/O errors with its path.
pub(crate) fn read(path: &Path) -> Result<Vec<u8>, StageError> {
    std::fs::read(path).map_err(|source| StageError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a source file as UTF-8 text.
pub(crate) fn read_to_string(path: &Path) -> Result<String, StageError> {
    std::fs::read_to_string(path).map_err(|source| StageError::Read {
        path: path.to_path_buf(),
        source,
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_error_path() {
        let err = StageError::Sass {
            path: PathBuf::from("app/styles/main.scss"),
            message: "expected \";\"".into(),
        };
        assert_eq!(err.path(), Path::new("app/styles/main.scss"));
        assert!(err.to_string().contains("main.scss"));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read(Path::new("/definitely/missing.js")).unwrap_err();
        assert!(matches!(err, StageError::Read { .. }));
    }

    #[test]
    fn test_context_from_config() {
        let config = ProjectConfig::default();
        let ctx = StageContext::from_config(&config);
        assert!(ctx.minify);
        assert_eq!(ctx.bundle, "main.js");
        assert_eq!(ctx.jpeg_quality, 85);
    }
}
