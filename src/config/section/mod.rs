//! Configuration section definitions.
//!
//! Each module corresponds to a section in `assetpipe.toml`:
//!
//! | Module     | TOML Section   | Purpose                                  |
//! |------------|----------------|------------------------------------------|
//! | `files`    | `[files]`      | Glob patterns of the tracked file sets   |
//! | `build`    | `[build]`      | Output, minify, targets, cache busting   |
//! | `pipeline` | `[pipeline]`   | Scheduling policy                        |
//! | `serve`    | `[serve]`      | Development server                       |

mod build;
mod files;
mod pipeline;
mod serve;

pub use build::{BrowserTargets, BuildSectionConfig, CacheBustConfig, TokenRefresh};
pub use files::FilesConfig;
pub use pipeline::PipelineSectionConfig;
pub use serve::ServeConfig;
