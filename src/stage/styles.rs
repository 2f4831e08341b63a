//! Stylesheet stage: Sass compile, vendor prefixes, minify, source maps.
//!
//! Each entry stylesheet (`.scss`, `.sass` or `.css` whose name does not
//! start with `_`) becomes one `.css` file in the output directory, at the
//! same path relative to its file-set base. Partials are only reachable
//! through `@use`/`@import`.
//!
//! `grass` has no source map support, so maps point into the compiled
//! CSS (embedded as source content) rather than the original Sass.

use std::path::{Path, PathBuf};

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use parcel_sourcemap::SourceMap;

use super::{Artifact, StageContext, StageError};
use crate::config::BrowserTargets;
use crate::fileset::SourceFile;

const STYLE_EXTENSIONS: &[&str] = &["scss", "sass", "css"];

/// Compile every entry stylesheet.
pub fn run(files: &[SourceFile], ctx: &StageContext<'_>) -> Result<Vec<Artifact>, StageError> {
    let targets = targets(ctx.targets);
    let mut artifacts = Vec::new();

    for file in files.iter().filter(|f| is_entry(&f.path)) {
        let css = compile_sass(file)?;
        let css_rel = file.rel.with_extension("css");
        let out_path = ctx.output.join(&css_rel);

        let processed = process_css(&css, &css_rel, ctx, targets).map_err(|message| {
            StageError::Css {
                path: file.path.clone(),
                message,
            }
        })?;

        let mut code = processed.code;
        if let Some(map) = processed.map {
            let map_path = map_path(&out_path);
            let map_name = map_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if !code.ends_with('\n') {
                code.push('\n');
            }
            code.push_str(&format!("/*# sourceMappingURL={map_name} */\n"));
            artifacts.push(Artifact::new(out_path, code));
            artifacts.push(Artifact::new(map_path, map));
        } else {
            artifacts.push(Artifact::new(out_path, code));
        }
    }

    Ok(artifacts)
}

/// Entry stylesheets: known extension and not a `_partial`.
fn is_entry(path: &Path) -> bool {
    let is_style = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| STYLE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
    let is_partial = path
        .file_name()
        .is_some_and(|n| n.to_string_lossy().starts_with('_'));
    is_style && !is_partial
}

/// `main.css` → `main.css.map`
fn map_path(css_path: &Path) -> PathBuf {
    let mut name = css_path.as_os_str().to_owned();
    name.push(".map");
    PathBuf::from(name)
}

fn compile_sass(file: &SourceFile) -> Result<String, StageError> {
    let mut options = grass::Options::default().style(grass::OutputStyle::Expanded);
    if let Some(dir) = file.path.parent() {
        options = options.load_path(dir);
    }
    options = options.load_path(file.base());

    grass::from_path(&file.path, &options).map_err(|e| StageError::Sass {
        path: file.path.clone(),
        message: e.to_string(),
    })
}

struct ProcessedCss {
    code: String,
    map: Option<String>,
}

/// Prefix for `targets`, optionally minify, optionally emit a source map.
///
/// `MinifyOptions` runs the property handlers that add vendor prefixes,
/// so it applies even when output minification is off.
fn process_css(
    css: &str,
    rel: &Path,
    ctx: &StageContext<'_>,
    targets: Targets,
) -> Result<ProcessedCss, String> {
    let filename = rel.to_string_lossy().replace('\\', "/");

    let mut stylesheet = StyleSheet::parse(
        css,
        ParserOptions {
            filename: filename.clone(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| e.to_string())?;

    stylesheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| e.to_string())?;

    let mut source_map = ctx.sourcemaps.then(|| {
        let mut sm = SourceMap::new("/");
        sm.add_source(&filename);
        sm
    });
    if let Some(sm) = source_map.as_mut() {
        sm.set_source_content(0, css).map_err(|e| e.to_string())?;
    }

    let result = stylesheet
        .to_css(PrinterOptions {
            minify: ctx.minify,
            source_map: source_map.as_mut(),
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| e.to_string())?;

    let map = match source_map.as_mut() {
        Some(sm) => Some(sm.to_json(None).map_err(|e| e.to_string())?),
        None => None,
    };

    Ok(ProcessedCss {
        code: result.code,
        map,
    })
}

/// Encode major versions the way lightningcss expects (`major << 16`).
fn targets(config: &BrowserTargets) -> Targets {
    let version = |v: Option<u32>| v.map(|major| major << 16);
    Targets::from(Browsers {
        android: version(config.android),
        chrome: version(config.chrome),
        edge: version(config.edge),
        firefox: version(config.firefox),
        ios_saf: version(config.ios_saf),
        opera: version(config.opera),
        safari: version(config.safari),
        samsung: version(config.samsung),
        ..Browsers::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::test_util::{resolve, write_files};
    use tempfile::TempDir;

    fn context<'a>(output: &'a Path, targets: &'a BrowserTargets) -> StageContext<'a> {
        StageContext {
            output,
            minify: true,
            sourcemaps: true,
            bundle: "main.js",
            targets,
            jpeg_quality: 85,
        }
    }

    fn text(artifact: &Artifact) -> &str {
        std::str::from_utf8(&artifact.bytes).unwrap()
    }

    #[test]
    fn test_is_entry() {
        assert!(is_entry(Path::new("app/styles/main.scss")));
        assert!(is_entry(Path::new("app/styles/print.css")));
        assert!(!is_entry(Path::new("app/styles/_variables.scss")));
        assert!(!is_entry(Path::new("app/styles/notes.txt")));
    }

    #[test]
    fn test_map_path() {
        assert_eq!(
            map_path(Path::new("/out/main.css")),
            PathBuf::from("/out/main.css.map")
        );
    }

    #[test]
    fn test_partial_import_yields_single_prefixed_minified_sheet() {
        let dir = TempDir::new().unwrap();
        write_files(
            dir.path(),
            &[
                ("app/styles/_vars.scss", "$accent: #ff0000;\n"),
                (
                    "app/styles/a.scss",
                    "@import 'vars';\n.box {\n  color: $accent;\n  user-select: none;\n}\n",
                ),
            ],
        );
        let files = resolve(dir.path(), "app/styles/**/*.scss");
        let output = dir.path().join("dist");
        let targets = BrowserTargets {
            safari: Some(13),
            ..BrowserTargets::default()
        };

        let artifacts = run(&files, &context(&output, &targets)).unwrap();

        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].path, output.join("a.css"));
        assert_eq!(artifacts[1].path, output.join("a.css.map"));

        let css = text(&artifacts[0]);
        assert!(css.contains(".box{"));
        assert!(css.contains("red") || css.contains("#f00"));
        assert!(css.contains("-webkit-user-select:none"));
        assert!(!css.contains("$accent"));
        assert!(css.ends_with("/*# sourceMappingURL=a.css.map */\n"));
        assert!(text(&artifacts[1]).contains("\"mappings\""));
    }

    #[test]
    fn test_nested_layout_preserved() {
        let dir = TempDir::new().unwrap();
        write_files(dir.path(), &[("app/styles/pages/home.scss", "a { b { color: blue; } }")]);
        let files = resolve(dir.path(), "app/styles/**/*.scss");
        let output = dir.path().join("dist");
        let targets = BrowserTargets::default();

        let mut ctx = context(&output, &targets);
        ctx.sourcemaps = false;
        let artifacts = run(&files, &ctx).unwrap();

        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].path, output.join("pages/home.css"));
        assert!(text(&artifacts[0]).starts_with("a b{color:"));
    }

    #[test]
    fn test_unminified_output_is_readable() {
        let dir = TempDir::new().unwrap();
        write_files(dir.path(), &[("app/styles/main.scss", ".a { color: blue; }")]);
        let files = resolve(dir.path(), "app/styles/*.scss");
        let output = dir.path().join("dist");
        let targets = BrowserTargets::default();

        let mut ctx = context(&output, &targets);
        ctx.minify = false;
        ctx.sourcemaps = false;
        let artifacts = run(&files, &ctx).unwrap();

        assert!(text(&artifacts[0]).contains('\n'));
    }

    #[test]
    fn test_malformed_sass_reports_file() {
        let dir = TempDir::new().unwrap();
        write_files(dir.path(), &[("app/styles/broken.scss", ".a { color: $missing; }")]);
        let files = resolve(dir.path(), "app/styles/*.scss");
        let output = dir.path().join("dist");
        let targets = BrowserTargets::default();

        let err = run(&files, &context(&output, &targets)).unwrap_err();
        assert!(matches!(err, StageError::Sass { .. }));
        assert!(err.path().ends_with("broken.scss"));
    }

    #[test]
    fn test_no_files_no_artifacts() {
        let targets = BrowserTargets::default();
        let artifacts = run(&[], &context(Path::new("/out"), &targets)).unwrap();
        assert!(artifacts.is_empty());
    }
}
