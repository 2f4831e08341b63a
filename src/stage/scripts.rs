//! Script stage: concatenate in resolution order, then minify.

use super::minify::{check_script, minify_script};
use super::{Artifact, StageContext, StageError, read_to_string};
use crate::fileset::SourceFile;

/// Bundle all scripts into `ctx.bundle`.
///
/// Files are joined with a newline so a missing trailing `;` or comment
/// in one file cannot swallow the first line of the next.
pub fn run(files: &[SourceFile], ctx: &StageContext<'_>) -> Result<Vec<Artifact>, StageError> {
    if files.is_empty() {
        return Ok(Vec::new());
    }

    let mut sources = Vec::with_capacity(files.len());
    for file in files {
        sources.push(read_to_string(&file.path)?);
    }
    let bundle = sources.join("\n");

    let code = if ctx.minify {
        minify_script(&bundle).map_err(|message| blame(files, &sources, message))?
    } else {
        bundle
    };

    Ok(vec![Artifact::new(ctx.output.join(ctx.bundle), code)])
}

/// Attribute a bundle parse error to the first file that fails on its own.
fn blame(files: &[SourceFile], sources: &[String], bundle_message: String) -> StageError {
    for (file, source) in files.iter().zip(sources) {
        if let Err(message) = check_script(source) {
            return StageError::Script {
                path: file.path.clone(),
                message,
            };
        }
    }
    StageError::Script {
        path: files[0].path.clone(),
        message: bundle_message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BrowserTargets;
    use crate::stage::test_util::{resolve, write_files};
    use std::path::Path;
    use tempfile::TempDir;

    fn context<'a>(output: &'a Path, targets: &'a BrowserTargets, minify: bool) -> StageContext<'a> {
        StageContext {
            output,
            minify,
            sourcemaps: false,
            bundle: "main.js",
            targets,
            jpeg_quality: 85,
        }
    }

    #[test]
    fn test_two_files_one_bundle_in_order() {
        let dir = TempDir::new().unwrap();
        write_files(
            dir.path(),
            &[
                ("app/scripts/a.js", "console.log(\"first-file\");\n"),
                ("app/scripts/b.js", "console.log(\"second-file\");\n"),
            ],
        );
        let files = resolve(dir.path(), "app/scripts/**/*.js");
        let output = dir.path().join("dist");
        let targets = BrowserTargets::default();

        let artifacts = run(&files, &context(&output, &targets, true)).unwrap();

        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].path, output.join("main.js"));
        let code = std::str::from_utf8(&artifacts[0].bytes).unwrap();
        let first = code.find("first-file").unwrap();
        let second = code.find("second-file").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_concat_without_minify() {
        let dir = TempDir::new().unwrap();
        write_files(
            dir.path(),
            &[("s/a.js", "var a = 1 // no semicolon"), ("s/b.js", "var b = 2;")],
        );
        let files = resolve(dir.path(), "s/*.js");
        let output = dir.path().join("dist");
        let targets = BrowserTargets::default();

        let artifacts = run(&files, &context(&output, &targets, false)).unwrap();
        assert_eq!(
            artifacts[0].bytes,
            b"var a = 1 // no semicolon\nvar b = 2;".to_vec()
        );
    }

    #[test]
    fn test_syntax_error_blames_file() {
        let dir = TempDir::new().unwrap();
        write_files(
            dir.path(),
            &[("s/a.js", "var ok = 1;"), ("s/b.js", "function (")],
        );
        let files = resolve(dir.path(), "s/*.js");
        let output = dir.path().join("dist");
        let targets = BrowserTargets::default();

        let err = run(&files, &context(&output, &targets, true)).unwrap_err();
        assert!(matches!(err, StageError::Script { .. }));
        assert!(err.path().ends_with("b.js"));
    }

    #[test]
    fn test_no_files_no_bundle() {
        let targets = BrowserTargets::default();
        let artifacts = run(&[], &context(Path::new("/out"), &targets, true)).unwrap();
        assert!(artifacts.is_empty());
    }
}
