//! One-shot build: run every task once and exit.

use anyhow::{Result, bail};

use crate::{
    config::ProjectConfig,
    debug, log,
    pipeline::{Pipeline, RunReport, TaskStatus, Trigger},
    utils::plural_count,
};

/// Run the full pipeline once.
///
/// Fails when any task failed; the later waves were skipped and whatever
/// the earlier ones wrote stays on disk.
pub fn build_assets(config: &ProjectConfig) -> Result<RunReport> {
    let mut pipeline = Pipeline::new(config)?;
    debug!("build"; "plan: {}", pipeline.plan());

    let report = pipeline.run(config, &Trigger::Full);
    log_report(&report, config);

    if let Some((_, error)) = report.failure() {
        bail!("{}", error.detail());
    }

    log!(
        "build";
        "done in {}ms, {} written, token {}",
        report.duration.as_millis(),
        plural_count(report.written().count(), "file"),
        report.token
    );
    Ok(report)
}

fn log_report(report: &RunReport, config: &ProjectConfig) {
    for outcome in &report.outcomes {
        match &outcome.status {
            TaskStatus::Done(paths) => {
                for path in paths {
                    debug!(outcome.task.name(); "wrote {}", config.root_relative(path).display());
                }
                log!(
                    outcome.task.name();
                    "{} ({}ms)",
                    plural_count(paths.len(), "file"),
                    outcome.duration.as_millis()
                );
            }
            TaskStatus::Failed(error) => log!("error"; "{}", error),
            TaskStatus::Skipped => log!(outcome.task.name(); "skipped"),
        }
    }
}
