//! Pipeline error types.

use std::path::PathBuf;

use thiserror::Error;

use super::TaskId;
use crate::stage::StageError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{task} failed")]
    Stage {
        task: TaskId,
        #[source]
        source: StageError,
    },

    #[error("failed to write `{}`", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dependency cycle between tasks: {}", format_cycle(.0))]
    Cycle(Vec<TaskId>),
}

fn format_cycle(tasks: &[TaskId]) -> String {
    tasks
        .iter()
        .map(|t| t.name())
        .collect::<Vec<_>>()
        .join(", ")
}

impl PipelineError {
    /// Message with its cause chain, one cause per line.
    pub fn detail(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            out.push('\n');
            out.push_str(&err.to_string());
            source = err.source();
        }
        out
    }
}
