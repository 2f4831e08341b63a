//! Outcome of one pipeline run.

use std::path::PathBuf;
use std::time::Duration;

use super::{PipelineError, TaskId};
use crate::stage::CacheBustToken;

#[derive(Debug)]
pub enum TaskStatus {
    /// Finished; lists the files written.
    Done(Vec<PathBuf>),
    Failed(PipelineError),
    /// Not started because an earlier wave failed.
    Skipped,
}

#[derive(Debug)]
pub struct TaskOutcome {
    pub task: TaskId,
    pub status: TaskStatus,
    pub duration: Duration,
}

#[derive(Debug)]
pub struct RunReport {
    pub outcomes: Vec<TaskOutcome>,
    pub token: CacheBustToken,
    pub duration: Duration,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failure().is_none()
    }

    /// First failed task and its error.
    pub fn failure(&self) -> Option<(TaskId, &PipelineError)> {
        self.outcomes.iter().find_map(|o| match &o.status {
            TaskStatus::Failed(err) => Some((o.task, err)),
            _ => None,
        })
    }

    /// Tasks that completed.
    pub fn completed(&self) -> Vec<TaskId> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, TaskStatus::Done(_)))
            .map(|o| o.task)
            .collect()
    }

    pub fn skipped(&self) -> Vec<TaskId> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, TaskStatus::Skipped))
            .map(|o| o.task)
            .collect()
    }

    pub fn written(&self) -> impl Iterator<Item = &PathBuf> {
        self.outcomes.iter().flat_map(|o| match &o.status {
            TaskStatus::Done(paths) => paths.as_slice(),
            _ => &[][..],
        })
    }

    /// Only stylesheets changed, so browsers can swap CSS without a reload.
    pub fn styles_only(&self) -> bool {
        self.is_success()
            && self
                .outcomes
                .iter()
                .filter(|o| matches!(&o.status, TaskStatus::Done(paths) if !paths.is_empty()))
                .all(|o| o.task == TaskId::Styles)
            && self.written().next().is_some()
    }

    /// `styles, scripts` style summary of completed tasks.
    pub fn summary(&self) -> String {
        self.completed()
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::StageError;

    fn outcome(task: TaskId, status: TaskStatus) -> TaskOutcome {
        TaskOutcome {
            task,
            status,
            duration: Duration::ZERO,
        }
    }

    fn report(outcomes: Vec<TaskOutcome>) -> RunReport {
        RunReport {
            outcomes,
            token: CacheBustToken(1),
            duration: Duration::ZERO,
        }
    }

    #[test]
    fn test_failure_and_skipped() {
        let report = report(vec![
            outcome(TaskId::Styles, TaskStatus::Done(vec![])),
            outcome(
                TaskId::Scripts,
                TaskStatus::Failed(PipelineError::Stage {
                    task: TaskId::Scripts,
                    source: StageError::Script {
                        path: "a.js".into(),
                        message: "unexpected token".into(),
                    },
                }),
            ),
            outcome(TaskId::CacheBust, TaskStatus::Skipped),
        ]);

        assert!(!report.is_success());
        assert_eq!(report.failure().map(|(t, _)| t), Some(TaskId::Scripts));
        assert_eq!(report.skipped(), vec![TaskId::CacheBust]);
        assert_eq!(report.summary(), "styles");
    }

    #[test]
    fn test_styles_only() {
        let css_only = report(vec![
            outcome(TaskId::Styles, TaskStatus::Done(vec!["dist/main.css".into()])),
            outcome(TaskId::CacheBust, TaskStatus::Done(vec![])),
        ]);
        assert!(css_only.styles_only());

        let with_markup = report(vec![
            outcome(TaskId::Styles, TaskStatus::Done(vec!["dist/main.css".into()])),
            outcome(TaskId::CacheBust, TaskStatus::Done(vec!["index.html".into()])),
        ]);
        assert!(!with_markup.styles_only());

        let nothing = report(vec![outcome(TaskId::Styles, TaskStatus::Done(vec![]))]);
        assert!(!nothing.styles_only());
    }
}
