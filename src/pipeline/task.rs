//! Pipeline tasks and the resources they touch.

use std::fmt;

use crate::fileset::SetKind;

/// The fixed set of pipeline tasks, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaskId {
    Styles,
    Scripts,
    Vendors,
    Images,
    CacheBust,
}

impl TaskId {
    pub const ALL: [TaskId; 5] = [
        TaskId::Styles,
        TaskId::Scripts,
        TaskId::Vendors,
        TaskId::Images,
        TaskId::CacheBust,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Styles => "styles",
            Self::Scripts => "scripts",
            Self::Vendors => "vendors",
            Self::Images => "images",
            Self::CacheBust => "cachebust",
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Something a task reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Files of a tracked set.
    Sources(SetKind),
    /// Artifacts a task leaves in the output directory.
    Output(TaskId),
}

/// A task with its declared inputs and outputs.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub reads: Vec<Resource>,
    pub writes: Vec<Resource>,
}

impl Task {
    pub fn new(id: TaskId, reads: Vec<Resource>, writes: Vec<Resource>) -> Self {
        Self { id, reads, writes }
    }

    /// Whether a change in `kind` makes this task stale.
    pub fn reads_set(&self, kind: SetKind) -> bool {
        self.reads.contains(&Resource::Sources(kind))
    }
}

/// The asset pipeline.
///
/// Cache busting reads every artifact task's output and rewrites markup
/// in place, so it always ends up last.
pub fn default_tasks() -> Vec<Task> {
    use Resource::{Output, Sources};

    vec![
        Task::new(
            TaskId::Styles,
            vec![Sources(SetKind::Styles)],
            vec![Output(TaskId::Styles)],
        ),
        Task::new(
            TaskId::Scripts,
            vec![Sources(SetKind::Scripts)],
            vec![Output(TaskId::Scripts)],
        ),
        Task::new(
            TaskId::Vendors,
            vec![Sources(SetKind::Vendors)],
            vec![Output(TaskId::Vendors)],
        ),
        Task::new(
            TaskId::Images,
            vec![Sources(SetKind::Images)],
            vec![Output(TaskId::Images)],
        ),
        Task::new(
            TaskId::CacheBust,
            vec![
                Sources(SetKind::Markup),
                Output(TaskId::Styles),
                Output(TaskId::Scripts),
                Output(TaskId::Vendors),
                Output(TaskId::Images),
            ],
            vec![Sources(SetKind::Markup)],
        ),
    ]
}
