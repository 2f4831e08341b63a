//! Pipeline orchestrator.
//!
//! # Architecture
//!
//! ```text
//! tasks (reads/writes) ──► TaskGraph ──► Plan (waves)
//!                                          │
//!            Trigger ──► affected tasks ───┤ restrict
//!                                          ▼
//!   wave 1: styles │ scripts │ vendors │ images   (rayon)
//!   wave 2: cachebust
//! ```
//!
//! Stages return artifacts in memory; the orchestrator writes them once a
//! stage succeeds. A failure stops every later wave of the run, while the
//! other tasks of the failing wave still finish and write.
//!
//! # States
//!
//! `Idle` ──run──► `Running` ──► `Idle`
//!
//! `Idle` ──watch──► `Watching` ──run──► `Running` ──► `Watching`

mod error;
mod plan;
mod queue;
mod report;
mod task;
mod writes;


pub use error::PipelineError;
pub use plan::{Plan, TaskGraph};
pub use queue::{RunQueue, Trigger};
pub use report::{RunReport, TaskOutcome, TaskStatus};
pub use task::{Resource, Task, TaskId, default_tasks};
pub use writes::WriteRegistry;

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use rayon::prelude::*;

use crate::config::{ProjectConfig, TokenRefresh};
use crate::debug;
use crate::fileset::{FileSets, SetKind, SourceFile};
use crate::stage::{self, Artifact, CacheBustToken, StageContext, StageError};

/// Orchestrator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Running,
    Watching,
}

pub struct Pipeline {
    tasks: Vec<Task>,
    graph: TaskGraph,
    plan: Plan,
    sets: FileSets,
    state: State,
    refresh: TokenRefresh,
    token: CacheBustToken,
    writes: Arc<WriteRegistry>,
}

impl Pipeline {
    /// Plan the default tasks for `config`.
    pub fn new(config: &ProjectConfig) -> Result<Self> {
        Self::with_tasks(config, default_tasks())
    }

    pub fn with_tasks(config: &ProjectConfig, tasks: Vec<Task>) -> Result<Self> {
        let graph = TaskGraph::from_tasks(&tasks);
        let plan = Plan::build(&graph, config.pipeline.parallel)?;
        Ok(Self {
            tasks,
            graph,
            plan,
            sets: config.file_sets()?,
            state: State::Idle,
            refresh: config.build.cache_bust.refresh,
            token: CacheBustToken::now(),
            writes: Arc::new(WriteRegistry::new()),
        })
    }

    /// Pick up a reloaded config. The token and write registry survive.
    pub fn reconfigure(&mut self, config: &ProjectConfig) -> Result<()> {
        self.plan = Plan::build(&self.graph, config.pipeline.parallel)?;
        self.sets = config.file_sets()?;
        self.refresh = config.build.cache_bust.refresh;
        Ok(())
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Enter watch mode. Later runs return to `Watching`.
    pub fn watch(&mut self) {
        if self.state == State::Idle {
            self.state = State::Watching;
        }
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn token(&self) -> CacheBustToken {
        self.token
    }

    pub fn writes(&self) -> Arc<WriteRegistry> {
        Arc::clone(&self.writes)
    }

    /// Tasks a trigger selects, including dependents.
    pub fn affected(&self, trigger: &Trigger) -> BTreeSet<TaskId> {
        match trigger {
            Trigger::Full => self.graph.tasks().iter().copied().collect(),
            Trigger::Changed(kinds) => {
                let roots = self
                    .tasks
                    .iter()
                    .filter(|task| kinds.iter().any(|kind| task.reads_set(*kind)))
                    .map(|task| task.id);
                self.graph.with_dependents(roots)
            }
        }
    }

    /// Execute the tasks selected by `trigger`, wave by wave.
    pub fn run(&mut self, config: &ProjectConfig, trigger: &Trigger) -> RunReport {
        let started = Instant::now();
        let resting = self.state;
        self.state = State::Running;

        let token = self.next_token();
        let plan = self.plan.restrict(&self.affected(trigger));
        let ctx = StageContext::from_config(config);
        if plan.is_empty() {
            debug!("pipeline"; "nothing affected by {:?}", trigger);
        }

        let mut outcomes = Vec::new();
        let mut failed = false;

        for wave in plan.waves() {
            if failed {
                outcomes.extend(wave.iter().map(|task| TaskOutcome {
                    task: *task,
                    status: TaskStatus::Skipped,
                    duration: Default::default(),
                }));
                continue;
            }

            debug!("pipeline"; "wave: {}", wave.iter().map(|t| t.name()).collect::<Vec<_>>().join(", "));
            let results: Vec<TaskOutcome> = if wave.len() == 1 {
                vec![self.execute(wave[0], config, &ctx, token)]
            } else {
                wave.par_iter()
                    .map(|task| self.execute(*task, config, &ctx, token))
                    .collect()
            };

            failed = results
                .iter()
                .any(|o| matches!(o.status, TaskStatus::Failed(_)));
            outcomes.extend(results);
        }

        self.state = resting;
        RunReport {
            outcomes,
            token,
            duration: started.elapsed(),
        }
    }

    fn next_token(&mut self) -> CacheBustToken {
        if self.refresh == TokenRefresh::Run {
            self.token = CacheBustToken::now().max(self.token);
        }
        self.token
    }

    fn execute(
        &self,
        task: TaskId,
        config: &ProjectConfig,
        ctx: &StageContext<'_>,
        token: CacheBustToken,
    ) -> TaskOutcome {
        let started = Instant::now();
        let status = match self.produce(task, config, ctx, token) {
            Ok(artifacts) => match self.write(&artifacts) {
                Ok(written) => TaskStatus::Done(written),
                Err(err) => TaskStatus::Failed(err),
            },
            Err(source) => {
                debug!("pipeline"; "{} failed on {}", task, source.path().display());
                TaskStatus::Failed(PipelineError::Stage { task, source })
            }
        };
        let duration = started.elapsed();
        debug!("pipeline"; "{} finished in {:?}", task, duration);
        TaskOutcome {
            task,
            status,
            duration,
        }
    }

    fn produce(
        &self,
        task: TaskId,
        config: &ProjectConfig,
        ctx: &StageContext<'_>,
        token: CacheBustToken,
    ) -> Result<Vec<Artifact>, StageError> {
        match task {
            TaskId::Styles => stage::styles::run(&self.resolve(SetKind::Styles, config), ctx),
            TaskId::Scripts => stage::scripts::run(&self.resolve(SetKind::Scripts, config), ctx),
            TaskId::Vendors => stage::vendors::run(&self.resolve(SetKind::Vendors, config), ctx),
            TaskId::Images => stage::images::run(&self.resolve(SetKind::Images, config), ctx),
            TaskId::CacheBust if config.build.cache_bust.enable => {
                stage::cachebust::run(&config.build.cache_bust.files, token)
            }
            TaskId::CacheBust => Ok(Vec::new()),
        }
    }

    fn resolve(&self, kind: SetKind, config: &ProjectConfig) -> Vec<SourceFile> {
        let files = self
            .sets
            .get(kind)
            .map(|set| set.resolve(config.get_root()))
            .unwrap_or_default();
        debug!("pipeline"; "{}: {} files", kind.name(), files.len());
        files
    }

    /// Write artifacts whose content differs from what is on disk.
    ///
    /// Returns the paths actually written.
    fn write(&self, artifacts: &[Artifact]) -> Result<Vec<PathBuf>, PipelineError> {
        let mut written = Vec::new();
        for artifact in artifacts {
            if fs::read(&artifact.path).is_ok_and(|current| current == artifact.bytes) {
                continue;
            }
            let write_err = |source| PipelineError::Write {
                path: artifact.path.clone(),
                source,
            };
            if let Some(parent) = artifact.path.parent() {
                fs::create_dir_all(parent).map_err(write_err)?;
            }
            self.writes.record(&artifact.path, &artifact.bytes);
            fs::write(&artifact.path, &artifact.bytes).map_err(write_err)?;
            written.push(artifact.path.clone());
        }
        Ok(written)
    }
}
