//! Build Actor
//!
//! Owns the pipeline and serializes its runs. Triggers arriving while a run
//! is busy are merged into one pending run (see [`RunQueue`]).
//!
//! ```text
//! FsActor --Run/ConfigChanged--> BuildActor --Reload/Css/Error/ClearError--> WsActor
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use super::messages::{BuildMsg, WsMsg};
use crate::config::{cfg, reload_config};
use crate::logger::{status_error, status_success, status_unchanged};
use crate::pipeline::{Pipeline, RunQueue, RunReport, Trigger};
use crate::utils::path::display_relative;

pub struct BuildActor {
    rx: mpsc::Receiver<BuildMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    /// Shared with the blocking thread a run executes on
    pipeline: Arc<Mutex<Pipeline>>,
    queue: RunQueue,
    /// Browsers are showing an error overlay
    showing_error: bool,
}

/// Whether the actor keeps going after a message.
enum Flow {
    Continue,
    Stop,
}

impl BuildActor {
    /// The first run is a full build; file events wait for it.
    pub fn new(
        rx: mpsc::Receiver<BuildMsg>,
        ws_tx: mpsc::Sender<WsMsg>,
        mut pipeline: Pipeline,
    ) -> Self {
        pipeline.watch();
        let mut queue = RunQueue::new();
        queue.push(Trigger::Full);
        Self {
            rx,
            ws_tx,
            pipeline: Arc::new(Mutex::new(pipeline)),
            queue,
            showing_error: false,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        loop {
            // Coalesce everything that arrived during the last run
            while let Ok(msg) = self.rx.try_recv() {
                if let Flow::Stop = self.accept(msg) {
                    return;
                }
            }

            if let Some(trigger) = self.queue.take() {
                if let Flow::Stop = self.execute(trigger).await {
                    return;
                }
                continue;
            }

            let Some(msg) = self.rx.recv().await else {
                break;
            };
            if let Flow::Stop = self.accept(msg) {
                break;
            }
        }
    }

    fn accept(&mut self, msg: BuildMsg) -> Flow {
        match msg {
            BuildMsg::Run(trigger) => self.queue.push(trigger),
            BuildMsg::ConfigChanged => self.reload_config(),
            BuildMsg::Shutdown => {
                crate::debug!("build"; "shutting down");
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    fn reload_config(&mut self) {
        match reload_config() {
            Ok(true) => match self.pipeline.lock().reconfigure(&cfg()) {
                Ok(()) => {
                    crate::log!("config"; "reloaded");
                    self.queue.push(Trigger::Full);
                }
                Err(e) => status_error("config reload failed", &format!("{e:#}")),
            },
            Ok(false) => crate::debug!("config"; "unchanged"),
            Err(e) => status_error("config reload failed", &format!("{e:#}")),
        }
    }

    async fn execute(&mut self, trigger: Trigger) -> Flow {
        let config = cfg();
        let pipeline = Arc::clone(&self.pipeline);
        crate::debug!("build"; "run: {:?}", trigger);

        let result =
            tokio::task::spawn_blocking(move || pipeline.lock().run(&config, &trigger)).await;

        let report = match result {
            Ok(report) => report,
            Err(e) => {
                crate::log!("error"; "build run aborted: {}", e);
                return Flow::Continue;
            }
        };

        let first_run = !crate::core::is_serving();
        crate::core::set_healthy(report.is_success());
        if first_run {
            crate::core::set_serving();
        }

        match self.notify(&report).await {
            Ok(()) => Flow::Continue,
            Err(()) => Flow::Stop,
        }
    }

    /// Print the status block and tell browsers what changed.
    async fn notify(&mut self, report: &RunReport) -> Result<(), ()> {
        if let Some((task, error)) = report.failure() {
            let detail = error.detail();
            status_error(&format!("{task} failed"), &detail);
            self.showing_error = true;
            let msg = WsMsg::Error {
                task: task.to_string(),
                error: detail,
            };
            return self.send(msg).await;
        }

        if std::mem::take(&mut self.showing_error) {
            self.send(WsMsg::ClearError).await?;
        }

        let elapsed = report.duration.as_millis();
        if report.written().next().is_none() {
            status_unchanged(&format!("no output changed ({elapsed}ms)"));
        } else {
            status_success(&format!("{} ({elapsed}ms)", report.summary()));
        }

        let msg = if report.styles_only() {
            let serve_root = &cfg().serve.root;
            let files = report
                .written()
                .filter(|p| p.extension().is_some_and(|ext| ext == "css"))
                .map(|p| display_relative(p, serve_root))
                .collect();
            WsMsg::Css { files }
        } else {
            WsMsg::Reload {
                reason: report.summary(),
            }
        };
        self.send(msg).await
    }

    async fn send(&self, msg: WsMsg) -> Result<(), ()> {
        self.ws_tx.send(msg).await.map_err(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config_at;
    use crate::fileset::SetKind;
    use tempfile::TempDir;

    fn actor() -> (TempDir, BuildActor, mpsc::Sender<BuildMsg>) {
        let dir = TempDir::new().unwrap();
        let config = test_config_at(dir.path(), "");
        let (tx, rx) = mpsc::channel(8);
        let (ws_tx, _ws_rx) = mpsc::channel(8);
        let actor = BuildActor::new(rx, ws_tx, Pipeline::new(&config).unwrap());
        (dir, actor, tx)
    }

    #[test]
    fn test_starts_with_full_build() {
        let (_dir, mut actor, _tx) = actor();
        assert_eq!(actor.queue.take(), Some(Trigger::Full));
        assert_eq!(
            actor.pipeline.lock().state(),
            crate::pipeline::State::Watching
        );
    }

    #[test]
    fn test_triggers_coalesce_into_one_run() {
        let (_dir, mut actor, _tx) = actor();
        actor.queue.take();

        for kind in [SetKind::Styles, SetKind::Scripts, SetKind::Styles] {
            assert!(matches!(
                actor.accept(BuildMsg::Run(Trigger::changed([kind]))),
                Flow::Continue
            ));
        }

        assert_eq!(
            actor.queue.take(),
            Some(Trigger::changed([SetKind::Styles, SetKind::Scripts]))
        );
        assert!(actor.queue.is_empty());
    }

    #[test]
    fn test_shutdown_stops() {
        let (_dir, mut actor, _tx) = actor();
        assert!(matches!(actor.accept(BuildMsg::Shutdown), Flow::Stop));
    }
}
