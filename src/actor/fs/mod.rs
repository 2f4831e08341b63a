//! FileSystem Actor
//!
//! Watches the file-set roots and sends debounced rebuild requests to the
//! BuildActor. Implements the "Watcher-First" pattern: the watcher starts
//! before the initial build, so no edit made during it is lost.
//!
//! Architecture:
//! ```text
//! Watcher → Debouncer (pure timing) → ChangeFilter (sets, own writes) → BuildMsg
//! ```

use std::sync::Arc;

use notify::RecommendedWatcher;
use tokio::sync::mpsc;

use super::messages::BuildMsg;
use crate::config::{ProjectConfig, cfg};
use crate::pipeline::{Trigger, WriteRegistry};

// Pure timing and deduplication.
mod debouncer;
// Output, self-write and file-set filtering.
mod filter;
// Shared fs event types.
mod types;
// Watch root attach/re-attach lifecycle.
mod watch_roots;

#[cfg(test)]
mod tests;

use debouncer::Debouncer;
use filter::ChangeFilter;
use types::Changes;
use watch_roots::{WatchRoots, collect_watch_paths};

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    watch_roots: WatchRoots,
    build_tx: mpsc::Sender<BuildMsg>,
    debouncer: Debouncer,
    /// Files the pipeline wrote, shared with the BuildActor
    writes: Arc<WriteRegistry>,
}

impl FsActor {
    /// Create a new FsActor with Watcher-First pattern
    ///
    /// The watcher starts immediately, buffering events while the
    /// BuildActor performs the initial build.
    pub fn new(
        config: &ProjectConfig,
        build_tx: mpsc::Sender<BuildMsg>,
        writes: Arc<WriteRegistry>,
    ) -> anyhow::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;

        let sets = config.file_sets()?;
        let paths = collect_watch_paths(config, &sets);
        for path in &paths {
            crate::debug!("watch"; "root: {}", path.display());
        }

        // Missing roots are attached once they appear
        let mut watch_roots = WatchRoots::new(paths);
        watch_roots.attach_existing(&mut watcher)?;

        Ok(Self {
            notify_rx,
            watcher,
            watch_roots,
            build_tx,
            debouncer: Debouncer::new(),
            writes,
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let Self {
            notify_rx,
            mut watcher,
            mut watch_roots,
            build_tx,
            mut debouncer,
            writes,
        } = self;

        let (async_tx, mut async_rx) = tokio::sync::mpsc::channel::<notify::Event>(64);

        // notify delivers on a sync channel; bridge it into the runtime
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                event = async_rx.recv() => match event {
                    Some(event) => debouncer.add_event(&event),
                    None => break,
                },
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    let config = cfg();
                    if let Ok(sets) = config.file_sets() {
                        watch_roots.retarget(&mut watcher, collect_watch_paths(&config, &sets));
                    }
                    watch_roots.maintain(&mut watcher);

                    if process_changes(&mut debouncer, &build_tx, &config, &writes).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

/// Process debounced file changes
///
/// Returns `Err(())` if the BuildActor shut down
async fn process_changes(
    debouncer: &mut Debouncer,
    build_tx: &mpsc::Sender<BuildMsg>,
    config: &ProjectConfig,
    writes: &WriteRegistry,
) -> Result<(), ()> {
    // Hold events until the initial build is done (check BEFORE taking)
    if !crate::core::is_serving() {
        return Ok(());
    }

    let Some(raw_events) = debouncer.take_if_ready() else {
        return Ok(());
    };

    let sets = match config.file_sets() {
        Ok(sets) => sets,
        Err(e) => {
            crate::log!("watch"; "cannot match changes: {:#}", e);
            return Ok(());
        }
    };

    let Some(changes) = ChangeFilter::new(config, &sets, writes).filter(raw_events) else {
        return Ok(());
    };

    log_changes(&changes);

    build_tx.send(to_message(changes)).await.map_err(|_| ())
}

fn log_changes(changes: &Changes) {
    for (path, kind) in &changes.paths {
        crate::debug!("watch"; "{}: {}", kind.label(), path.display());
    }
}

/// A config change rebuilds everything; it supersedes file changes.
fn to_message(changes: Changes) -> BuildMsg {
    if changes.config_changed {
        BuildMsg::ConfigChanged
    } else {
        BuildMsg::Run(Trigger::changed(changes.kinds))
    }
}

