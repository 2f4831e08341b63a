use std::time::Duration;

use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::build::BuildActor;
use crate::actor::fs::FsActor;
use crate::actor::messages::{BuildMsg, WsMsg};
use crate::actor::ws::WsActor;

/// Run all actors concurrently until shutdown or until one of them stops.
pub(super) async fn run_actors(
    fs: FsActor,
    build: BuildActor,
    ws: WsActor,
    build_tx: mpsc::Sender<BuildMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    shutdown_rx: Option<Receiver<()>>,
) {
    let mut fs_handle = tokio::spawn(fs.run());
    let mut build_handle = tokio::spawn(build.run());
    let ws_handle = tokio::spawn(ws.run());

    match shutdown_rx {
        Some(rx) => loop {
            if rx.try_recv().is_ok() {
                crate::debug!("actor"; "shutdown signal received");
                break;
            }
            if fs_handle.is_finished() || build_handle.is_finished() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        },
        None => {
            tokio::select! {
                _ = &mut fs_handle => {}
                _ = &mut build_handle => {}
            }
        }
    }

    // A run in progress finishes before the BuildActor sees this
    if !build_handle.is_finished() {
        let _ = build_tx.send(BuildMsg::Shutdown).await;
        let _ = tokio::time::timeout(Duration::from_secs(2), build_handle).await;
    }

    let _ = ws_tx.send(WsMsg::Shutdown).await;
    let _ = tokio::time::timeout(Duration::from_millis(500), ws_handle).await;

    fs_handle.abort();
}
