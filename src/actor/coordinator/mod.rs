//! Actor Coordinator - Wires up the Watch Mode Actor System
//!
//! The Coordinator is a thin orchestrator that:
//! - Creates communication channels
//! - Starts the WebSocket listener
//! - Wires up actors and runs them concurrently

mod runtime;

use std::net::IpAddr;
use std::sync::Arc;

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::build::BuildActor;
use super::fs::FsActor;
use super::messages::{BuildMsg, WsMsg};
use super::ws::WsActor;
use crate::config::ProjectConfig;
use crate::pipeline::Pipeline;

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    config: Arc<ProjectConfig>,
    ws: Option<(IpAddr, u16)>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn with_config(config: Arc<ProjectConfig>) -> Self {
        Self {
            config,
            ws: None,
            shutdown_rx: None,
        }
    }

    /// Listen for reload clients on `interface:port` (or the next free port).
    pub fn with_ws(mut self, interface: IpAddr, port: u16) -> Self {
        self.ws = Some((interface, port));
        self
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system until shutdown.
    pub async fn run(mut self) -> Result<()> {
        let (build_tx, build_rx) = mpsc::channel::<BuildMsg>(CHANNEL_BUFFER);
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);

        if let Some((interface, port)) = self.ws {
            match crate::reload::server::start_ws_server(interface, port, ws_tx.clone()) {
                Ok(actual_port) => {
                    if actual_port != port {
                        crate::log!("reload"; "port {} in use, using {} instead", port, actual_port);
                    }
                    crate::debug!("reload"; "ws://{}:{}", interface, actual_port);
                    crate::cli::serve::set_actual_ws_port(actual_port);
                }
                Err(e) => crate::log!("reload"; "websocket server failed: {}", e),
            }
        }

        let pipeline = Pipeline::new(&self.config)?;

        // Watcher first: edits made during the initial build are buffered
        let fs_actor = FsActor::new(&self.config, build_tx.clone(), pipeline.writes())
            .map_err(|e| anyhow::anyhow!("watcher failed: {:#}", e))?;
        let build_actor = BuildActor::new(build_rx, ws_tx.clone(), pipeline);
        let ws_actor = WsActor::new(ws_rx);

        crate::debug!("actor"; "start");
        runtime::run_actors(
            fs_actor,
            build_actor,
            ws_actor,
            build_tx,
            ws_tx,
            self.shutdown_rx.take(),
        )
        .await;

        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
