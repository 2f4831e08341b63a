//! Server lifecycle management.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use anyhow::Result;
use crossbeam::channel::Receiver;
use tiny_http::Server;

use crate::{actor::Coordinator, config::ProjectConfig, log};

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind to the specified interface and port, with automatic port retry.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                let bound = server.server_addr().to_ip().unwrap_or(addr);
                return Ok((server, bound));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

/// Spawn the actor system: initial build, file watching and live reload.
pub fn spawn_actors(config: Arc<ProjectConfig>, shutdown_rx: Receiver<()>) -> JoinHandle<()> {
    thread::spawn(move || run_actor_system(config, shutdown_rx))
}

fn run_actor_system(config: Arc<ProjectConfig>, shutdown_rx: Receiver<()>) {
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            log!("actor"; "failed to create runtime: {}", e);
            return;
        }
    };

    rt.block_on(async {
        let (interface, ws_port) = (config.serve.interface, config.serve.ws_port);
        let coordinator = Coordinator::with_config(config)
            .with_ws(interface, ws_port)
            .with_shutdown_signal(shutdown_rx);
        if let Err(e) = coordinator.run().await {
            log!("actor"; "error: {:#}", e);
        }
    });
}

/// Build once without watching (`serve --watch=false`).
pub fn spawn_single_build(config: Arc<ProjectConfig>) -> JoinHandle<()> {
    thread::spawn(move || {
        let ok = match crate::cli::build::build_assets(&config) {
            Ok(_) => true,
            Err(e) => {
                log!("error"; "{:#}", e);
                false
            }
        };
        crate::core::set_healthy(ok);
        crate::core::set_serving();
    })
}

/// Wait for the background thread to finish (max 2 seconds).
pub fn wait_for_shutdown(handle: JoinHandle<()>) {
    for _ in 0..40 {
        if handle.is_finished() {
            let _ = handle.join();
            return;
        }
        thread::sleep(std::time::Duration::from_millis(50));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_bind_retries_busy_port() {
        let localhost = IpAddr::V4(Ipv4Addr::LOCALHOST);
        let (_first, busy) = bind_with_retry(localhost, 0).unwrap();
        assert_ne!(busy.port(), 0);

        let (_second, next) = bind_with_retry(localhost, busy.port()).unwrap();
        assert_ne!(next.port(), busy.port());
    }
}
