//! Development server with live reload support.
//!
//! Serves `serve.root` as static files. HTML responses get the reload
//! client injected; the client itself is served from memory.

mod content;
mod lifecycle;
mod path;
mod response;

use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};

use anyhow::{Context, Result};
use crossbeam::channel;
use tiny_http::{Request, Server};

use crate::{
    config::{ProjectConfig, cfg},
    embed::serve::HOTRELOAD_PATH,
    log,
};
use path::{Resolved, resolve_path};

/// Actual WebSocket port (may differ from `serve.ws_port` if it was in use).
/// Updated by the coordinator after the WebSocket server binds.
static ACTUAL_WS_PORT: AtomicU16 = AtomicU16::new(0);

pub fn set_actual_ws_port(port: u16) {
    ACTUAL_WS_PORT.store(port, Ordering::Relaxed);
}

fn actual_ws_port(config: &ProjectConfig) -> u16 {
    match ACTUAL_WS_PORT.load(Ordering::Relaxed) {
        0 => config.serve.ws_port,
        port => port,
    }
}

/// Bound server ready to accept requests
pub struct BoundServer {
    server: Arc<Server>,
    shutdown_rx: channel::Receiver<()>,
}

/// Bind the HTTP server and register it for Ctrl+C shutdown.
pub fn bind_server() -> Result<BoundServer> {
    let config = cfg();
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    crate::core::register_server(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://{}", addr);

    Ok(BoundServer {
        server,
        shutdown_rx,
    })
}

impl BoundServer {
    /// Start the build in the background, then serve until shutdown.
    pub fn run(self) -> Result<()> {
        let config = cfg();
        let background = if config.serve.watch {
            lifecycle::spawn_actors(Arc::clone(&config), self.shutdown_rx)
        } else {
            lifecycle::spawn_single_build(Arc::clone(&config))
        };

        run_request_loop(&self.server)?;
        lifecycle::wait_for_shutdown(background);
        Ok(())
    }
}

/// `assetpipe serve`: bind, build, watch, serve.
pub fn serve() -> Result<()> {
    bind_server()?.run()
}

fn run_request_loop(server: &Server) -> Result<()> {
    // Static files only, a small pool is plenty
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .context("failed to create request thread pool")?;

    for request in server.incoming_requests() {
        pool.spawn(move || {
            let config = cfg();
            if let Err(e) = handle_request(request, &config) {
                log!("serve"; "request error: {e}");
            }
        });
    }
    Ok(())
}

/// Handle a single HTTP request
fn handle_request(request: Request, config: &ProjectConfig) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let live_reload = config.serve.watch;

    if live_reload && request.url() == HOTRELOAD_PATH {
        return response::respond_hotreload_js(request, actual_ws_port(config));
    }

    match resolve_path(request.url(), &config.serve.root) {
        Resolved::File(path) => response::respond_file(request, &path, live_reload),
        Resolved::Redirect(location) => response::respond_redirect(request, &location),
        Resolved::NotFound => {
            if crate::core::is_healthy() {
                crate::debug!("serve"; "404 {}", request.url());
            } else {
                crate::debug!("serve"; "404 {} (last run failed)", request.url());
            }
            response::respond_not_found(request)
        }
    }
}
