//! WebSocket Actor
//!
//! Owns the live reload clients and broadcasts build results to them.
//!
//! ```text
//! BuildActor --[Reload/Css/Error]--> WsActor --[broadcast]--> Clients
//! ```
//!
//! The last build error is kept so a page opened while the build is
//! broken shows the overlay right away.

mod client_io;
mod delivery;

use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;

use super::messages::WsMsg;
use crate::reload::message::HotReloadMessage;

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    /// Connected clients (shared with the reader thread)
    clients: Clients,
    /// Error to replay to clients that connect while the build is broken
    pending_error: Option<HotReloadMessage>,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
            pending_error: None,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let clients_for_reader = Arc::clone(&self.clients);
        std::thread::spawn(move || client_io::client_reader_loop(clients_for_reader));

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Reload { reason } => {
                    crate::debug!("ws"; "sending reload: {}", reason);
                    self.broadcast(&HotReloadMessage::reload(reason));
                }

                WsMsg::Css { files } => {
                    crate::debug!("ws"; "sending css: {}", files.join(", "));
                    self.broadcast(&HotReloadMessage::css(files));
                }

                WsMsg::Error { task, error } => {
                    let msg = HotReloadMessage::error(task, error);
                    self.broadcast(&msg);
                    self.pending_error = Some(msg);
                }

                WsMsg::ClearError => {
                    self.pending_error = None;
                    self.broadcast(&HotReloadMessage::clear_error());
                }

                WsMsg::AddClient(stream) => self.add_client(stream),

                WsMsg::Shutdown => {
                    crate::debug!("ws"; "shutting down");
                    let mut clients = self.clients.lock();
                    for mut client in clients.drain(..) {
                        let _ = client.close(None);
                    }
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    fn read_text(ws: &mut WebSocket<TcpStream>) -> String {
        ws.read().unwrap().into_text().unwrap().as_str().to_string()
    }

    #[test]
    fn test_new_client_receives_pending_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client = std::thread::spawn(move || {
            let stream = TcpStream::connect(addr).unwrap();
            let (mut ws, _) = tungstenite::client(format!("ws://{addr}/"), stream).unwrap();
            (read_text(&mut ws), read_text(&mut ws))
        });

        let (_tx, rx) = mpsc::channel(1);
        let mut actor = WsActor::new(rx);
        actor.pending_error = Some(HotReloadMessage::error("styles", "Undefined variable."));

        let (stream, _) = listener.accept().unwrap();
        actor.add_client(stream);

        let (first, second) = client.join().unwrap();
        assert!(first.contains(r#""type":"connected""#));
        assert!(second.contains(r#""type":"error""#));
        assert!(second.contains("Undefined variable."));
        assert_eq!(actor.clients.lock().len(), 1);
    }

    #[test]
    fn test_broadcast_without_clients() {
        let (_tx, rx) = mpsc::channel(1);
        let actor = WsActor::new(rx);
        actor.broadcast(&HotReloadMessage::reload("styles"));
        assert!(actor.clients.lock().is_empty());
    }
}
