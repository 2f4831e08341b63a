use std::net::TcpStream;
use std::time::Duration;

use tungstenite::protocol::Message;

use crate::reload::message::HotReloadMessage;

use super::{Clients, WsActor};

impl WsActor {
    /// Handshake a new client and register it
    pub(super) fn add_client(&self, stream: TcpStream) {
        // Blocking during handshake, non-blocking afterwards for polling reads
        let mut ws = match tungstenite::accept(stream) {
            Ok(ws) => ws,
            Err(e) => {
                crate::log!("reload"; "handshake failed: {}", e);
                return;
            }
        };
        let _ = ws.get_ref().set_nonblocking(true);

        let connected = HotReloadMessage::connected();
        if let Err(e) = ws.send(Message::Text(connected.to_json().into())) {
            crate::debug!("ws"; "failed to send connected message: {}", e);
            return;
        }

        if let Some(ref error) = self.pending_error {
            if let Err(e) = ws.send(Message::Text(error.to_json().into())) {
                crate::debug!("ws"; "failed to send pending error: {}", e);
                return;
            }
            crate::debug!("ws"; "sent pending error to new client");
        }

        let mut clients = self.clients.lock();
        clients.push(ws);
        crate::debug!("ws"; "client connected (total: {})", clients.len());
    }
}

/// Background thread draining client frames and dropping closed sockets.
///
/// Clients never send anything meaningful; reading is needed to answer
/// pings and to notice disconnects.
pub(super) fn client_reader_loop(clients: Clients) {
    loop {
        std::thread::sleep(Duration::from_millis(100));

        // Actor dropped its handle: nothing left to serve
        if std::sync::Arc::strong_count(&clients) == 1 || crate::core::is_shutdown() {
            break;
        }

        let mut clients = clients.lock();
        clients.retain_mut(|ws| match ws.read() {
            Ok(Message::Close(_)) => false,
            Ok(_) => true,
            Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                true
            }
            Err(e) => {
                crate::debug!("ws"; "client dropped: {}", e);
                false
            }
        });
    }
}
