//! Live reload over WebSocket.
//!
//! ```text
//! FsActor -> BuildActor -> WsActor -> Browser
//!  (watch)   (pipeline)  (broadcast)
//! ```
//!
//! - `message` - JSON messages understood by the injected client
//! - `server` - WebSocket listener handing clients to `WsActor`

pub mod message;
pub mod server;
