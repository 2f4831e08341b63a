//! Actor Message Definitions
//!
//! ```text
//! FsActor --Run--> BuildActor --Reload/Css/Error--> WsActor
//! ```

use std::net::TcpStream;

use crate::pipeline::Trigger;

// =============================================================================
// BuildActor Messages
// =============================================================================

/// Messages to Build Actor
#[derive(Debug)]
pub enum BuildMsg {
    /// Run the tasks affected by a trigger
    Run(Trigger),
    /// Config file changed: reload it, then rebuild everything
    ConfigChanged,
    /// Shutdown
    Shutdown,
}

// =============================================================================
// WsActor Messages
// =============================================================================

/// Messages to WebSocket Actor
#[derive(Debug)]
pub enum WsMsg {
    /// Reload every page
    Reload { reason: String },
    /// Only stylesheets changed
    Css { files: Vec<String> },
    /// Build failed (display overlay, no reload)
    Error { task: String, error: String },
    /// Clear error overlay (build succeeded after error)
    ClearError,
    /// Add client
    AddClient(TcpStream),
    /// Shutdown
    Shutdown,
}
