//! Hot Reload Message Protocol
//!
//! JSON messages sent from the dev server to browser clients.
//!
//! # Message Types
//!
//! - `reload`: full page reload
//! - `css`: only stylesheets changed, re-fetch `<link rel="stylesheet">`
//! - `connected`: handshake acknowledgement
//! - `error` / `clear_error`: build error overlay

use serde::{Deserialize, Serialize};

/// Hot reload message sent over WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HotReloadMessage {
    /// Full page reload
    Reload {
        /// Tasks that produced the change, e.g. "scripts, cachebust"
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Stylesheet-only update
    Css {
        /// Written stylesheet paths, relative to the serve root
        files: Vec<String>,
    },

    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
    },

    /// Build error (display overlay, no reload)
    Error {
        /// Failing task name
        task: String,
        /// Error message with cause chain
        error: String,
    },

    /// Clear error overlay (build succeeded after error)
    #[serde(rename = "clear_error")]
    ClearError,
}

impl HotReloadMessage {
    pub fn reload(reason: impl Into<String>) -> Self {
        Self::Reload {
            reason: Some(reason.into()),
        }
    }

    pub fn css(files: Vec<String>) -> Self {
        Self::Css { files }
    }

    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn error(task: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Error {
            task: task.into(),
            error: error.into(),
        }
    }

    pub fn clear_error() -> Self {
        Self::ClearError
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_json() {
        let json = HotReloadMessage::reload("scripts").to_json();
        assert_eq!(json, r#"{"type":"reload","reason":"scripts"}"#);
    }

    #[test]
    fn test_reload_without_reason() {
        let json = HotReloadMessage::Reload { reason: None }.to_json();
        assert_eq!(json, r#"{"type":"reload"}"#);
    }

    #[test]
    fn test_css_json() {
        let json = HotReloadMessage::css(vec!["dist/main.css".into()]).to_json();
        assert_eq!(json, r#"{"type":"css","files":["dist/main.css"]}"#);
    }

    #[test]
    fn test_error_json() {
        let json = HotReloadMessage::error("styles", "expected \";\"").to_json();
        assert!(json.contains(r#""type":"error""#));
        assert!(json.contains(r#""task":"styles""#));
    }

    #[test]
    fn test_clear_error_tag() {
        assert_eq!(
            HotReloadMessage::clear_error().to_json(),
            r#"{"type":"clear_error"}"#
        );
    }

    #[test]
    fn test_connected_roundtrip() {
        let msg = HotReloadMessage::connected();
        let parsed: HotReloadMessage = serde_json::from_str(&msg.to_json()).unwrap();
        assert_eq!(parsed, msg);
    }
}
