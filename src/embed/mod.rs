//! Embedded static resources.
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Dev server resources (hotreload.js)
//!
//! The reload client is minified at build time (see `build.rs`).

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// URL path the reload client is served under.
    pub const HOTRELOAD_PATH: &str = "/__assetpipe/hotreload.js";

    /// Variables for hotreload.js template.
    pub struct HotreloadVars {
        pub ws_port: u16,
    }

    impl TemplateVars for HotreloadVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__ASSETPIPE_WS_PORT__", &self.ws_port.to_string())
        }
    }

    /// Minified live reload client.
    pub const HOTRELOAD_JS: Template<HotreloadVars> =
        Template::new(include_str!(concat!(env!("OUT_DIR"), "/hotreload.min.js")));

    /// Script tag referencing the reload client.
    pub fn script_tag() -> String {
        format!(r#"<script src="{HOTRELOAD_PATH}" defer></script>"#)
    }
}
