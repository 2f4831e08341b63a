//! `[pipeline]` section configuration.
//!
//! ```toml
//! [pipeline]
//! parallel = true   # run independent tasks of one wave concurrently
//! ```
//!
//! With `parallel = false` every task runs alone, in declaration order.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSectionConfig {
    pub parallel: bool,
}

impl Default for PipelineSectionConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_config;

    #[test]
    fn test_pipeline_defaults() {
        assert!(test_parse_config("").pipeline.parallel);
    }

    #[test]
    fn test_pipeline_sequential() {
        let config = test_parse_config("[pipeline]\nparallel = false");
        assert!(!config.pipeline.parallel);
    }
}
