//! Presence cache configuration.

use serde::Deserialize;

use super::defaults::default_names_line_budget;

/// Presence cache tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct PresenceConfig {
    /// Maximum characters per line of the legacy names listing (default: 400).
    #[serde(default = "default_names_line_budget")]
    pub names_line_budget: usize,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            names_line_budget: default_names_line_budget(),
        }
    }
}
