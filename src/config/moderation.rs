//! Moderation state configuration.

use serde::Deserialize;
use std::time::Duration;

use super::defaults::{default_mute_secs, default_snapshot_path};

/// Moderation snapshot location and default mute length.
#[derive(Debug, Clone, Deserialize)]
pub struct ModerationConfig {
    /// Path of the mute/submode snapshot file (default: ".state.dc").
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
    /// Mute length when a moderator gives none, in seconds (default: 600).
    #[serde(default = "default_mute_secs")]
    pub default_mute_secs: u64,
}

impl ModerationConfig {
    pub fn default_mute_duration(&self) -> Duration {
        Duration::from_secs(self.default_mute_secs)
    }
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            default_mute_secs: default_mute_secs(),
        }
    }
}
