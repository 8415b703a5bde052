//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_server_name() -> String {
    "chatd".to_string()
}

pub fn default_metrics_port() -> u16 {
    9090
}

// =============================================================================
// Presence Defaults
// =============================================================================

pub fn default_names_line_budget() -> usize {
    crate::state::DEFAULT_NAMES_LINE_BUDGET
}

// =============================================================================
// Moderation Defaults
// =============================================================================

pub fn default_snapshot_path() -> String {
    ".state.dc".to_string()
}

pub fn default_mute_secs() -> u64 {
    crate::state::DEFAULT_MUTE_DURATION.as_secs()
}

// =============================================================================
// Store Defaults
// =============================================================================

pub fn default_store_path() -> String {
    "rooms.redb".to_string()
}
