//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, ConfigError)
//! - [`presence`]: Presence cache tuning (PresenceConfig)
//! - [`moderation`]: Moderation snapshot and default durations (ModerationConfig)
//! - [`store`]: Room key store backend selection (StoreConfig)

mod defaults;
mod moderation;
mod presence;
mod store;
mod types;

pub use moderation::ModerationConfig;
pub use presence::PresenceConfig;
pub use store::{StoreBackend, StoreConfig};
pub use types::{Config, ConfigError, ServerConfig};
