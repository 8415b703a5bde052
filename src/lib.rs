//! chatd - presence and moderation core for a high fan-out chat backend.
//!
//! The crate keeps track of who is online globally and per room, caches the
//! serialized presence views the broadcast hub pushes to clients, stores
//! temporary mutes and the subscriber-only flag across restarts, and checks
//! room names against an external key store.

pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod rooms;
pub mod state;
pub mod store;
pub mod telemetry;
