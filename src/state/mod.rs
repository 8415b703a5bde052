//! State management module.
//!
//! Contains the presence cache, the moderation state, and the entities they
//! track. Both services are constructed once at startup and shared by `Arc`.

mod connection;
mod listing;
mod moderation;
mod presence;
mod user;

pub use connection::{Connection, SEND_CHANNEL_SIZE};
pub use listing::{DEFAULT_NAMES_LINE_BUDGET, chunk_names};
pub use moderation::{
    DEFAULT_MUTE_DURATION, DecodedSnapshot, ModerationSnapshot, ModerationState, persist,
    permanent_expiry, read_snapshot,
};
pub use presence::{NamesOut, PresenceCache};
pub use user::{Features, SimplifiedUser, User, UserId};
