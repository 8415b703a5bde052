//! Moderation state: temporary mutes and the subscriber-only flag.
//!
//! # Persistence
//!
//! Every mutation saves a snapshot to disk. The state is copied under the
//! read lock and written without holding it; a separate persist mutex keeps
//! concurrent saves in order so an older copy never lands after a newer one.
//! The file is overwritten in place, so a crash mid-write can leave it
//! truncated; [`ModerationState::load`] keeps whatever decodes.
//!
//! # Expiry
//!
//! Mutes are checked lazily against the current time. Expired entries stay
//! in the map until [`ModerationState::purge_expired`] is called.

mod persistence;

pub use persistence::{DecodedSnapshot, ModerationSnapshot, persist, read_snapshot};

use crate::error::SnapshotError;
use crate::metrics;
use crate::state::UserId;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::{Mutex, RwLock};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

/// Mute length applied when a moderator gives none.
pub const DEFAULT_MUTE_DURATION: Duration = Duration::from_secs(10 * 60);

/// 9999-12-31T23:59:59Z, the latest expiry the snapshot format round-trips.
const PERMANENT_MUTE_SECS: i64 = 253_402_300_799;

/// Expiry used for mutes without an end.
pub fn permanent_expiry() -> DateTime<Utc> {
    DateTime::from_timestamp(PERMANENT_MUTE_SECS, 0).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Process-wide mute and submode state.
#[derive(Debug)]
pub struct ModerationState {
    state: RwLock<ModerationSnapshot>,
    path: PathBuf,
    persist_lock: Mutex<()>,
    default_mute: Duration,
}

impl ModerationState {
    /// Create an empty state persisted at `path`. Nothing is read until
    /// [`load`](Self::load).
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            state: RwLock::new(ModerationSnapshot::default()),
            path: path.as_ref().to_path_buf(),
            persist_lock: Mutex::new(()),
            default_mute: DEFAULT_MUTE_DURATION,
        }
    }

    /// Set the length used by [`mute_default`](Self::mute_default).
    pub fn with_default_mute(mut self, duration: Duration) -> Self {
        self.default_mute = duration;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn default_mute(&self) -> Duration {
        self.default_mute
    }

    /// Replace the in-memory state with the snapshot on disk.
    ///
    /// A missing or unreadable file leaves the state empty. A corrupt file
    /// keeps the fields decoded before the corruption.
    pub fn load(&self) {
        let mut state = self.state.write();

        let decoded = match read_snapshot(&self.path) {
            Ok(decoded) => decoded,
            Err(SnapshotError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "Moderation snapshot not found, starting empty");
                return;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read moderation snapshot, starting empty");
                return;
            }
        };

        if let Some(e) = &decoded.error {
            warn!(path = %self.path.display(), error = %e, "Moderation snapshot partially decoded");
        }
        *state = decoded.snapshot;

        info!(
            path = %self.path.display(),
            mutes = state.mutes.len(),
            submode = state.submode,
            "Moderation state loaded"
        );
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> ModerationSnapshot {
        self.state.read().clone()
    }

    /// Write the current state to disk. Failures are logged, never returned.
    pub fn save(&self) {
        let _persist = self.persist_lock.lock();
        let snapshot = self.snapshot();

        match persist(&self.path, &snapshot) {
            Ok(()) => metrics::record_snapshot_write("ok"),
            Err(e) => {
                error!(path = %self.path.display(), error = %e, "Failed to save moderation snapshot");
                metrics::record_snapshot_write(e.error_code());
            }
        }
    }

    // === Mutes ===

    /// Whether `id` is muted right now.
    pub fn is_muted(&self, id: UserId) -> bool {
        self.is_muted_at(id, Utc::now())
    }

    /// Whether `id` is muted at `now`: its expiry is strictly later.
    pub fn is_muted_at(&self, id: UserId, now: DateTime<Utc>) -> bool {
        self.state
            .read()
            .mutes
            .get(&id)
            .is_some_and(|expiry| *expiry > now)
    }

    pub fn mute_expiry(&self, id: UserId) -> Option<DateTime<Utc>> {
        self.state.read().mutes.get(&id).copied()
    }

    /// Mute `id` for `duration` from now. Returns the expiry.
    ///
    /// Expiries past [`permanent_expiry`] are clamped to it.
    pub fn mute(&self, id: UserId, duration: Duration) -> DateTime<Utc> {
        let expiry = TimeDelta::from_std(duration)
            .ok()
            .and_then(|delta| Utc::now().checked_add_signed(delta))
            .map_or_else(permanent_expiry, |expiry| expiry.min(permanent_expiry()));
        self.mute_until(id, expiry);
        expiry
    }

    /// Mute `id` for the configured default length.
    pub fn mute_default(&self, id: UserId) -> DateTime<Utc> {
        self.mute(id, self.default_mute)
    }

    /// Mute `id` until `expiry`, replacing any previous mute.
    pub fn mute_until(&self, id: UserId, expiry: DateTime<Utc>) {
        self.state.write().mutes.insert(id, expiry);
        info!(user_id = id, expiry = %expiry, "User muted");
        self.save();
    }

    /// Lift a mute. Returns whether one existed.
    pub fn unmute(&self, id: UserId) -> bool {
        let removed = self.state.write().mutes.remove(&id).is_some();
        if removed {
            info!(user_id = id, "User unmuted");
            self.save();
        }
        removed
    }

    /// Drop mutes that expired before now. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let removed = {
            let mut state = self.state.write();
            let before = state.mutes.len();
            state.mutes.retain(|_, expiry| *expiry > now);
            before - state.mutes.len()
        };
        if removed > 0 {
            info!(removed, "Expired mutes purged");
            self.save();
        }
        removed
    }

    // === Submode ===

    pub fn submode(&self) -> bool {
        self.state.read().submode
    }

    pub fn set_submode(&self, enabled: bool) {
        self.state.write().submode = enabled;
        info!(enabled, "Submode changed");
        self.save();
    }
}
