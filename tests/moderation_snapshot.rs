//! Integration tests for moderation state persistence.

use chatd::state::{ModerationSnapshot, ModerationState, persist, read_snapshot};
use chrono::{TimeDelta, Utc};
use std::collections::HashMap;

#[test]
fn test_snapshot_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".state.dc");
    let expiry = Utc::now() + TimeDelta::hours(1);

    let state = ModerationState::new(&path);
    state.mute_until(1, expiry);
    state.set_submode(true);

    let loaded = ModerationState::new(&path);
    loaded.load();
    assert_eq!(
        loaded.snapshot(),
        ModerationSnapshot {
            mutes: HashMap::from([(1, expiry)]),
            submode: true,
        }
    );
}

#[test]
fn test_mute_window_after_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".state.dc");
    let now = Utc::now();

    let snapshot = ModerationSnapshot {
        mutes: HashMap::from([(1, now + TimeDelta::hours(1)), (2, now - TimeDelta::hours(1))]),
        submode: false,
    };
    persist(&path, &snapshot).unwrap();

    let state = ModerationState::new(&path);
    state.load();
    assert!(state.is_muted(1));
    assert!(!state.is_muted(2));
    assert!(!state.is_muted(3));
}

#[test]
fn test_truncated_file_keeps_mutes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".state.dc");
    let expiry = Utc::now() + TimeDelta::minutes(10);

    let snapshot = ModerationSnapshot {
        mutes: HashMap::from([(42, expiry)]),
        submode: true,
    };
    persist(&path, &snapshot).unwrap();

    // Drop the trailing submode byte.
    let mut bytes = std::fs::read(&path).unwrap();
    bytes.pop();
    std::fs::write(&path, bytes).unwrap();

    let decoded = read_snapshot(&path).unwrap();
    assert!(decoded.error.is_some());

    let state = ModerationState::new(&path);
    state.load();
    assert_eq!(state.mute_expiry(42), Some(expiry));
    assert!(!state.submode());
}

#[test]
fn test_garbage_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".state.dc");
    std::fs::write(&path, b"not a snapshot").unwrap();

    let state = ModerationState::new(&path);
    state.load();
    assert_eq!(state.snapshot(), ModerationSnapshot::default());

    // The next mutation replaces the garbage.
    state.set_submode(true);
    let reloaded = ModerationState::new(&path);
    reloaded.load();
    assert!(reloaded.submode());
}
