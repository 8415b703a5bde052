//! Persistence functions for the moderation snapshot.
//!
//! The file is a MessagePack stream of two values in fixed order: the mute
//! map, then the submode flag. Decoding keeps every value read before the
//! first corrupt one, so a truncated file still yields its mutes.

use crate::error::SnapshotError;
use crate::state::UserId;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::debug;

/// A copy of the moderation state, detached from its lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModerationSnapshot {
    /// Mute expiry per user, in UTC.
    pub mutes: HashMap<UserId, DateTime<Utc>>,
    /// Subscriber-only mode.
    pub submode: bool,
}

/// Result of a tolerant decode.
#[derive(Debug)]
pub struct DecodedSnapshot {
    /// Fields read before `error`, defaults for the rest.
    pub snapshot: ModerationSnapshot,
    /// The first field that failed to decode, if any.
    pub error: Option<SnapshotError>,
}

/// Encode a snapshot into the on-disk format.
pub fn encode(snapshot: &ModerationSnapshot) -> Result<Vec<u8>, SnapshotError> {
    let mut buf = Vec::new();
    rmp_serde::encode::write(&mut buf, &snapshot.mutes).map_err(|source| {
        SnapshotError::Encode {
            field: "mutes",
            source,
        }
    })?;
    rmp_serde::encode::write(&mut buf, &snapshot.submode).map_err(|source| {
        SnapshotError::Encode {
            field: "submode",
            source,
        }
    })?;
    Ok(buf)
}

/// Decode as much of a snapshot as the bytes allow.
pub fn decode(bytes: &[u8]) -> DecodedSnapshot {
    let mut de = rmp_serde::Deserializer::new(bytes);
    let mut snapshot = ModerationSnapshot::default();

    match HashMap::<UserId, DateTime<Utc>>::deserialize(&mut de) {
        Ok(mutes) => snapshot.mutes = mutes,
        Err(source) => {
            return DecodedSnapshot {
                snapshot,
                error: Some(SnapshotError::Decode {
                    field: "mutes",
                    source,
                }),
            };
        }
    }

    let error = match bool::deserialize(&mut de) {
        Ok(submode) => {
            snapshot.submode = submode;
            None
        }
        Err(source) => Some(SnapshotError::Decode {
            field: "submode",
            source,
        }),
    };

    DecodedSnapshot { snapshot, error }
}

/// Write a snapshot to `path`, replacing the previous file in place.
pub fn persist(path: &Path, snapshot: &ModerationSnapshot) -> Result<(), SnapshotError> {
    let buf = encode(snapshot)?;
    fs::write(path, buf)?;
    debug!(
        path = %path.display(),
        mutes = snapshot.mutes.len(),
        submode = snapshot.submode,
        "Moderation snapshot saved"
    );
    Ok(())
}

/// Read and tolerantly decode the snapshot at `path`.
///
/// Only I/O failures are returned as errors; decode failures are reported
/// through [`DecodedSnapshot::error`].
pub fn read_snapshot(path: &Path) -> Result<DecodedSnapshot, SnapshotError> {
    let bytes = fs::read(path)?;
    Ok(decode(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> ModerationSnapshot {
        let mut mutes = HashMap::new();
        mutes.insert(1, Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());
        mutes.insert(2, Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap());
        ModerationSnapshot {
            mutes,
            submode: true,
        }
    }

    #[test]
    fn test_encode_decode() {
        let decoded = decode(&encode(&sample()).unwrap());
        assert!(decoded.error.is_none());
        assert_eq!(decoded.snapshot, sample());
    }

    #[test]
    fn test_truncated_submode_keeps_mutes() {
        let mut bytes = encode(&sample()).unwrap();
        bytes.pop();

        let decoded = decode(&bytes);
        assert_eq!(decoded.snapshot.mutes, sample().mutes);
        assert!(!decoded.snapshot.submode);
        let err = decoded.error.unwrap();
        assert!(matches!(err, SnapshotError::Decode { field: "submode", .. }));
    }

    #[test]
    fn test_corrupt_mutes_stops_decoding() {
        let decoded = decode(&[0xc1, 0xc3]);
        assert_eq!(decoded.snapshot, ModerationSnapshot::default());
        assert!(matches!(
            decoded.error,
            Some(SnapshotError::Decode { field: "mutes", .. })
        ));
    }

    #[test]
    fn test_empty_file() {
        let decoded = decode(&[]);
        assert!(decoded.snapshot.mutes.is_empty());
        assert!(decoded.error.is_some());
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_snapshot(&dir.path().join("missing.dc")).unwrap_err();
        assert!(matches!(err, SnapshotError::Io(_)));
    }
}
