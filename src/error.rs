//! Unified error handling for chatd.
//!
//! Every failure in the core is absorbed: presence operations cannot fail,
//! snapshot and key store failures are logged and collapsed into defaults.
//! These types exist for the seams where a caller may still want the cause,
//! and for metric labeling.

use thiserror::Error;

// ============================================================================
// Key Store Errors (room existence queries)
// ============================================================================

/// Errors surfaced by a [`crate::store::KeyStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("store unavailable")]
    Unavailable,
}

impl StoreError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Backend(_) => "backend",
            Self::Unavailable => "unavailable",
        }
    }
}

// ============================================================================
// Snapshot Errors (moderation state persistence)
// ============================================================================

/// Errors reading or writing the moderation snapshot file.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode {field}: {source}")]
    Encode {
        field: &'static str,
        #[source]
        source: rmp_serde::encode::Error,
    },

    #[error("failed to decode {field}: {source}")]
    Decode {
        field: &'static str,
        #[source]
        source: rmp_serde::decode::Error,
    },
}

impl SnapshotError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Encode { .. } => "encode",
            Self::Decode { .. } => "decode",
        }
    }
}
