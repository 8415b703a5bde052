//! Telemetry utilities for timing presence recomputes.

use std::time::Instant;

/// Guard for timing a presence view rebuild.
///
/// Records the rebuild and its latency when dropped.
pub struct RecomputeTimer {
    scope: &'static str,
    start: Instant,
}

impl RecomputeTimer {
    /// Start timing a rebuild of `scope` (`global` or `room`).
    pub fn new(scope: &'static str) -> Self {
        Self {
            scope,
            start: Instant::now(),
        }
    }
}

impl Drop for RecomputeTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        crate::metrics::record_recompute(self.scope, duration);
    }
}

/// Standardized span constructors for presence observability.
pub mod spans {
    use tracing::{Span, info_span};

    /// Span for an HTTP presence query.
    pub fn names_query(room: Option<&str>) -> Span {
        match room {
            Some(room) => info_span!("names", room = %room),
            None => info_span!("names"),
        }
    }
}
