//! Prometheus metrics collection for chatd.
//!
//! Metrics are exposed in text format on the HTTP endpoint (see [`crate::http`]).
//!
//! ## Presence Metrics
//!
//! - `chat_live_connections` - Live connections across all users (gauge)
//! - `chat_retained_users` - Identity records held by the presence cache (gauge)
//! - `chat_presence_recomputes_total{scope}` - View rebuilds by scope
//! - `chat_presence_recompute_seconds{scope}` - View rebuild latency histogram
//!
//! ## Moderation Metrics
//!
//! - `chat_room_validations_total{result}` - Room name checks by outcome
//! - `chat_snapshot_writes_total{result}` - Snapshot saves by outcome
//!
//! Every recording helper is a no-op until [`init`] has run, so library code
//! can record unconditionally and tests need no registry.

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Gauges (can increase/decrease)
// ========================================================================

/// Live connections summed over every user.
pub static LIVE_CONNECTIONS: OnceLock<IntGauge> = OnceLock::new();

/// Identity records retained by the presence cache, online or not.
pub static RETAINED_USERS: OnceLock<IntGauge> = OnceLock::new();

// ========================================================================
// Counters and histograms
// ========================================================================

/// Presence view rebuilds, labeled `global` or `room`.
pub static PRESENCE_RECOMPUTES: OnceLock<IntCounterVec> = OnceLock::new();

/// Presence view rebuild latency.
pub static PRESENCE_RECOMPUTE_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Room name validations, labeled `valid`, `unknown` or a store error code.
pub static ROOM_VALIDATIONS: OnceLock<IntCounterVec> = OnceLock::new();

/// Moderation snapshot writes, labeled `ok` or an error code.
pub static SNAPSHOT_WRITES: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Called once at startup. Later calls leave the first set of metrics in place.
pub fn init() {
    let r = registry();

    // Helper macro to register metric
    macro_rules! register {
        ($metric:ident, $init:expr) => {
            if $metric.get().is_none() {
                let m = $init.expect(concat!(stringify!($metric), " creation failed"));
                if let Err(e) = r.register(Box::new(m.clone())) {
                    tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                }
                let _ = $metric.set(m);
            }
        };
    }

    register!(LIVE_CONNECTIONS, IntGauge::new("chat_live_connections", "Live connections across all users"));
    register!(RETAINED_USERS, IntGauge::new("chat_retained_users", "Identity records retained by the presence cache"));

    register!(PRESENCE_RECOMPUTES, IntCounterVec::new(
        Opts::new("chat_presence_recomputes_total", "Presence view rebuilds by scope"),
        &["scope"]));
    register!(PRESENCE_RECOMPUTE_LATENCY, HistogramVec::new(
        HistogramOpts::new("chat_presence_recompute_seconds", "Presence view rebuild latency by scope")
            .buckets(vec![0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]),
        &["scope"]));
    register!(ROOM_VALIDATIONS, IntCounterVec::new(
        Opts::new("chat_room_validations_total", "Room name validations by result"),
        &["result"]));
    register!(SNAPSHOT_WRITES, IntCounterVec::new(
        Opts::new("chat_snapshot_writes_total", "Moderation snapshot writes by result"),
        &["result"]));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions for metric updates
// ============================================================================

#[inline]
pub fn set_live_connections(count: u32) {
    if let Some(g) = LIVE_CONNECTIONS.get() {
        g.set(i64::from(count));
    }
}

#[inline]
pub fn set_retained_users(count: usize) {
    if let Some(g) = RETAINED_USERS.get() {
        g.set(i64::try_from(count).unwrap_or(i64::MAX));
    }
}

/// Record one presence view rebuild with its latency.
#[inline]
pub fn record_recompute(scope: &str, duration_secs: f64) {
    if let Some(c) = PRESENCE_RECOMPUTES.get() {
        c.with_label_values(&[scope]).inc();
    }
    if let Some(h) = PRESENCE_RECOMPUTE_LATENCY.get() {
        h.with_label_values(&[scope]).observe(duration_secs);
    }
}

#[inline]
pub fn record_room_validation(result: &str) {
    if let Some(c) = ROOM_VALIDATIONS.get() {
        c.with_label_values(&[result]).inc();
    }
}

#[inline]
pub fn record_snapshot_write(result: &str) {
    if let Some(c) = SNAPSHOT_WRITES.get() {
        c.with_label_values(&[result]).inc();
    }
}
