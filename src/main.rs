//! chatd - presence and moderation daemon.
//!
//! Loads the configuration, builds the shared services, and serves metrics
//! and presence views over HTTP until interrupted.

use anyhow::Context;
use chatd::config::{Config, ConfigError, StoreBackend, StoreConfig};
use chatd::http::{self, HttpState};
use chatd::metrics;
use chatd::rooms::{RoomValidator, room_key};
use chatd::state::{ModerationState, PresenceCache};
use chatd::store::{KeyStore, MemoryStore, RedbStore};
use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// How often expired mutes are dropped from the moderation state.
const MUTE_PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(ConfigError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            warn!(path = %config_path, "Config file not found, using defaults");
            Config::default()
        }
        Err(e) => {
            error!(path = %config_path, error = %e, "Failed to load config");
            return Err(e.into());
        }
    };

    info!(server = %config.server.name, "Starting chatd");

    // Room key store
    let store = open_store(&config.store).await?;
    let rooms = RoomValidator::new(store);

    // Shared services
    let presence = Arc::new(PresenceCache::with_line_budget(
        config.presence.names_line_budget,
    ));
    let moderation = Arc::new(
        ModerationState::new(&config.moderation.snapshot_path)
            .with_default_mute(config.moderation.default_mute_duration()),
    );
    moderation.load();

    // Start expired mute cleanup task
    {
        let moderation = Arc::clone(&moderation);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(MUTE_PURGE_INTERVAL);
            loop {
                interval.tick().await;
                let moderation = Arc::clone(&moderation);
                // purge_expired writes the snapshot synchronously.
                if let Err(e) = tokio::task::spawn_blocking(move || moderation.purge_expired()).await {
                    warn!(error = %e, "Mute purge task failed");
                }
            }
        });
    }
    info!("Mute purge task started");

    // Metrics and presence views over HTTP.
    // Convention: metrics_port = 0 disables the HTTP endpoint (used by tests).
    let metrics_port = config.server.metrics_port;
    if metrics_port == 0 {
        info!("Metrics disabled");
    } else {
        metrics::init();
        metrics::set_retained_users(presence.retained_users());
        info!("Metrics initialized");

        let state = HttpState {
            presence: Arc::clone(&presence),
            rooms: rooms.clone(),
        };
        tokio::spawn(async move {
            http::run_http_server(metrics_port, state).await;
        });
        info!(port = metrics_port, "HTTP server started");
    }

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("Shutdown requested, saving moderation state");

    moderation.save();
    info!("chatd stopped");
    Ok(())
}

/// Build the configured key store and register the configured rooms.
async fn open_store(config: &StoreConfig) -> anyhow::Result<Arc<dyn KeyStore>> {
    let store: Arc<dyn KeyStore> = match config.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Redb => Arc::new(
            RedbStore::open(&config.path)
                .with_context(|| format!("failed to open key store at {}", config.path))?,
        ),
    };

    for room in &config.rooms {
        store
            .insert(&room_key(room))
            .await
            .with_context(|| format!("failed to register room {room}"))?;
    }
    info!(backend = ?config.backend, rooms = config.rooms.len(), "Key store ready");

    Ok(store)
}
