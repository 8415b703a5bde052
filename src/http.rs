//! HTTP server for metrics and read-only presence views.
//!
//! Runs on a separate tokio task and serves:
//!
//! - `GET /metrics` - Prometheus text format
//! - `GET /names` - cached global presence payload
//! - `GET /names/:room` - cached room payload, 404 for unregistered or
//!   never-joined rooms

use crate::rooms::RoomValidator;
use crate::state::PresenceCache;
use crate::telemetry::spans;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Router, routing::get};
use bytes::Bytes;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::Instrument;

/// Services the HTTP handlers read from.
#[derive(Clone)]
pub struct HttpState {
    pub presence: Arc<PresenceCache>,
    pub rooms: RoomValidator,
}

/// Handler for GET /metrics - returns Prometheus metrics in text format.
async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

fn json(body: Bytes) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// Handler for GET /names.
async fn names_handler(State(state): State<HttpState>) -> Response {
    async { json(state.presence.names()) }
        .instrument(spans::names_query(None))
        .await
}

/// Handler for GET /names/:room.
async fn room_names_handler(
    State(state): State<HttpState>,
    Path(room): Path<String>,
) -> Response {
    let span = spans::names_query(Some(&room));
    async move {
        if !state.rooms.is_valid_room_name(&room).await {
            return StatusCode::NOT_FOUND.into_response();
        }
        match state.presence.names_in_room(&room) {
            Some(body) => json(body),
            None => StatusCode::NOT_FOUND.into_response(),
        }
    }
    .instrument(span)
    .await
}

pub fn router(state: HttpState) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/names", get(names_handler))
        .route("/names/:room", get(room_names_handler))
        .with_state(state)
}

/// Run the HTTP server.
///
/// Binds to `0.0.0.0:port`. This is a long-running task that should be
/// spawned in the background.
pub async fn run_http_server(port: u16, state: HttpState) {
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "HTTP server listening");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind HTTP server");
            return;
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "HTTP server error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rooms::room_key;
    use crate::state::{Connection, Features, NamesOut, User};
    use crate::store::MemoryStore;

    fn state() -> HttpState {
        let store: MemoryStore = [room_key("lounge"), room_key("empty")].into_iter().collect();
        HttpState {
            presence: Arc::new(PresenceCache::new()),
            rooms: RoomValidator::new(Arc::new(store)),
        }
    }

    async fn body(response: Response) -> NamesOut {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_global_names() {
        let state = state();
        state.presence.add(Arc::new(User::new(1, "alice", Features::empty())));

        let response = names_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        assert_eq!(body(response).await.users[0].nick, "alice");
    }

    #[tokio::test]
    async fn test_room_names() {
        let state = state();
        let user = Arc::new(User::new(1, "alice", Features::VIP));
        let (mut conn, _rx) = Connection::channel(Some(user), "lounge");
        state.presence.add_connection(&mut conn);

        let response = room_names_handler(State(state.clone()), Path("lounge".into())).await;
        assert_eq!(response.status(), StatusCode::OK);
        let out = body(response).await;
        assert_eq!(out.users[0].features, Features::VIP);
        assert_eq!(out.connections, 1);

        // Registered but never joined.
        let response = room_names_handler(State(state.clone()), Path("empty".into())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unregistered_room_is_hidden() {
        let state = state();
        let user = Arc::new(User::new(1, "alice", Features::empty()));
        let (mut conn, _rx) = Connection::channel(Some(user), "secret");
        state.presence.add_connection(&mut conn);

        let response = room_names_handler(State(state), Path("secret".into())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
