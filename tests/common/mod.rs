//! Integration test common infrastructure.
//!
//! Builders for users and connections, payload decoding, and an in-process
//! HTTP server with a minimal client.

pub mod server;

#[allow(unused_imports)]
pub use server::{TestServer, http_get};

use bytes::Bytes;
use chatd::state::{Connection, Features, NamesOut, User, UserId};
use std::collections::HashSet;
use std::sync::Arc;

#[allow(dead_code)]
pub fn user(id: UserId, nick: &str) -> Arc<User> {
    Arc::new(User::new(id, nick, Features::empty()))
}

/// A connection for `id` attached to `room`; the outbound queue is dropped.
#[allow(dead_code)]
pub fn connection(id: UserId, room: &str) -> Connection {
    let (conn, _rx) = Connection::channel(Some(user(id, &format!("user{id}"))), room);
    conn
}

#[allow(dead_code)]
pub fn decode(bytes: &Bytes) -> NamesOut {
    serde_json::from_slice(bytes).expect("presence payload is valid JSON")
}

#[allow(dead_code)]
pub fn nicks(out: &NamesOut) -> HashSet<String> {
    out.users.iter().map(|u| u.nick.clone()).collect()
}
