//! The presence cache.
//!
//! Tracks which identities are online globally and per room, deduplicates
//! multiple sockets of the same identity, and keeps pre-serialized views so
//! the broadcast hub can push them without recomputing anything.
//!
//! # Locking
//!
//! One reader/writer lock covers every map and every cached blob. Mutations
//! take the write lock and recompute the affected views before releasing it,
//! so a reader only ever sees a complete view. Reads clone a `Bytes` or `Arc`
//! handle and are O(1) regardless of population. Per-scope connection counts
//! are atomics; user profiles have their own lock, always taken after the
//! cache lock.
//!
//! # Retention
//!
//! Records are never removed. A member whose count drops to zero disappears
//! from the views but keeps its `Arc<User>` (and its flood-control history)
//! until the process exits. [`PresenceCache::retained_users`] exposes the
//! resulting growth.

use super::listing::{DEFAULT_NAMES_LINE_BUDGET, chunk_names};
use super::{Connection, SimplifiedUser, User, UserId};
use crate::metrics;
use crate::telemetry::RecomputeTimer;
use bytes::Bytes;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};
use tracing::{debug, error};

/// Presence payload pushed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamesOut {
    pub users: Vec<SimplifiedUser>,
    #[serde(rename = "connectioncount")]
    pub connections: u32,
}

/// An identity's membership in one scope (global or a single room).
#[derive(Debug)]
struct Member {
    user: Arc<User>,
    connections: AtomicI32,
}

impl Member {
    fn new(user: Arc<User>) -> Self {
        Self {
            user,
            connections: AtomicI32::new(1),
        }
    }

    #[inline]
    fn connections(&self) -> i32 {
        self.connections.load(Ordering::Acquire)
    }

    /// Add a socket. Returns the new count.
    fn connect(&self) -> i32 {
        self.connections.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Drop a socket, never going below zero. Returns the previous count.
    fn disconnect(&self) -> i32 {
        match self
            .connections
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| Some((n - 1).max(0)))
        {
            Ok(previous) | Err(previous) => previous,
        }
    }
}

type Members = HashMap<UserId, Member>;

/// Everything guarded by the cache lock.
struct Presence {
    users: Members,
    rooms: HashMap<String, Members>,
    names: Bytes,
    room_names: HashMap<String, Bytes>,
    irc_names: Arc<Vec<Vec<String>>>,
    /// Live sockets across the process, reported in every payload.
    connections: u32,
}

impl Presence {
    /// The one record held for `id` in any scope, global first.
    fn canonical(&self, id: UserId) -> Option<Arc<User>> {
        self.users
            .get(&id)
            .or_else(|| self.rooms.values().find_map(|members| members.get(&id)))
            .map(|member| Arc::clone(&member.user))
    }

    /// Recompute the global view, and the names listing when asked.
    fn marshal_names(&mut self, update_irc_names: bool, line_budget: usize) {
        let _timer = RecomputeTimer::new("global");

        let mut users = Vec::with_capacity(self.users.len());
        let mut names = Vec::new();
        for member in self.users.values() {
            if member.connections() <= 0 {
                continue;
            }
            let view = member.user.simplified();
            if update_irc_names {
                names.push(format!("{}{}", view.features.irc_prefix(), view.nick));
            }
            users.push(view);
        }

        if update_irc_names {
            self.irc_names = Arc::new(chunk_names(names, line_budget));
        }
        if let Some(encoded) = encode(users, self.connections) {
            self.names = encoded;
        }
    }

    /// Recompute one room's view.
    fn marshal_room(&mut self, room: &str) {
        let _timer = RecomputeTimer::new("room");

        let Some(members) = self.rooms.get(room) else {
            return;
        };
        let users = members
            .values()
            .filter(|member| member.connections() > 0)
            .map(|member| member.user.simplified())
            .collect();

        if let Some(encoded) = encode(users, self.connections) {
            self.room_names.insert(room.to_string(), encoded);
        }
    }
}

fn encode(users: Vec<SimplifiedUser>, connections: u32) -> Option<Bytes> {
    match serde_json::to_vec(&NamesOut { users, connections }) {
        Ok(buf) => Some(Bytes::from(buf)),
        Err(e) => {
            error!(error = %e, "Failed to serialize names, keeping previous view");
            None
        }
    }
}

/// Concurrently mutated, cheaply read presence aggregate.
pub struct PresenceCache {
    inner: RwLock<Presence>,
    line_budget: usize,
}

impl PresenceCache {
    pub fn new() -> Self {
        Self::with_line_budget(DEFAULT_NAMES_LINE_BUDGET)
    }

    /// Create a cache whose names listing lines hold at most `line_budget`
    /// characters.
    pub fn with_line_budget(line_budget: usize) -> Self {
        let names = encode(Vec::new(), 0).unwrap_or_default();
        Self {
            inner: RwLock::new(Presence {
                users: HashMap::new(),
                rooms: HashMap::new(),
                names,
                room_names: HashMap::new(),
                irc_names: Arc::new(Vec::new()),
                connections: 0,
            }),
            line_budget,
        }
    }

    // === Global membership ===

    /// Register a socket for `user` in the global membership.
    ///
    /// Returns the canonical record: the one already stored for this id in
    /// any scope, or `user` itself when the id is new.
    pub fn add(&self, user: Arc<User>) -> Arc<User> {
        let mut guard = self.inner.write();
        let presence = &mut *guard;
        let id = user.id();

        let (canonical, came_online) = match presence.users.get(&id) {
            Some(member) => {
                let count = member.connect();
                (Arc::clone(&member.user), count == 1)
            }
            None => {
                let canonical = presence.canonical(id).unwrap_or(user);
                presence.users.insert(id, Member::new(Arc::clone(&canonical)));
                (canonical, true)
            }
        };

        debug!(user_id = id, came_online, "User added to presence");
        presence.marshal_names(came_online, self.line_budget);
        metrics::set_retained_users(presence.users.len());
        canonical
    }

    /// Drop one global socket of `id`. Unknown ids are ignored.
    pub fn release(&self, id: UserId) {
        let mut guard = self.inner.write();
        let presence = &mut *guard;

        let Some(member) = presence.users.get(&id) else {
            return;
        };
        let went_offline = member.disconnect() == 1;

        debug!(user_id = id, went_offline, "User released from presence");
        presence.marshal_names(went_offline, self.line_budget);
    }

    /// Apply a nick or feature change to the stored record.
    ///
    /// Rooms holding the identity are recomputed along with the global view.
    pub fn refresh(&self, user: &User) {
        let mut guard = self.inner.write();
        let presence = &mut *guard;
        let id = user.id();

        let Some(member) = presence.users.get(&id) else {
            return;
        };
        let profile = user.simplified();
        member.user.update_profile(profile.clone());

        let touched: Vec<String> = presence
            .rooms
            .iter()
            .filter(|(_, members)| members.contains_key(&id))
            .map(|(room, _)| room.clone())
            .collect();

        debug!(user_id = id, nick = %profile.nick, rooms = touched.len(), "User refreshed");
        presence.marshal_names(true, self.line_budget);
        for room in touched {
            presence.marshal_room(&room);
        }
    }

    // === Room membership ===

    /// Admit a socket into its room.
    ///
    /// Counts the socket towards the live total even when it carries no
    /// user. `conn.user` is replaced with the canonical record, looked up
    /// globally and then in other rooms, so that every socket of an identity
    /// shares one `User`.
    pub fn add_connection(&self, conn: &mut Connection) {
        let mut guard = self.inner.write();
        let presence = &mut *guard;
        presence.connections = presence.connections.saturating_add(1);
        metrics::set_live_connections(presence.connections);

        let Some(user) = conn.user.as_ref() else {
            return;
        };
        let id = user.id();
        let known = presence.canonical(id);

        let members = presence.rooms.entry(conn.room.clone()).or_default();
        let canonical = match members.get(&id) {
            Some(member) => {
                member.connect();
                Arc::clone(&member.user)
            }
            None => {
                let canonical = known.unwrap_or_else(|| Arc::clone(user));
                members.insert(id, Member::new(Arc::clone(&canonical)));
                canonical
            }
        };
        conn.user = Some(canonical);

        debug!(user_id = id, room = %conn.room, "Connection added to room");
        presence.marshal_room(&conn.room);
    }

    /// Remove a socket from its room.
    ///
    /// The live total always drops; the room view only changes when the
    /// socket's user is a member of that room.
    pub fn disconnect(&self, conn: &Connection) {
        let mut guard = self.inner.write();
        let presence = &mut *guard;
        presence.connections = presence.connections.saturating_sub(1);
        metrics::set_live_connections(presence.connections);

        let Some(user) = conn.user.as_ref() else {
            return;
        };
        let Some(member) = presence
            .rooms
            .get(&conn.room)
            .and_then(|members| members.get(&user.id()))
        else {
            return;
        };
        let previous = member.disconnect();

        debug!(
            user_id = user.id(),
            room = %conn.room,
            remaining = (previous - 1).max(0),
            "Connection removed from room"
        );
        presence.marshal_room(&conn.room);
    }

    // === Cached views ===

    /// Cached global payload.
    pub fn names(&self) -> Bytes {
        self.inner.read().names.clone()
    }

    /// Cached payload for `room`, `None` if nobody ever joined it.
    pub fn names_in_room(&self, room: &str) -> Option<Bytes> {
        self.inner.read().room_names.get(room).cloned()
    }

    /// Cached legacy names listing, one entry per line.
    pub fn irc_names(&self) -> Arc<Vec<Vec<String>>> {
        Arc::clone(&self.inner.read().irc_names)
    }

    // === Inspection ===

    /// Stored global record for `id`, online or not.
    pub fn user(&self, id: UserId) -> Option<Arc<User>> {
        self.inner
            .read()
            .users
            .get(&id)
            .map(|member| Arc::clone(&member.user))
    }

    /// Global socket count of `id`.
    pub fn connections(&self, id: UserId) -> Option<i32> {
        self.inner.read().users.get(&id).map(Member::connections)
    }

    /// Socket count of `id` within `room`.
    pub fn room_connections(&self, room: &str, id: UserId) -> Option<i32> {
        self.inner
            .read()
            .rooms
            .get(room)
            .and_then(|members| members.get(&id))
            .map(Member::connections)
    }

    /// Live sockets across the process.
    pub fn connection_count(&self) -> u32 {
        self.inner.read().connections
    }

    /// Global records held, including offline ones.
    pub fn retained_users(&self) -> usize {
        self.inner.read().users.len()
    }

    /// Rooms that have seen at least one connection.
    pub fn rooms(&self) -> Vec<String> {
        self.inner.read().rooms.keys().cloned().collect()
    }
}

impl Default for PresenceCache {
    fn default() -> Self {
        Self::new()
    }
}
