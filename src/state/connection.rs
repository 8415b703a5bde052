//! Connection handles as seen by the presence core.

use super::{User, UserId};
use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Outbound queue depth per socket.
pub const SEND_CHANNEL_SIZE: usize = 16;

/// One live socket.
///
/// The transport owns the socket and the receiving end of `sender`; the
/// presence cache only looks at `user` and `room`, and rewrites `user` to
/// the canonical record when the connection is admitted into a room.
#[derive(Debug)]
pub struct Connection {
    /// Authenticated identity, `None` for anonymous readers.
    pub user: Option<Arc<User>>,
    /// Room the socket is attached to.
    pub room: String,
    sender: mpsc::Sender<Bytes>,
}

impl Connection {
    pub fn new(
        user: Option<Arc<User>>,
        room: impl Into<String>,
        sender: mpsc::Sender<Bytes>,
    ) -> Self {
        Self {
            user,
            room: room.into(),
            sender,
        }
    }

    /// Create a connection together with its outbound queue.
    pub fn channel(
        user: Option<Arc<User>>,
        room: impl Into<String>,
    ) -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(SEND_CHANNEL_SIZE);
        (Self::new(user, room, tx), rx)
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user.as_ref().map(|u| u.id())
    }

    /// Outbound queue, used by the broadcast hub.
    pub fn sender(&self) -> &mpsc::Sender<Bytes> {
        &self.sender
    }
}
