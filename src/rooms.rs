//! Room name validation against the key store.

use crate::metrics;
use crate::store::KeyStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// Key under which a room is registered.
pub fn room_key(name: &str) -> String {
    format!("channel:{name}")
}

/// Answers whether a room name is registered.
///
/// Fails closed: a store error reads as "not registered".
#[derive(Clone)]
pub struct RoomValidator {
    store: Arc<dyn KeyStore>,
}

impl RoomValidator {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn KeyStore> {
        &self.store
    }

    pub async fn is_valid_room_name(&self, name: &str) -> bool {
        match self.store.exists(&room_key(name)).await {
            Ok(true) => {
                metrics::record_room_validation("valid");
                true
            }
            Ok(false) => {
                debug!(room = %name, "Unknown room");
                metrics::record_room_validation("unknown");
                false
            }
            Err(e) => {
                warn!(room = %name, error = %e, "Room lookup failed, treating as unknown");
                metrics::record_room_validation(e.error_code());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_room_key() {
        assert_eq!(room_key("general"), "channel:general");
        assert_eq!(room_key(""), "channel:");
    }

    #[tokio::test]
    async fn test_registered_rooms_only() {
        let store: MemoryStore = [room_key("general")].into_iter().collect();
        let validator = RoomValidator::new(Arc::new(store));

        assert!(validator.is_valid_room_name("general").await);
        assert!(!validator.is_valid_room_name("ghost").await);
        assert!(!validator.is_valid_room_name("channel:general").await);
    }
}
