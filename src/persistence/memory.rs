//! In-memory store and directory.
//!
//! Backs tests and local runs with `PERSISTENCE_ENABLED=false`. Semantics
//! mirror the PostgreSQL implementation: server-assigned ids and
//! timestamps, ascending history, idempotent participant mutations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::models::{NewRoom, RoomRecord, StoredMessage};
use super::{MessageStore, RoomDirectory};
use crate::domain::UserIdentity;
use crate::error::ChatError;

#[derive(Debug, Default)]
struct Inner {
    rooms: Vec<RoomRecord>,
    messages: HashMap<i64, Vec<StoredMessage>>,
    next_room_id: i64,
    next_message_id: i64,
}

/// Process-local [`MessageStore`] and [`RoomDirectory`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn append(
        &self,
        room_id: i64,
        user: &UserIdentity,
        content: &str,
    ) -> Result<StoredMessage, ChatError> {
        let mut inner = self.inner.lock().await;
        inner.next_message_id += 1;
        let message = StoredMessage {
            id: inner.next_message_id,
            room_id,
            user_id: user.id,
            username: user.username.clone(),
            content: content.to_string(),
            timestamp: Utc::now(),
            edited: false,
            edited_at: None,
        };
        inner
            .messages
            .entry(room_id)
            .or_default()
            .push(message.clone());
        Ok(message)
    }

    async fn list_by_room(&self, room_id: i64) -> Result<Vec<StoredMessage>, ChatError> {
        let inner = self.inner.lock().await;
        // Messages are appended with monotonically increasing timestamps,
        // so insertion order is already ascending.
        Ok(inner.messages.get(&room_id).cloned().unwrap_or_default())
    }

    async fn count_by_room(&self, room_id: i64) -> Result<i64, ChatError> {
        let inner = self.inner.lock().await;
        Ok(inner.messages.get(&room_id).map_or(0, |m| m.len() as i64))
    }

    async fn last_by_room(&self, room_id: i64) -> Result<Option<StoredMessage>, ChatError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .messages
            .get(&room_id)
            .and_then(|m| m.last().cloned()))
    }

    async fn mark_edited(
        &self,
        message_id: i64,
        content: &str,
    ) -> Result<StoredMessage, ChatError> {
        let mut inner = self.inner.lock().await;
        for messages in inner.messages.values_mut() {
            if let Some(message) = messages.iter_mut().find(|m| m.id == message_id) {
                message.content = content.to_string();
                message.edited = true;
                message.edited_at = Some(Utc::now());
                return Ok(message.clone());
            }
        }
        Err(ChatError::MessageNotFound(message_id))
    }
}

#[async_trait]
impl RoomDirectory for InMemoryStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<RoomRecord>, ChatError> {
        let inner = self.inner.lock().await;
        Ok(inner.rooms.iter().find(|r| r.name == name).cloned())
    }

    async fn find_by_id(&self, room_id: i64) -> Result<Option<RoomRecord>, ChatError> {
        let inner = self.inner.lock().await;
        Ok(inner.rooms.iter().find(|r| r.id == room_id).cloned())
    }

    async fn create(&self, room: NewRoom) -> Result<RoomRecord, ChatError> {
        let mut inner = self.inner.lock().await;
        if inner.rooms.iter().any(|r| r.name == room.name) {
            return Err(ChatError::DuplicateRoom(room.name));
        }
        inner.next_room_id += 1;
        let record = RoomRecord {
            id: inner.next_room_id,
            name: room.name,
            description: room.description,
            is_public: room.is_public,
            created_by: room.created_by,
            created_at: Utc::now(),
            participants: Vec::new(),
        };
        inner.rooms.push(record.clone());
        Ok(record)
    }

    async fn list_visible(&self, viewer: Option<i64>) -> Result<Vec<RoomRecord>, ChatError> {
        let inner = self.inner.lock().await;
        let mut rooms: Vec<RoomRecord> = inner
            .rooms
            .iter()
            .filter(|r| {
                r.is_public || viewer.is_some_and(|uid| r.participants.contains(&uid))
            })
            .cloned()
            .collect();
        rooms.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rooms)
    }

    async fn add_participant(&self, room_id: i64, user_id: i64) -> Result<(), ChatError> {
        let mut inner = self.inner.lock().await;
        let room = inner
            .rooms
            .iter_mut()
            .find(|r| r.id == room_id)
            .ok_or_else(|| ChatError::RoomNotFound(room_id.to_string()))?;
        if !room.participants.contains(&user_id) {
            room.participants.push(user_id);
        }
        Ok(())
    }

    async fn remove_participant(&self, room_id: i64, user_id: i64) -> Result<(), ChatError> {
        let mut inner = self.inner.lock().await;
        let room = inner
            .rooms
            .iter_mut()
            .find(|r| r.id == room_id)
            .ok_or_else(|| ChatError::RoomNotFound(room_id.to_string()))?;
        room.participants.retain(|&uid| uid != user_id);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn alice() -> UserIdentity {
        UserIdentity::authenticated(3, "alice")
    }

    fn new_room(name: &str) -> NewRoom {
        NewRoom {
            name: name.to_string(),
            description: None,
            is_public: true,
            created_by: Some(3),
        }
    }

    #[tokio::test]
    async fn append_assigns_ids_and_timestamps() {
        let store = InMemoryStore::new();
        let first = store.append(1, &alice(), "one").await;
        let second = store.append(1, &alice(), "two").await;
        let (Ok(first), Ok(second)) = (first, second) else {
            panic!("append failed");
        };
        assert_ne!(first.id, second.id);
        assert!(first.timestamp <= second.timestamp);
        assert!(!first.edited);
    }

    #[tokio::test]
    async fn history_is_ascending_by_timestamp() {
        let store = InMemoryStore::new();
        for text in ["a", "b", "c"] {
            let _ = store.append(1, &alice(), text).await;
        }
        let Ok(history) = store.list_by_room(1).await else {
            panic!("list failed");
        };
        let contents: Vec<&str> = history.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, ["a", "b", "c"]);
        assert!(
            history
                .iter()
                .zip(history.iter().skip(1))
                .all(|(a, b)| a.timestamp <= b.timestamp)
        );
    }

    #[tokio::test]
    async fn duplicate_room_name_is_rejected() {
        let store = InMemoryStore::new();
        assert!(store.create(new_room("General")).await.is_ok());
        let result = store.create(new_room("General")).await;
        assert!(matches!(result, Err(ChatError::DuplicateRoom(_))));
    }

    #[tokio::test]
    async fn find_by_name_uses_raw_name() {
        let store = InMemoryStore::new();
        let _ = store.create(new_room("Yellowstone Talk")).await;
        let Ok(found) = store.find_by_name("Yellowstone Talk").await else {
            panic!("lookup failed");
        };
        assert!(found.is_some());
        let Ok(missing) = store.find_by_name("Yellowstone_Talk").await else {
            panic!("lookup failed");
        };
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn participant_mutations_are_idempotent() {
        let store = InMemoryStore::new();
        let Ok(room) = store.create(new_room("Private")).await else {
            panic!("create failed");
        };

        assert!(store.add_participant(room.id, 5).await.is_ok());
        assert!(store.add_participant(room.id, 5).await.is_ok());
        let Ok(Some(found)) = store.find_by_id(room.id).await else {
            panic!("lookup failed");
        };
        assert_eq!(found.participants, vec![5]);

        assert!(store.remove_participant(room.id, 5).await.is_ok());
        assert!(store.remove_participant(room.id, 5).await.is_ok());
    }

    #[tokio::test]
    async fn participant_mutations_require_a_room() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.add_participant(99, 5).await,
            Err(ChatError::RoomNotFound(_))
        ));
        assert!(matches!(
            store.remove_participant(99, 5).await,
            Err(ChatError::RoomNotFound(_))
        ));
    }

    #[tokio::test]
    async fn private_rooms_hidden_from_non_participants() {
        let store = InMemoryStore::new();
        let _ = store.create(new_room("Public")).await;
        let Ok(private) = store
            .create(NewRoom {
                name: "Private".to_string(),
                description: None,
                is_public: false,
                created_by: Some(3),
            })
            .await
        else {
            panic!("create failed");
        };
        let _ = store.add_participant(private.id, 5).await;

        let Ok(anon) = store.list_visible(None).await else {
            panic!("list failed");
        };
        assert_eq!(anon.len(), 1);

        let Ok(member) = store.list_visible(Some(5)).await else {
            panic!("list failed");
        };
        assert_eq!(member.len(), 2);
    }

    #[tokio::test]
    async fn mark_edited_sets_edit_fields() {
        let store = InMemoryStore::new();
        let Ok(message) = store.append(1, &alice(), "tpyo").await else {
            panic!("append failed");
        };
        let Ok(edited) = store.mark_edited(message.id, "typo").await else {
            panic!("edit failed");
        };
        assert_eq!(edited.content, "typo");
        assert!(edited.edited);
        assert!(edited.edited_at.is_some());

        assert!(matches!(
            store.mark_edited(999, "x").await,
            Err(ChatError::MessageNotFound(999))
        ));
    }
}
