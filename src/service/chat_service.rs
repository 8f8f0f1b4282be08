//! Chat service: orchestrates persistence and fan-out.
//!
//! Stateless coordinator over the store, directory, and bus seams. The one
//! hard ordering rule lives here: a message is appended to the store and
//! only then published to the bus, so any subscriber that receives the
//! broadcast can already read the message from history. A crash between the
//! two leaves a persisted-but-not-broadcast message, which history queries
//! recover; the reverse is impossible.

use std::sync::Arc;

use crate::domain::{ChannelKey, ChatEvent, MessageBus, UserIdentity};
use crate::error::ChatError;
use crate::persistence::{MessageStore, NewRoom, RoomDirectory, RoomRecord, StoredMessage};

/// A room with its message statistics, for directory detail views.
#[derive(Debug, Clone)]
pub struct RoomOverview {
    /// The directory entry.
    pub room: RoomRecord,
    /// Total messages persisted in the room.
    pub message_count: i64,
    /// Most recent message, if any.
    pub last_message: Option<StoredMessage>,
}

/// Orchestration layer for chat operations.
#[derive(Debug, Clone)]
pub struct ChatService {
    store: Arc<dyn MessageStore>,
    directory: Arc<dyn RoomDirectory>,
    bus: Arc<dyn MessageBus>,
}

impl ChatService {
    /// Creates a new `ChatService`.
    #[must_use]
    pub fn new(
        store: Arc<dyn MessageStore>,
        directory: Arc<dyn RoomDirectory>,
        bus: Arc<dyn MessageBus>,
    ) -> Self {
        Self {
            store,
            directory,
            bus,
        }
    }

    /// Returns the bus shared with live sessions.
    #[must_use]
    pub fn bus(&self) -> &Arc<dyn MessageBus> {
        &self.bus
    }

    /// Looks up the directory entry for a raw room name.
    ///
    /// Sessions use this to decide whether to emit `room_info` on connect;
    /// a miss is not an error, chat still flows on the channel.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Persistence`] on directory failure.
    pub async fn room_info(&self, raw_name: &str) -> Result<Option<RoomRecord>, ChatError> {
        self.directory.find_by_name(raw_name).await
    }

    /// Persists and broadcasts a chat message for a room.
    ///
    /// Returns `Ok(None)` when the message is dropped without side effects:
    /// the sender is unauthenticated, or the raw room name has no directory
    /// entry. Both drops are silent toward the client by design.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Persistence`] if the append fails; nothing is
    /// broadcast in that case.
    pub async fn publish_message(
        &self,
        raw_room_name: &str,
        identity: &UserIdentity,
        content: &str,
    ) -> Result<Option<StoredMessage>, ChatError> {
        if !identity.authenticated {
            tracing::debug!(room = raw_room_name, "dropping chat_message from anonymous sender");
            return Ok(None);
        }

        let Some(room) = self.directory.find_by_name(raw_room_name).await? else {
            tracing::debug!(
                room = raw_room_name,
                "dropping chat_message for room without directory entry"
            );
            return Ok(None);
        };

        // Persist first. The broadcast must never precede durability.
        let message = self.store.append(room.id, identity, content).await?;

        let channel = ChannelKey::from_raw(raw_room_name);
        let event = ChatEvent::ChatMessage {
            message: message.content.clone(),
            user_id: message.user_id,
            username: message.username.clone(),
            message_id: message.id,
            timestamp: message.timestamp,
        };
        let delivered = self.bus.publish(&channel, &event).await;
        tracing::debug!(
            room = raw_room_name,
            message_id = message.id,
            delivered,
            "chat message published"
        );

        Ok(Some(message))
    }

    /// Creates a room directory entry.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Unauthenticated`] for anonymous callers,
    /// [`ChatError::DuplicateRoom`] on a name conflict, or
    /// [`ChatError::Persistence`] on storage failure.
    pub async fn create_room(
        &self,
        identity: &UserIdentity,
        name: String,
        description: Option<String>,
        is_public: bool,
    ) -> Result<RoomRecord, ChatError> {
        if !identity.authenticated {
            return Err(ChatError::Unauthenticated);
        }
        if name.trim().is_empty() {
            return Err(ChatError::InvalidRequest("room name is empty".to_string()));
        }
        let room = self
            .directory
            .create(NewRoom {
                name,
                description,
                is_public,
                created_by: Some(identity.id),
            })
            .await?;
        tracing::info!(room_id = room.id, room = %room.name, "room created");
        Ok(room)
    }

    /// Lists rooms visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Persistence`] on directory failure.
    pub async fn list_rooms(&self, identity: &UserIdentity) -> Result<Vec<RoomRecord>, ChatError> {
        let viewer = identity.authenticated.then_some(identity.id);
        self.directory.list_visible(viewer).await
    }

    /// Returns a room with its message statistics.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::RoomNotFound`] for an unknown id, or
    /// [`ChatError::Persistence`] on storage failure.
    pub async fn room_overview(&self, room_id: i64) -> Result<RoomOverview, ChatError> {
        let room = self
            .directory
            .find_by_id(room_id)
            .await?
            .ok_or_else(|| ChatError::RoomNotFound(room_id.to_string()))?;
        let message_count = self.store.count_by_room(room_id).await?;
        let last_message = self.store.last_by_room(room_id).await?;
        Ok(RoomOverview {
            room,
            message_count,
            last_message,
        })
    }

    /// Adds the caller to a room's participant set. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Unauthenticated`] for anonymous callers,
    /// [`ChatError::RoomNotFound`] for an unknown room, or
    /// [`ChatError::Persistence`] on storage failure.
    pub async fn join_room(&self, identity: &UserIdentity, room_id: i64) -> Result<(), ChatError> {
        if !identity.authenticated {
            return Err(ChatError::Unauthenticated);
        }
        self.directory.add_participant(room_id, identity.id).await
    }

    /// Removes the caller from a room's participant set. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Unauthenticated`] for anonymous callers,
    /// [`ChatError::RoomNotFound`] for an unknown room, or
    /// [`ChatError::Persistence`] on storage failure.
    pub async fn leave_room(&self, identity: &UserIdentity, room_id: i64) -> Result<(), ChatError> {
        if !identity.authenticated {
            return Err(ChatError::Unauthenticated);
        }
        self.directory
            .remove_participant(room_id, identity.id)
            .await
    }

    /// Returns a room's message history, ascending by timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::RoomNotFound`] for an unknown room, or
    /// [`ChatError::Persistence`] on storage failure.
    pub async fn history(&self, room_id: i64) -> Result<Vec<StoredMessage>, ChatError> {
        if self.directory.find_by_id(room_id).await?.is_none() {
            return Err(ChatError::RoomNotFound(room_id.to_string()));
        }
        self.store.list_by_room(room_id).await
    }

    /// Edits a message's content, setting its edited fields.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Unauthenticated`] for anonymous callers,
    /// [`ChatError::MessageNotFound`] for an unknown id, or
    /// [`ChatError::Persistence`] on storage failure.
    pub async fn edit_message(
        &self,
        identity: &UserIdentity,
        message_id: i64,
        content: &str,
    ) -> Result<StoredMessage, ChatError> {
        if !identity.authenticated {
            return Err(ChatError::Unauthenticated);
        }
        self.store.mark_edited(message_id, content).await
    }
}
