//! Persistence layer: durable rooms and chat history.
//!
//! [`MessageStore`] and [`RoomDirectory`] are the seams between the chat
//! core and storage. The PostgreSQL implementation backs production; the
//! in-memory implementation backs tests and broker-less local runs. Session
//! and service code only ever sees the traits.

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::UserIdentity;
use crate::error::ChatError;
pub use memory::InMemoryStore;
pub use models::{NewRoom, RoomRecord, StoredMessage};
pub use postgres::PostgresStore;

/// Append-only chat message persistence.
#[async_trait]
pub trait MessageStore: Send + Sync + std::fmt::Debug {
    /// Persists a message, assigning its id and timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Persistence`] when storage is unavailable; the
    /// caller must not broadcast the message in that case.
    async fn append(
        &self,
        room_id: i64,
        user: &UserIdentity,
        content: &str,
    ) -> Result<StoredMessage, ChatError>;

    /// Returns all messages in a room, ascending by timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Persistence`] on storage failure.
    async fn list_by_room(&self, room_id: i64) -> Result<Vec<StoredMessage>, ChatError>;

    /// Returns the number of messages in a room.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Persistence`] on storage failure.
    async fn count_by_room(&self, room_id: i64) -> Result<i64, ChatError>;

    /// Returns the most recent message in a room, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Persistence`] on storage failure.
    async fn last_by_room(&self, room_id: i64) -> Result<Option<StoredMessage>, ChatError>;

    /// Replaces a message's content and sets its edited fields.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::MessageNotFound`] for an unknown id, or
    /// [`ChatError::Persistence`] on storage failure.
    async fn mark_edited(&self, message_id: i64, content: &str)
    -> Result<StoredMessage, ChatError>;
}

/// Durable catalog of named rooms, independent of live connections.
#[async_trait]
pub trait RoomDirectory: Send + Sync + std::fmt::Debug {
    /// Looks up a room by its raw display name.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Persistence`] on storage failure.
    async fn find_by_name(&self, name: &str) -> Result<Option<RoomRecord>, ChatError>;

    /// Looks up a room by id.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Persistence`] on storage failure.
    async fn find_by_id(&self, room_id: i64) -> Result<Option<RoomRecord>, ChatError>;

    /// Creates a room directory entry.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::DuplicateRoom`] if the name is taken, or
    /// [`ChatError::Persistence`] on storage failure.
    async fn create(&self, room: NewRoom) -> Result<RoomRecord, ChatError>;

    /// Lists rooms visible to the viewer: public rooms plus private rooms
    /// the viewer participates in. Newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Persistence`] on storage failure.
    async fn list_visible(&self, viewer: Option<i64>) -> Result<Vec<RoomRecord>, ChatError>;

    /// Adds a user to a room's participant set. Adding an existing
    /// participant is a no-op success.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::RoomNotFound`] for an unknown room, or
    /// [`ChatError::Persistence`] on storage failure.
    async fn add_participant(&self, room_id: i64, user_id: i64) -> Result<(), ChatError>;

    /// Removes a user from a room's participant set. Removing an absent
    /// participant is a no-op success.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::RoomNotFound`] for an unknown room, or
    /// [`ChatError::Persistence`] on storage failure.
    async fn remove_participant(&self, room_id: i64, user_id: i64) -> Result<(), ChatError>;
}
