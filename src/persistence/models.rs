//! Durable rows for rooms and messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A room directory entry from the `chat_rooms` table.
///
/// Identity for lookup is the raw display name; the broadcast channel key
/// is derived separately and never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRecord {
    /// Auto-increment row id.
    pub id: i64,
    /// Unique display name (raw, not normalized).
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Public rooms are visible to everyone; private rooms only to
    /// participants.
    pub is_public: bool,
    /// User id of the creator, if known.
    pub created_by: Option<i64>,
    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Participant user ids (relevant for private rooms).
    pub participants: Vec<i64>,
}

/// Fields for creating a room directory entry.
#[derive(Debug, Clone)]
pub struct NewRoom {
    /// Unique display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Visibility flag.
    pub is_public: bool,
    /// Creator's user id.
    pub created_by: Option<i64>,
}

/// A stored chat message from the `chat_messages` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Auto-increment row id.
    pub id: i64,
    /// Room the message belongs to.
    pub room_id: i64,
    /// Author's user id.
    pub user_id: i64,
    /// Author's display name at send time.
    pub username: String,
    /// Message text.
    pub content: String,
    /// Server-assigned persistence timestamp; ordering key within a room.
    pub timestamp: DateTime<Utc>,
    /// Whether the message has been edited.
    pub edited: bool,
    /// When the message was last edited.
    pub edited_at: Option<DateTime<Utc>>,
}
