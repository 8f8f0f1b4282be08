//! Message-related DTOs for history and edit operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::persistence::StoredMessage;

/// A persisted message in history responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageDto {
    /// Message id.
    pub id: i64,
    /// Room the message belongs to.
    pub room_id: i64,
    /// Author's user id.
    pub user_id: i64,
    /// Author's display name at send time.
    pub username: String,
    /// Message text.
    pub content: String,
    /// Persistence timestamp.
    pub timestamp: DateTime<Utc>,
    /// Whether the message has been edited.
    pub edited: bool,
    /// When the message was last edited.
    pub edited_at: Option<DateTime<Utc>>,
}

impl From<StoredMessage> for MessageDto {
    fn from(message: StoredMessage) -> Self {
        Self {
            id: message.id,
            room_id: message.room_id,
            user_id: message.user_id,
            username: message.username,
            content: message.content,
            timestamp: message.timestamp,
            edited: message.edited,
            edited_at: message.edited_at,
        }
    }
}

/// Request body for `PATCH /messages/{id}`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EditMessageRequest {
    /// Replacement message text.
    pub content: String,
}
