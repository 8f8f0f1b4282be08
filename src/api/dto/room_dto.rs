//! Room-related DTOs for create, get, list, and membership operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::persistence::RoomRecord;
use crate::service::RoomOverview;

/// Request body for `POST /rooms`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoomRequest {
    /// Unique display name for the room.
    pub name: String,
    /// Optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Visibility flag. Defaults to public.
    #[serde(default = "default_is_public")]
    pub is_public: bool,
}

fn default_is_public() -> bool {
    true
}

/// Room representation in list and create responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomDto {
    /// Directory row id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Visibility flag.
    pub is_public: bool,
    /// Creator's user id, if known.
    pub created_by: Option<i64>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Participant user ids.
    pub participants: Vec<i64>,
}

impl From<RoomRecord> for RoomDto {
    fn from(room: RoomRecord) -> Self {
        Self {
            id: room.id,
            name: room.name,
            description: room.description,
            is_public: room.is_public,
            created_by: room.created_by,
            created_at: room.created_at,
            participants: room.participants,
        }
    }
}

/// Compact view of a room's most recent message.
#[derive(Debug, Serialize, ToSchema)]
pub struct LastMessageDto {
    /// Message id.
    pub id: i64,
    /// Message text.
    pub content: String,
    /// Author's display name.
    pub user: String,
    /// Persistence timestamp.
    pub timestamp: DateTime<Utc>,
}

/// Room detail with message statistics for `GET /rooms/{id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoomDetailResponse {
    /// The room itself.
    #[serde(flatten)]
    pub room: RoomDto,
    /// Total messages persisted in the room.
    pub message_count: i64,
    /// Most recent message, if any.
    pub last_message: Option<LastMessageDto>,
}

impl From<RoomOverview> for RoomDetailResponse {
    fn from(overview: RoomOverview) -> Self {
        Self {
            room: overview.room.into(),
            message_count: overview.message_count,
            last_message: overview.last_message.map(|m| LastMessageDto {
                id: m.id,
                content: m.content,
                user: m.username,
                timestamp: m.timestamp,
            }),
        }
    }
}

/// Response body for membership mutations (join/leave).
#[derive(Debug, Serialize, ToSchema)]
pub struct MembershipResponse {
    /// Outcome description (e.g. `"joined room"`).
    pub status: String,
}
