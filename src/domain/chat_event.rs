//! Events delivered to chat clients.
//!
//! [`ChatEvent`] is both the dispatcher payload and the server→client wire
//! shape: the serde `type` tag produces exactly the JSON the protocol
//! documents, so sessions can forward bus deliveries without re-mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server→client event.
///
/// `timestamp` fields serialize as ISO-8601 date-time strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Directory metadata for the connected room. Sent directly to the
    /// connecting client, at most once, and only when a directory entry
    /// exists for the raw room name.
    RoomInfo {
        /// Display name from the directory entry.
        room_name: String,
        /// Directory row id.
        room_id: i64,
    },

    /// A chat message fanned out to every session on the channel.
    ChatMessage {
        /// Message text as persisted.
        message: String,
        /// Author's user id.
        user_id: i64,
        /// Author's display name.
        username: String,
        /// Id assigned by the message store.
        message_id: i64,
        /// Persistence timestamp, assigned server-side.
        timestamp: DateTime<Utc>,
    },
}

#[cfg(test)]
#[allow(clippy::panic, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn chat_message_wire_shape() {
        let Some(ts) = Utc.with_ymd_and_hms(2026, 8, 26, 12, 0, 0).single() else {
            panic!("valid timestamp");
        };
        let event = ChatEvent::ChatMessage {
            message: "hi".to_string(),
            user_id: 3,
            username: "alice".to_string(),
            message_id: 41,
            timestamp: ts,
        };
        let json = serde_json::to_value(&event).unwrap_or_default();
        assert_eq!(json["type"], "chat_message");
        assert_eq!(json["message"], "hi");
        assert_eq!(json["user_id"], 3);
        assert_eq!(json["username"], "alice");
        assert_eq!(json["message_id"], 41);
        assert_eq!(json["timestamp"], "2026-08-26T12:00:00Z");
    }

    #[test]
    fn room_info_wire_shape() {
        let event = ChatEvent::RoomInfo {
            room_name: "Yellowstone Talk".to_string(),
            room_id: 7,
        };
        let json = serde_json::to_value(&event).unwrap_or_default();
        assert_eq!(json["type"], "room_info");
        assert_eq!(json["room_name"], "Yellowstone Talk");
        assert_eq!(json["room_id"], 7);
    }
}
