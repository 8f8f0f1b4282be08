//! Client→server WebSocket event types.
//!
//! Server→client events are [`crate::domain::ChatEvent`]; this module only
//! covers the inbound direction. Event kinds the protocol does not define
//! deserialize to [`ClientEvent::Unknown`] and are ignored without an error
//! response.

use serde::Deserialize;

/// An event received from a chat client.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Publish a message to the connected room.
    ChatMessage {
        /// Message text.
        message: String,
    },

    /// Any other `type` value. Ignored.
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn chat_message_parses() {
        let parsed: Result<ClientEvent, _> =
            serde_json::from_str(r#"{"type":"chat_message","message":"hi"}"#);
        let Ok(ClientEvent::ChatMessage { message }) = parsed else {
            panic!("expected chat_message");
        };
        assert_eq!(message, "hi");
    }

    #[test]
    fn unknown_type_parses_to_unknown() {
        let parsed: Result<ClientEvent, _> =
            serde_json::from_str(r#"{"type":"typing_indicator","state":"on"}"#);
        assert!(matches!(parsed, Ok(ClientEvent::Unknown)));
    }

    #[test]
    fn missing_message_field_is_an_error() {
        let parsed: Result<ClientEvent, _> = serde_json::from_str(r#"{"type":"chat_message"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn invalid_json_is_an_error() {
        let parsed: Result<ClientEvent, _> = serde_json::from_str("not json");
        assert!(parsed.is_err());
    }
}
