//! Domain layer: channel identity, live-session registry, and event fan-out.
//!
//! This module contains the chat core's in-process model: the normalized
//! channel key, per-connection identities, the registry of live sessions,
//! and the message bus that fans events out to them.

pub mod channel_key;
pub mod chat_event;
pub mod identity;
pub mod message_bus;
pub mod room_registry;
pub mod session_id;

pub use channel_key::ChannelKey;
pub use chat_event::ChatEvent;
pub use identity::UserIdentity;
pub use message_bus::{EventReceiver, InMemoryBus, MessageBus};
pub use room_registry::RoomRegistry;
pub use session_id::SessionId;
