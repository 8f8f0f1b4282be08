//! Broadcast dispatcher seam between the chat service and event delivery.
//!
//! [`MessageBus`] abstracts how a persisted event reaches the sessions
//! subscribed to a channel. The shipped implementation, [`InMemoryBus`],
//! fans out through the process-local [`RoomRegistry`] and its bounded
//! per-channel broadcast queues; a broker-backed implementation for
//! multi-process deployments would slot in behind the same trait.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::channel_key::ChannelKey;
use super::chat_event::ChatEvent;
use super::room_registry::RoomRegistry;
use super::session_id::SessionId;

/// Receiving side of a channel subscription.
///
/// A receiver that falls more than the configured capacity behind the
/// channel observes [`broadcast::error::RecvError::Lagged`] and resumes
/// from the oldest retained event.
pub type EventReceiver = broadcast::Receiver<ChatEvent>;

/// Fan-out interface for delivering chat events to subscribed sessions.
#[async_trait]
pub trait MessageBus: Send + Sync + std::fmt::Debug {
    /// Subscribes a session to a channel and returns its event stream.
    async fn subscribe(&self, channel: &ChannelKey, session: SessionId) -> EventReceiver;

    /// Removes a session's subscription. Unknown subscriptions are ignored.
    async fn unsubscribe(&self, channel: &ChannelKey, session: SessionId);

    /// Delivers an event to every subscriber of a channel, returning the
    /// number of sessions it was handed to.
    async fn publish(&self, channel: &ChannelKey, event: &ChatEvent) -> usize;
}

/// Process-local [`MessageBus`] backed by a [`RoomRegistry`].
#[derive(Debug)]
pub struct InMemoryBus {
    registry: Arc<RoomRegistry>,
}

impl InMemoryBus {
    /// Creates a bus dispatching through the given registry.
    #[must_use]
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn subscribe(&self, channel: &ChannelKey, session: SessionId) -> EventReceiver {
        self.registry.add(channel, session).await
    }

    async fn unsubscribe(&self, channel: &ChannelKey, session: SessionId) {
        self.registry.remove(channel, session).await;
    }

    async fn publish(&self, channel: &ChannelKey, event: &ChatEvent) -> usize {
        self.registry.broadcast(channel, event).await
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn bus() -> InMemoryBus {
        InMemoryBus::new(Arc::new(RoomRegistry::new(16)))
    }

    fn event(text: &str) -> ChatEvent {
        ChatEvent::ChatMessage {
            message: text.to_string(),
            user_id: 7,
            username: "ranger".to_string(),
            message_id: 1,
            timestamp: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn publish_without_subscribers_delivers_zero() {
        let bus = bus();
        let channel = ChannelKey::from_raw("lonely");
        assert_eq!(bus.publish(&channel, &event("hello")).await, 0);
    }

    #[tokio::test]
    async fn subscribers_receive_in_publish_order() {
        let bus = bus();
        let channel = ChannelKey::from_raw("general");
        let mut rx_a = bus.subscribe(&channel, SessionId::new()).await;
        let mut rx_b = bus.subscribe(&channel, SessionId::new()).await;

        bus.publish(&channel, &event("first")).await;
        bus.publish(&channel, &event("second")).await;

        for rx in [&mut rx_a, &mut rx_b] {
            let Ok(ChatEvent::ChatMessage { message, .. }) = rx.recv().await else {
                panic!("expected first event");
            };
            assert_eq!(message, "first");
            let Ok(ChatEvent::ChatMessage { message, .. }) = rx.recv().await else {
                panic!("expected second event");
            };
            assert_eq!(message, "second");
        }
    }

    #[tokio::test]
    async fn unsubscribed_session_stops_receiving() {
        let bus = bus();
        let channel = ChannelKey::from_raw("general");
        let session = SessionId::new();
        let mut rx = bus.subscribe(&channel, session).await;

        bus.publish(&channel, &event("before")).await;
        bus.unsubscribe(&channel, session).await;
        let delivered = bus.publish(&channel, &event("after")).await;

        assert_eq!(delivered, 0);
        let Ok(ChatEvent::ChatMessage { message, .. }) = rx.recv().await else {
            panic!("expected pre-unsubscribe event");
        };
        assert_eq!(message, "before");
        assert!(rx.recv().await.is_err());
    }

    #[tokio::test]
    async fn colliding_raw_names_share_one_channel() {
        let bus = bus();
        let slash = ChannelKey::from_raw("trail/talk");
        let space = ChannelKey::from_raw("trail talk");
        let mut rx = bus.subscribe(&slash, SessionId::new()).await;

        let delivered = bus.publish(&space, &event("hi")).await;

        assert_eq!(delivered, 1);
        assert!(rx.recv().await.is_ok());
    }
}
