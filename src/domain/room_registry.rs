//! Live-session registry: which sessions are currently on which channel.
//!
//! [`RoomRegistry`] tracks, per [`ChannelKey`], the member sessions and the
//! bounded broadcast channel fanning events out to them. It is an owned
//! value passed to the dispatcher at construction, not ambient global
//! state. The per-channel ring buffer caps memory for stalled clients:
//! when a receiver falls behind by more than the capacity, the oldest
//! events are dropped for that receiver and it observes a lag error.

use std::collections::{HashMap, HashSet};

use tokio::sync::{RwLock, broadcast};

use super::channel_key::ChannelKey;
use super::chat_event::ChatEvent;
use super::session_id::SessionId;

#[derive(Debug)]
struct ChannelEntry {
    sender: broadcast::Sender<ChatEvent>,
    members: HashSet<SessionId>,
}

/// Registry of live sessions grouped by broadcast channel.
///
/// # Concurrency
///
/// All operations take the inner `RwLock` briefly; `broadcast` hands the
/// event to the channel's ring buffer under the read lock and never waits
/// for a receiver, so a slow subscriber cannot stall publishers.
#[derive(Debug)]
pub struct RoomRegistry {
    capacity: usize,
    channels: RwLock<HashMap<ChannelKey, ChannelEntry>>,
}

impl RoomRegistry {
    /// Creates an empty registry whose channels buffer up to `capacity`
    /// events per receiver.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Adds a session to a channel, returning its event receiver.
    ///
    /// The channel's broadcast sender is created lazily on first add.
    /// Re-adding an existing session yields a fresh receiver.
    pub async fn add(
        &self,
        channel: &ChannelKey,
        session: SessionId,
    ) -> broadcast::Receiver<ChatEvent> {
        let mut channels = self.channels.write().await;
        let entry = channels.entry(channel.clone()).or_insert_with(|| {
            let (sender, _) = broadcast::channel(self.capacity);
            ChannelEntry {
                sender,
                members: HashSet::new(),
            }
        });
        entry.members.insert(session);
        entry.sender.subscribe()
    }

    /// Removes a session from a channel. Removing an absent session is a
    /// no-op. An emptied channel entry is pruned, dropping its sender so
    /// lingering receivers observe a closed channel once drained.
    pub async fn remove(&self, channel: &ChannelKey, session: SessionId) {
        let mut channels = self.channels.write().await;
        if let Some(entry) = channels.get_mut(channel) {
            entry.members.remove(&session);
            if entry.members.is_empty() {
                channels.remove(channel);
            }
        }
    }

    /// Delivers an event to every session on the channel.
    ///
    /// Returns the number of receivers the event was handed to; zero when
    /// the channel has no members.
    pub async fn broadcast(&self, channel: &ChannelKey, event: &ChatEvent) -> usize {
        let channels = self.channels.read().await;
        channels
            .get(channel)
            .map_or(0, |entry| entry.sender.send(event.clone()).unwrap_or(0))
    }

    /// Returns the number of sessions currently on a channel.
    pub async fn member_count(&self, channel: &ChannelKey) -> usize {
        self.channels
            .read()
            .await
            .get(channel)
            .map_or(0, |entry| entry.members.len())
    }

    /// Returns the number of channels with at least one session.
    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn event(text: &str) -> ChatEvent {
        ChatEvent::ChatMessage {
            message: text.to_string(),
            user_id: 1,
            username: "tester".to_string(),
            message_id: 1,
            timestamp: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn broadcast_reaches_all_members() {
        let registry = RoomRegistry::new(16);
        let channel = ChannelKey::from_raw("general");

        let mut rx_a = registry.add(&channel, SessionId::new()).await;
        let mut rx_b = registry.add(&channel, SessionId::new()).await;

        let delivered = registry.broadcast(&channel, &event("hi")).await;
        assert_eq!(delivered, 2);
        assert!(rx_a.recv().await.is_ok());
        assert!(rx_b.recv().await.is_ok());
    }

    #[tokio::test]
    async fn broadcast_on_empty_channel_delivers_nothing() {
        let registry = RoomRegistry::new(16);
        let channel = ChannelKey::from_raw("empty");
        assert_eq!(registry.broadcast(&channel, &event("hi")).await, 0);
    }

    #[tokio::test]
    async fn removed_session_receives_nothing_further() {
        let registry = RoomRegistry::new(16);
        let channel = ChannelKey::from_raw("general");
        let session = SessionId::new();

        let mut rx = registry.add(&channel, session).await;
        registry.broadcast(&channel, &event("first")).await;
        registry.remove(&channel, session).await;
        let delivered = registry.broadcast(&channel, &event("second")).await;

        assert_eq!(delivered, 0);
        assert!(rx.recv().await.is_ok());
        // The pruned channel dropped its sender; nothing else arrives.
        assert!(rx.recv().await.is_err());
    }

    #[tokio::test]
    async fn remove_is_idempotent_and_prunes_empty_channels() {
        let registry = RoomRegistry::new(16);
        let channel = ChannelKey::from_raw("general");
        let session = SessionId::new();

        let _rx = registry.add(&channel, session).await;
        assert_eq!(registry.channel_count().await, 1);

        registry.remove(&channel, session).await;
        registry.remove(&channel, session).await;
        assert_eq!(registry.channel_count().await, 0);
        assert_eq!(registry.member_count(&channel).await, 0);
    }

    #[tokio::test]
    async fn channels_are_isolated() {
        let registry = RoomRegistry::new(16);
        let general = ChannelKey::from_raw("general");
        let trails = ChannelKey::from_raw("trails");

        let mut rx = registry.add(&general, SessionId::new()).await;

        assert_eq!(registry.broadcast(&trails, &event("hi")).await, 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn stalled_receiver_is_capped_at_channel_capacity() {
        let registry = RoomRegistry::new(2);
        let channel = ChannelKey::from_raw("busy");
        let mut rx = registry.add(&channel, SessionId::new()).await;

        for text in ["one", "two", "three", "four"] {
            registry.broadcast(&channel, &event(text)).await;
        }

        // The ring buffer kept only the newest two events; the receiver
        // sees how far it lagged, then resumes from the oldest retained.
        let Err(broadcast::error::RecvError::Lagged(missed)) = rx.recv().await else {
            panic!("expected lag error");
        };
        assert_eq!(missed, 2);

        let Ok(ChatEvent::ChatMessage { message, .. }) = rx.recv().await else {
            panic!("expected retained event");
        };
        assert_eq!(message, "three");
    }
}
