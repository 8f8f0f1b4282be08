//! Per-connection chat session state machine.
//!
//! One [`ChatSession`] per accepted WebSocket, running
//! `CONNECTING → OPEN → CLOSED`. On open the session subscribes its channel
//! on the bus and emits `room_info` when the directory knows the raw room
//! name. While open it relays inbound `chat_message` events to the service
//! and forwards bus deliveries to the client. Close is idempotent and
//! always detaches the session from the bus, so a disconnected client can
//! never remain a delivery target.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::ClientEvent;
use crate::domain::{ChannelKey, ChatEvent, EventReceiver, SessionId, UserIdentity};
use crate::service::ChatService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionState {
    Connecting,
    Open,
    Closed,
}

/// Live state for one chat connection.
#[derive(Debug)]
pub struct ChatSession {
    id: SessionId,
    raw_room_name: String,
    channel: ChannelKey,
    identity: UserIdentity,
    service: Arc<ChatService>,
    state: SessionState,
}

impl ChatSession {
    /// Creates a session in the `CONNECTING` state.
    ///
    /// `raw_room_name` comes percent-decoded from the connection path; the
    /// broadcast channel key is derived from it here.
    #[must_use]
    pub fn new(raw_room_name: String, identity: UserIdentity, service: Arc<ChatService>) -> Self {
        let channel = ChannelKey::from_raw(&raw_room_name);
        Self {
            id: SessionId::new(),
            raw_room_name,
            channel,
            identity,
            service,
            state: SessionState::Connecting,
        }
    }

    /// Drives the session over the given socket until either side closes.
    pub async fn run(mut self, socket: WebSocket) {
        let mut events = self.open().await;
        let (mut ws_tx, mut ws_rx) = socket.split();

        // Directory lookup by the raw name. A miss is silent: the channel
        // subscription above already works for unlisted rooms.
        match self.service.room_info(&self.raw_room_name).await {
            Ok(Some(room)) => {
                let info = ChatEvent::RoomInfo {
                    room_name: room.name,
                    room_id: room.id,
                };
                if let Ok(json) = serde_json::to_string(&info)
                    && ws_tx.send(Message::text(json)).await.is_err()
                {
                    self.close().await;
                    return;
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(session = %self.id, error = %e, "room_info lookup failed");
            }
        }

        loop {
            tokio::select! {
                frame = ws_rx.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => self.handle_frame(&text).await,
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                        _ => {}
                    }
                }
                event = events.recv() => {
                    match event {
                        Ok(event) => {
                            let Ok(json) = serde_json::to_string(&event) else {
                                continue;
                            };
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            tracing::warn!(
                                session = %self.id,
                                channel = %self.channel,
                                lagged = missed,
                                "session fell behind the broadcast channel; oldest events dropped"
                            );
                        }
                        // Bus side closed; nothing left to deliver.
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        }

        self.close().await;
    }

    /// Transitions to `OPEN`, subscribing the session's channel on the bus.
    async fn open(&mut self) -> EventReceiver {
        let events = self.service.bus().subscribe(&self.channel, self.id).await;
        self.state = SessionState::Open;
        tracing::debug!(session = %self.id, channel = %self.channel, "session open");
        events
    }

    /// Transitions to `CLOSED`, detaching from the bus. Idempotent.
    async fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closed;
        self.service.bus().unsubscribe(&self.channel, self.id).await;
        tracing::debug!(session = %self.id, channel = %self.channel, "session closed");
    }

    /// Processes one inbound text frame.
    ///
    /// Malformed JSON, unsupported event kinds, unauthenticated publishes,
    /// and persistence failures are all dropped without a client-visible
    /// error; only logging distinguishes them.
    async fn handle_frame(&self, text: &str) {
        if self.state != SessionState::Open {
            return;
        }

        let event = match serde_json::from_str::<ClientEvent>(text) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(session = %self.id, error = %e, "ignoring malformed client event");
                return;
            }
        };

        match event {
            ClientEvent::ChatMessage { message } => {
                if let Err(e) = self
                    .service
                    .publish_message(&self.raw_room_name, &self.identity, &message)
                    .await
                {
                    tracing::warn!(
                        session = %self.id,
                        room = %self.raw_room_name,
                        error = %e,
                        "message not persisted; broadcast suppressed"
                    );
                }
            }
            ClientEvent::Unknown => {
                tracing::trace!(session = %self.id, "ignoring unsupported client event kind");
            }
        }
    }
}
