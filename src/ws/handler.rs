//! Axum WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Path, State};
use axum::response::IntoResponse;

use super::session::ChatSession;
use crate::app_state::AppState;
use crate::domain::UserIdentity;

/// `GET /ws/chat/{room_name}` — Upgrade to a WebSocket chat session.
///
/// `room_name` is percent-decoded by the path extractor; the session
/// derives the broadcast channel key from the decoded form. Identity comes
/// from the upstream auth headers and may be anonymous.
pub async fn chat_ws_handler(
    ws: WebSocketUpgrade,
    Path(room_name): Path<String>,
    identity: UserIdentity,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let service = Arc::clone(&state.chat_service);
    ws.on_upgrade(move |socket| ChatSession::new(room_name, identity, service).run(socket))
}
