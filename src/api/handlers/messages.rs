//! Message history and edit handlers.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, patch};
use axum::{Json, Router};

use crate::api::dto::{EditMessageRequest, MessageDto};
use crate::app_state::AppState;
use crate::domain::UserIdentity;
use crate::error::{ChatError, ErrorResponse};

/// `GET /rooms/{id}/messages` — Room history, ascending by timestamp.
///
/// # Errors
///
/// Returns [`ChatError`] for unknown rooms or storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/rooms/{id}/messages",
    tag = "Messages",
    summary = "List room history",
    params(("id" = i64, Path, description = "Room id")),
    responses(
        (status = 200, description = "Messages ascending by timestamp", body = Vec<MessageDto>),
        (status = 404, description = "Room not found", body = ErrorResponse),
    )
)]
pub async fn list_messages(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
) -> Result<impl IntoResponse, ChatError> {
    let messages = state.chat_service.history(room_id).await?;
    let body: Vec<MessageDto> = messages.into_iter().map(MessageDto::from).collect();
    Ok(Json(body))
}

/// `PATCH /messages/{id}` — Edit a message's content.
///
/// Sets the message's `edited`/`edited_at` fields. The live chat flow never
/// edits; this is the REST face of the model contract.
///
/// # Errors
///
/// Returns [`ChatError`] for anonymous callers, unknown messages, or
/// storage failure.
#[utoipa::path(
    patch,
    path = "/api/v1/messages/{id}",
    tag = "Messages",
    summary = "Edit a message",
    params(("id" = i64, Path, description = "Message id")),
    request_body = EditMessageRequest,
    responses(
        (status = 200, description = "Edited message", body = MessageDto),
        (status = 401, description = "Caller is not authenticated", body = ErrorResponse),
        (status = 404, description = "Message not found", body = ErrorResponse),
    )
)]
pub async fn edit_message(
    identity: UserIdentity,
    State(state): State<AppState>,
    Path(message_id): Path<i64>,
    Json(req): Json<EditMessageRequest>,
) -> Result<impl IntoResponse, ChatError> {
    let message = state
        .chat_service
        .edit_message(&identity, message_id, &req.content)
        .await?;
    Ok(Json(MessageDto::from(message)))
}

/// Message routes mounted under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rooms/{id}/messages", get(list_messages))
        .route("/messages/{id}", patch(edit_message))
}
