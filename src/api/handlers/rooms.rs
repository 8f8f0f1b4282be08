//! Room directory handlers: list, create, detail, join, leave.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{CreateRoomRequest, MembershipResponse, RoomDetailResponse, RoomDto};
use crate::app_state::AppState;
use crate::domain::UserIdentity;
use crate::error::{ChatError, ErrorResponse};

/// `GET /rooms` — List rooms visible to the caller.
///
/// Anonymous callers see public rooms; authenticated callers additionally
/// see private rooms they participate in.
///
/// # Errors
///
/// Returns [`ChatError`] on directory failure.
#[utoipa::path(
    get,
    path = "/api/v1/rooms",
    tag = "Rooms",
    summary = "List visible rooms",
    responses(
        (status = 200, description = "Rooms visible to the caller", body = Vec<RoomDto>),
    )
)]
pub async fn list_rooms(
    identity: UserIdentity,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ChatError> {
    let rooms = state.chat_service.list_rooms(&identity).await?;
    let body: Vec<RoomDto> = rooms.into_iter().map(RoomDto::from).collect();
    Ok(Json(body))
}

/// `POST /rooms` — Create a room directory entry.
///
/// # Errors
///
/// Returns [`ChatError`] for anonymous callers, duplicate names, or
/// directory failure.
#[utoipa::path(
    post,
    path = "/api/v1/rooms",
    tag = "Rooms",
    summary = "Create a room",
    request_body = CreateRoomRequest,
    responses(
        (status = 201, description = "Room created", body = RoomDto),
        (status = 401, description = "Caller is not authenticated", body = ErrorResponse),
        (status = 409, description = "Room name already exists", body = ErrorResponse),
    )
)]
pub async fn create_room(
    identity: UserIdentity,
    State(state): State<AppState>,
    Json(req): Json<CreateRoomRequest>,
) -> Result<impl IntoResponse, ChatError> {
    let room = state
        .chat_service
        .create_room(&identity, req.name, req.description, req.is_public)
        .await?;
    Ok((StatusCode::CREATED, Json(RoomDto::from(room))))
}

/// `GET /rooms/{id}` — Room detail with message statistics.
///
/// # Errors
///
/// Returns [`ChatError`] for unknown rooms or storage failure.
#[utoipa::path(
    get,
    path = "/api/v1/rooms/{id}",
    tag = "Rooms",
    summary = "Get room detail",
    params(("id" = i64, Path, description = "Room id")),
    responses(
        (status = 200, description = "Room detail", body = RoomDetailResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
    )
)]
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
) -> Result<impl IntoResponse, ChatError> {
    let overview = state.chat_service.room_overview(room_id).await?;
    Ok(Json(RoomDetailResponse::from(overview)))
}

/// `POST /rooms/{id}/join` — Add the caller to the participant set.
///
/// # Errors
///
/// Returns [`ChatError`] for anonymous callers, unknown rooms, or storage
/// failure.
#[utoipa::path(
    post,
    path = "/api/v1/rooms/{id}/join",
    tag = "Rooms",
    summary = "Join a room",
    params(("id" = i64, Path, description = "Room id")),
    responses(
        (status = 200, description = "Caller joined (idempotent)", body = MembershipResponse),
        (status = 401, description = "Caller is not authenticated", body = ErrorResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
    )
)]
pub async fn join_room(
    identity: UserIdentity,
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
) -> Result<impl IntoResponse, ChatError> {
    state.chat_service.join_room(&identity, room_id).await?;
    Ok(Json(MembershipResponse {
        status: "joined room".to_string(),
    }))
}

/// `POST /rooms/{id}/leave` — Remove the caller from the participant set.
///
/// # Errors
///
/// Returns [`ChatError`] for anonymous callers, unknown rooms, or storage
/// failure.
#[utoipa::path(
    post,
    path = "/api/v1/rooms/{id}/leave",
    tag = "Rooms",
    summary = "Leave a room",
    params(("id" = i64, Path, description = "Room id")),
    responses(
        (status = 200, description = "Caller left (idempotent)", body = MembershipResponse),
        (status = 401, description = "Caller is not authenticated", body = ErrorResponse),
        (status = 404, description = "Room not found", body = ErrorResponse),
    )
)]
pub async fn leave_room(
    identity: UserIdentity,
    State(state): State<AppState>,
    Path(room_id): Path<i64>,
) -> Result<impl IntoResponse, ChatError> {
    state.chat_service.leave_room(&identity, room_id).await?;
    Ok(Json(MembershipResponse {
        status: "left room".to_string(),
    }))
}

/// Room routes mounted under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/rooms/{id}", get(get_room))
        .route("/rooms/{id}/join", post(join_room))
        .route("/rooms/{id}/leave", post(leave_room))
}
