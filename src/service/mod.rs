//! Service layer: business logic orchestration.

pub mod chat_service;

pub use chat_service::{ChatService, RoomOverview};
