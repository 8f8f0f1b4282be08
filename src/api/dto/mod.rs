//! Data Transfer Objects for REST request/response serialization.

pub mod message_dto;
pub mod room_dto;

pub use message_dto::*;
pub use room_dto::*;
