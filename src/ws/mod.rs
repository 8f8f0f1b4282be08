//! WebSocket layer: upgrade handling, session state machine, wire types.
//!
//! One persistent connection per room, addressed by `room_name` in the
//! connection path. Events in both directions are JSON.

pub mod handler;
pub mod messages;
pub mod session;
