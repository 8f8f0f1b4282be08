//! REST endpoint handlers, one module per resource.

pub mod messages;
pub mod rooms;
pub mod system;
