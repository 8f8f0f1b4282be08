//! # parkchat-gateway
//!
//! Real-time chat gateway for the national-parks information site.
//!
//! Clients hold one WebSocket per room; messages are persisted first and
//! then fanned out to every session subscribed to the room's broadcast
//! channel. A small REST surface exposes the durable room directory and
//! message history. Park data, ratings, and authentication live in other
//! services — this gateway only consumes an identity forwarded by the
//! upstream auth layer.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Sessions (ws/)
//!     │
//!     ├── ChatService (service/)
//!     ├── MessageBus + RoomRegistry (domain/)
//!     │
//!     └── MessageStore / RoomDirectory (persistence/)
//!             ├── PostgreSQL
//!             └── in-memory (tests, local runs)
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
pub mod ws;
