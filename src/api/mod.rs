//! REST surface over the room directory and message history.
//!
//! Resource routes (rooms, messages) are versioned under `/api/v1`; the
//! health probe stays unversioned at the root so load balancers do not
//! chase version bumps.

pub mod dto;
pub mod handlers;

use axum::Router;

use crate::app_state::AppState;

/// Assembles the REST router: versioned resource routes plus probes.
pub fn build_router() -> Router<AppState> {
    let resources = Router::new()
        .merge(handlers::rooms::routes())
        .merge(handlers::messages::routes());
    Router::new()
        .nest("/api/v1", resources)
        .merge(handlers::system::routes())
}
