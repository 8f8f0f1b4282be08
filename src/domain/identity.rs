//! Authenticated identity attached to a connection.
//!
//! Authentication itself happens upstream; the gateway only consumes the
//! resulting identity. An anonymous identity may observe a room but its
//! publish attempts are dropped.

use serde::{Deserialize, Serialize};

/// Identity resolved for a connection before any event is processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// User id assigned by the accounts service.
    pub id: i64,
    /// Display name used in broadcast events.
    pub username: String,
    /// Whether the upstream auth layer vouched for this identity.
    pub authenticated: bool,
}

impl UserIdentity {
    /// Creates an authenticated identity.
    #[must_use]
    pub fn authenticated(id: i64, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            authenticated: true,
        }
    }

    /// Creates the anonymous observer identity.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            id: 0,
            username: String::new(),
            authenticated: false,
        }
    }
}
