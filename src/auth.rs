//! Identity resolution for incoming connections.
//!
//! Authentication is handled upstream (accounts service + reverse proxy);
//! by the time a request reaches the gateway, the proxy has validated the
//! session and forwarded the identity in `x-user-id` / `x-username`
//! headers. Requests without both headers are anonymous observers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;

use crate::domain::UserIdentity;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-user-id";
/// Header carrying the authenticated username.
pub const USERNAME_HEADER: &str = "x-username";

impl<S> FromRequestParts<S> for UserIdentity
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok());
        let username = parts
            .headers
            .get(USERNAME_HEADER)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty());

        Ok(match (id, username) {
            (Some(id), Some(username)) => Self::authenticated(id, username),
            _ => Self::anonymous(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn resolve(request: Request<()>) -> UserIdentity {
        let (mut parts, ()) = request.into_parts();
        match UserIdentity::from_request_parts(&mut parts, &()).await {
            Ok(identity) => identity,
            Err(never) => match never {},
        }
    }

    #[tokio::test]
    async fn both_headers_yield_authenticated_identity() {
        let request = Request::builder()
            .header(USER_ID_HEADER, "3")
            .header(USERNAME_HEADER, "alice")
            .body(())
            .unwrap_or_default();
        let identity = resolve(request).await;
        assert!(identity.authenticated);
        assert_eq!(identity.id, 3);
        assert_eq!(identity.username, "alice");
    }

    #[tokio::test]
    async fn missing_headers_yield_anonymous() {
        let request = Request::builder().body(()).unwrap_or_default();
        assert!(!resolve(request).await.authenticated);
    }

    #[tokio::test]
    async fn unparseable_user_id_yields_anonymous() {
        let request = Request::builder()
            .header(USER_ID_HEADER, "not-a-number")
            .header(USERNAME_HEADER, "alice")
            .body(())
            .unwrap_or_default();
        assert!(!resolve(request).await.authenticated);
    }
}
