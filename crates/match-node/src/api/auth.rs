//! Caller resolution.
//!
//! Handlers take a `Caller` argument; extracting it resolves the
//! `Authorization: Bearer <token>` header through the `IdentityProvider`.
//! A missing, malformed or unknown credential ends the request with 401
//! before any handler runs.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use match_telemetry::log_event;
use shared_types::UserId;
use tracing::debug;

use super::error::ApiError;
use super::AppState;

/// The authenticated user behind a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub UserId);

/// Extract the bearer token from an `Authorization` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let Some(token) = header.and_then(bearer_token) else {
            debug!(path = %parts.uri.path(), "Request without bearer credential");
            return Err(ApiError::unauthenticated("missing bearer credential"));
        };

        match state.identity.resolve(token).await {
            Some(user) => Ok(Caller(user)),
            None => {
                log_event!(warn, "gateway", "Unknown bearer credential", path = %parts.uri.path());
                Err(ApiError::unauthenticated("unknown credential"))
            }
        }
    }
}
