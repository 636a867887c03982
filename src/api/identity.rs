use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::models::Requester;

/// Header carrying the authenticated user id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the authenticated user's verification flag
pub const USER_VERIFIED_HEADER: &str = "x-user-verified";

/// Caller identity forwarded by the authentication gateway
///
/// A missing verification header means unverified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity(pub Requester);

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .ok_or_else(|| AppError::Unauthorized("missing or invalid user id".to_string()))?;

        let is_verified = parts
            .headers
            .get(USER_VERIFIED_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(|s| s.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Identity(Requester::new(user_id, is_verified)))
    }
}
