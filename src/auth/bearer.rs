use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::token;
use crate::error::ApiError;
use crate::state::AppState;

/// The raw bearer token from the Authorization header, without any lookup.
/// Logout uses this to know which token to revoke.
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(ApiError::Unauthorized("Missing Authorization header"))?;

        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(ApiError::Unauthorized("Invalid Authorization header"))?;

        Ok(BearerToken(token.to_string()))
    }
}

/// Resolves the bearer token to the authenticated user id, rejecting with 401
/// when the token is missing or not live.
pub struct AuthUser(pub i64);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        let user_id = token::user_id_for(&state.db, &token)
            .await?
            .ok_or_else(|| {
                tracing::warn!("unknown or revoked bearer token");
                ApiError::Unauthorized("Invalid or expired token")
            })?;
        Ok(AuthUser(user_id))
    }
}
