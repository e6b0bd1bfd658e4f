use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{info, instrument, warn};

use crate::auth::bearer::{AuthUser, BearerToken};
use crate::auth::dto::{LoginRequest, LoginResponse, MessageResponse};
use crate::auth::{password, token};
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::PublicUser;
use crate::users::repo::User;
use crate::validate::{check_required, is_valid_email, FieldErrors};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/user", get(current_user))
}

/// POST /login. Unknown email and wrong password are reported identically.
#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let mut errors = FieldErrors::new();
    if !is_valid_email(&payload.email) {
        errors.push("email", "The email must be a valid email address");
    }
    check_required(&mut errors, "password", &payload.password);
    errors.into_result()?;

    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            warn!("login with unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !password::verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = user.id, "login with invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = token::issue(&state.db, user.id).await?;
    info!(user_id = user.id, "user logged in");
    Ok(Json(LoginResponse {
        message: "User logged in successfully",
        user_id: user.id,
        user_info: user.into(),
        token,
    }))
}

/// POST /logout. Revokes the presented bearer token; presenting a token that
/// is not live is treated as unauthenticated.
#[instrument(skip(state, bearer))]
pub async fn logout(
    State(state): State<AppState>,
    bearer: BearerToken,
) -> Result<Json<MessageResponse>, ApiError> {
    let revoked = token::revoke(&state.db, &bearer.0).await?;
    if !revoked {
        warn!("logout with unknown token");
        return Err(ApiError::Unauthorized("Invalid or expired token"));
    }
    info!("user logged out");
    Ok(Json(MessageResponse {
        message: "Logout successful",
    }))
}

/// GET /user. The current authenticated user's record.
#[instrument(skip(state))]
pub async fn current_user(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::Unauthorized("User not found"))?;
    Ok(Json(user.into()))
}
