use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::auth::dto::MessageResponse;
use crate::auth::password::hash_password;
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::{
    ChangePasswordRequest, PublicUser, RegisterRequest, RegisterResponse, UpdateUserRequest,
    UserListResponse, UserResponse,
};
use crate::users::repo::{Role, User};
use crate::validate::{check_length, is_valid_email, FieldErrors};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/users", get(get_all_users))
        .route("/users/:id", get(get_user))
        .route("/users/update/:id", put(update_user))
        .route("/users/changepassword/:id", put(change_password))
        .route("/users/delete/:id", delete(delete_user))
}

/// Shared between register and update; `exclude` is the id being updated so
/// its own unchanged values do not collide.
async fn validate_profile(
    db: &PgPool,
    errors: &mut FieldErrors,
    name: &str,
    email: &str,
    role_id: i64,
    exclude: Option<i64>,
) -> Result<(), ApiError> {
    check_length(errors, "name", name, 3, 20);
    if User::name_taken(db, name, exclude).await? {
        errors.push("name", "The name has already been taken");
    }
    if !is_valid_email(email) {
        errors.push("email", "The email must be a valid email address");
    } else if User::email_taken(db, email, exclude).await? {
        errors.push("email", "The email has already been taken");
    }
    if !Role::exists(db, role_id).await? {
        errors.push("role_id", "The selected role_id is invalid");
    }
    Ok(())
}

/// POST /register
#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let mut errors = FieldErrors::new();
    validate_profile(
        &state.db,
        &mut errors,
        &payload.name,
        &payload.email,
        payload.role_id,
        None,
    )
    .await?;
    check_length(&mut errors, "password", &payload.password, 6, 20);
    errors.into_result()?;

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.name, &payload.email, &hash, payload.role_id)
        .await?;

    info!(user_id = user.id, "user registered");
    Ok(Json(RegisterResponse {
        status: true,
        message: "User registered successfully",
        data: user.into(),
    }))
}

/// GET /users/:id — role expanded.
#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = User::find_with_role(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;
    Ok(Json(UserResponse { user: user.into() }))
}

/// GET /users — an empty store is a 404, not an empty array.
#[instrument(skip(state))]
pub async fn get_all_users(
    State(state): State<AppState>,
) -> Result<Json<UserListResponse>, ApiError> {
    let users = User::list_with_roles(&state.db).await?;
    if users.is_empty() {
        return Err(ApiError::NotFound("No users found"));
    }
    Ok(Json(UserListResponse {
        users: users.into_iter().map(Into::into).collect(),
    }))
}

/// PUT /users/update/:id — full replace of name, email and role.
#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    if User::find_by_id(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound("User not found"));
    }

    let mut errors = FieldErrors::new();
    validate_profile(
        &state.db,
        &mut errors,
        &payload.name,
        &payload.email,
        payload.role_id,
        Some(id),
    )
    .await?;
    errors.into_result()?;

    let user = User::update(&state.db, id, &payload.name, &payload.email, payload.role_id)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    info!(user_id = id, "user updated");
    Ok(Json(user.into()))
}

/// PUT /users/changepassword/:id
#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut errors = FieldErrors::new();
    check_length(&mut errors, "password", &payload.password, 6, 20);
    errors.into_result()?;

    let hash = hash_password(&payload.password)?;
    if !User::set_password(&state.db, id, &hash).await? {
        warn!(user_id = id, "change password for missing user");
        return Err(ApiError::NotFound("User not found"));
    }

    info!(user_id = id, "password changed");
    Ok(Json(MessageResponse {
        message: "Password changed successfully",
    }))
}

/// DELETE /users/delete/:id
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !User::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("User not found"));
    }
    info!(user_id = id, "user deleted");
    Ok(Json(MessageResponse {
        message: "User deleted successfully",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_payload(name: &str, email: &str) -> Json<RegisterRequest> {
        Json(RegisterRequest {
            name: name.into(),
            email: email.into(),
            password: "admin123".into(),
            role_id: 1,
        })
    }

    async fn user_count(db: &PgPool) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(db)
            .await
            .unwrap()
    }

    #[sqlx::test]
    async fn register_rejects_duplicate_name_and_email(db: PgPool) {
        let state = AppState::from_pool(db.clone());
        register(
            State(state.clone()),
            register_payload("admin", "admin@gmail.com"),
        )
        .await
        .expect("first registration");

        let err = register(
            State(state.clone()),
            register_payload("admin", "other@gmail.com"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = register(State(state), register_payload("other", "admin@gmail.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        // neither rejected attempt created a row
        assert_eq!(user_count(&db).await, 1);
    }

    #[sqlx::test]
    async fn register_rejects_unknown_role(db: PgPool) {
        let state = AppState::from_pool(db.clone());
        let mut payload = register_payload("admin", "admin@gmail.com");
        payload.0.role_id = 999;
        let err = register(State(state), payload).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(user_count(&db).await, 0);
    }

    #[sqlx::test]
    async fn get_all_users_on_empty_store_is_404(db: PgPool) {
        let state = AppState::from_pool(db);
        let err = get_all_users(State(state)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound("No users found")));
    }

    #[sqlx::test]
    async fn update_user_keeps_own_unchanged_values(db: PgPool) {
        let state = AppState::from_pool(db);
        let created = register(
            State(state.clone()),
            register_payload("admin", "admin@gmail.com"),
        )
        .await
        .expect("registration")
        .0
        .data;

        let updated = update_user(
            State(state),
            Path(created.id),
            Json(UpdateUserRequest {
                name: "admin".into(),
                email: "admin@gmail.com".into(),
                role_id: 2,
            }),
        )
        .await
        .expect("update with own unchanged name and email");
        assert_eq!(updated.0.role_id, 2);
    }

    #[sqlx::test]
    async fn delete_missing_user_is_404_and_store_unchanged(db: PgPool) {
        let state = AppState::from_pool(db.clone());
        register(
            State(state.clone()),
            register_payload("admin", "admin@gmail.com"),
        )
        .await
        .expect("registration");
        let err = delete_user(State(state), Path(999)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound("User not found")));
        assert_eq!(user_count(&db).await, 1);
    }
}
