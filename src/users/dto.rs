use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::users::repo::{Role, User, UserWithRole};

/// Public view of a user: everything except the password hash. The role is
/// present only on endpoints that expand it.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role_id: u.role_id,
            created_at: u.created_at,
            updated_at: u.updated_at,
            role: None,
        }
    }
}

impl From<UserWithRole> for PublicUser {
    fn from(u: UserWithRole) -> Self {
        let mut public = PublicUser::from(u.user);
        public.role = Some(u.role);
        public
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role_id: i64,
}

/// Full replace; all fields required even when unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub name: String,
    pub email: String,
    pub role_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub status: bool,
    pub message: &'static str,
    pub data: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<PublicUser>,
}
