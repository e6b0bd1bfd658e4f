use serde::{Deserialize, Serialize};

use crate::users::dto::PublicUser;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user_id: i64,
    pub user_info: PublicUser,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn login_response_has_expected_keys() {
        let now = OffsetDateTime::now_utc();
        let response = LoginResponse {
            message: "User logged in successfully",
            user_id: 1,
            user_info: PublicUser {
                id: 1,
                name: "superadmin".into(),
                email: "superadmin@gmail.com".into(),
                role_id: 1,
                created_at: now,
                updated_at: now,
                role: None,
            },
            token: "abc".into(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["user_id"], 1);
        assert_eq!(json["user_info"]["email"], "superadmin@gmail.com");
        assert_eq!(json["token"], "abc");
        // the password hash must never serialize
        assert!(json["user_info"].get("password_hash").is_none());
    }
}
