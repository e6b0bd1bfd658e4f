use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// User record in the database. The password hash never serializes.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role_id: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Static reference data; referenced by users, no timestamps.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Role {
    pub id: i64,
    pub role_name: String,
}

/// A user joined with its role, for the listing endpoints.
#[derive(Debug, Clone)]
pub struct UserWithRole {
    pub user: User,
    pub role: Role,
}

#[derive(FromRow)]
struct UserRoleRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    role_id: i64,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    role_name: String,
}

impl From<UserRoleRow> for UserWithRole {
    fn from(row: UserRoleRow) -> Self {
        Self {
            role: Role {
                id: row.role_id,
                role_name: row.role_name,
            },
            user: User {
                id: row.id,
                name: row.name,
                email: row.email,
                password_hash: row.password_hash,
                role_id: row.role_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
        }
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, role_id, created_at, updated_at";

impl User {
    /// Exact-match lookup, no case normalization.
    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    pub async fn find_with_role(db: &PgPool, id: i64) -> sqlx::Result<Option<UserWithRole>> {
        let row = sqlx::query_as::<_, UserRoleRow>(
            r#"
            SELECT u.id, u.name, u.email, u.password_hash, u.role_id,
                   u.created_at, u.updated_at, r.role_name
            FROM users u
            JOIN roles r ON r.id = u.role_id
            WHERE u.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(row.map(Into::into))
    }

    pub async fn list_with_roles(db: &PgPool) -> sqlx::Result<Vec<UserWithRole>> {
        let rows = sqlx::query_as::<_, UserRoleRow>(
            r#"
            SELECT u.id, u.name, u.email, u.password_hash, u.role_id,
                   u.created_at, u.updated_at, r.role_name
            FROM users u
            JOIN roles r ON r.id = u.role_id
            ORDER BY u.id
            "#,
        )
        .fetch_all(db)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
        role_id: i64,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, role_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role_id)
        .fetch_one(db)
        .await
    }

    /// Full replace of the mutable profile fields.
    pub async fn update(
        db: &PgPool,
        id: i64,
        name: &str,
        email: &str,
        role_id: i64,
    ) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = $1, email = $2, role_id = $3, updated_at = now()
            WHERE id = $4
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(email)
        .bind(role_id)
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn set_password(db: &PgPool, id: i64, password_hash: &str) -> sqlx::Result<bool> {
        let res =
            sqlx::query("UPDATE users SET password_hash = $1, updated_at = now() WHERE id = $2")
                .bind(password_hash)
                .bind(id)
                .execute(db)
                .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Hard delete; tokens go with the user via ON DELETE CASCADE.
    pub async fn delete(db: &PgPool, id: i64) -> sqlx::Result<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Uniqueness probe. `exclude` skips the record being updated so an
    /// unchanged name does not collide with itself.
    pub async fn name_taken(db: &PgPool, name: &str, exclude: Option<i64>) -> sqlx::Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(exclude)
        .fetch_one(db)
        .await
    }

    pub async fn email_taken(db: &PgPool, email: &str, exclude: Option<i64>) -> sqlx::Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(email)
        .bind(exclude)
        .fetch_one(db)
        .await
    }
}

impl Role {
    /// Existence is checked at user creation/update time only.
    pub async fn exists(db: &PgPool, id: i64) -> sqlx::Result<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM roles WHERE id = $1)")
            .bind(id)
            .fetch_one(db)
            .await
    }
}
