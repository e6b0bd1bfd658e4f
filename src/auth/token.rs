use rand::distributions::Alphanumeric;
use rand::Rng;
use sqlx::PgPool;

/// Bearer tokens are opaque random strings; all meaning lives in the
/// `api_tokens` table. A user may hold several live tokens at once.
pub const TOKEN_LEN: usize = 48;

pub fn generate() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

/// Issue a fresh token bound to `user_id` and return its plaintext form.
pub async fn issue(db: &PgPool, user_id: i64) -> sqlx::Result<String> {
    let token = generate();
    sqlx::query("INSERT INTO api_tokens (user_id, token) VALUES ($1, $2)")
        .bind(user_id)
        .bind(&token)
        .execute(db)
        .await?;
    Ok(token)
}

pub async fn user_id_for(db: &PgPool, token: &str) -> sqlx::Result<Option<i64>> {
    sqlx::query_scalar::<_, i64>("SELECT user_id FROM api_tokens WHERE token = $1")
        .bind(token)
        .fetch_optional(db)
        .await
}

/// Invalidate one token. Returns false if it was not live.
pub async fn revoke(db: &PgPool, token: &str) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM api_tokens WHERE token = $1")
        .bind(token)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}
