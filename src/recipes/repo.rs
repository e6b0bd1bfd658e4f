use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

/// Recipe record. The table is named `recipe` (singular), matching the
/// schema existing clients were built against.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub recipe_name: String,
    pub description: String,
    pub subtitle: String,
    pub image: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

const RECIPE_COLUMNS: &str =
    "id, recipe_name, description, subtitle, image, created_at, updated_at";

impl Recipe {
    pub async fn create(
        db: &PgPool,
        recipe_name: &str,
        description: &str,
        subtitle: &str,
        image: &str,
    ) -> sqlx::Result<Recipe> {
        sqlx::query_as::<_, Recipe>(&format!(
            r#"
            INSERT INTO recipe (recipe_name, description, subtitle, image)
            VALUES ($1, $2, $3, $4)
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(recipe_name)
        .bind(description)
        .bind(subtitle)
        .bind(image)
        .fetch_one(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: i64) -> sqlx::Result<Option<Recipe>> {
        sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipe WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn find_all(db: &PgPool) -> sqlx::Result<Vec<Recipe>> {
        sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipe ORDER BY id"
        ))
        .fetch_all(db)
        .await
    }

    /// Most recently created recipe; equal timestamps break toward the
    /// highest id so the result is deterministic.
    pub async fn find_latest(db: &PgPool) -> sqlx::Result<Option<Recipe>> {
        sqlx::query_as::<_, Recipe>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipe ORDER BY created_at DESC, id DESC LIMIT 1"
        ))
        .fetch_optional(db)
        .await
    }

    /// Full replace of the four mutable fields.
    pub async fn update(
        db: &PgPool,
        id: i64,
        recipe_name: &str,
        description: &str,
        subtitle: &str,
        image: &str,
    ) -> sqlx::Result<Option<Recipe>> {
        sqlx::query_as::<_, Recipe>(&format!(
            r#"
            UPDATE recipe
            SET recipe_name = $1, description = $2, subtitle = $3, image = $4,
                updated_at = now()
            WHERE id = $5
            RETURNING {RECIPE_COLUMNS}
            "#
        ))
        .bind(recipe_name)
        .bind(description)
        .bind(subtitle)
        .bind(image)
        .bind(id)
        .fetch_optional(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: i64) -> sqlx::Result<bool> {
        let res = sqlx::query("DELETE FROM recipe WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// Uniqueness probe; `exclude` skips the record being updated.
    pub async fn name_taken(db: &PgPool, name: &str, exclude: Option<i64>) -> sqlx::Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM recipe WHERE recipe_name = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(name)
        .bind(exclude)
        .fetch_one(db)
        .await
    }
}
