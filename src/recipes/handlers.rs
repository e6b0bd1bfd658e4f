use axum::extract::{Path, State};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use sqlx::PgPool;
use tracing::{info, instrument};

use crate::auth::dto::MessageResponse;
use crate::error::ApiError;
use crate::recipes::dto::{AddRecipeResponse, RecipeListResponse, RecipeRequest, RecipeResponse};
use crate::recipes::repo::Recipe;
use crate::state::AppState;
use crate::validate::{check_length, check_required, is_valid_url, FieldErrors};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recipe/add", post(add_recipe))
        .route("/recipe", get(get_all_recipes))
        .route("/recipe/:id", get(get_recipe))
        .route("/latestrecipe", get(get_latest_recipe))
        .route("/recipe/update/:id", put(update_recipe))
        .route("/recipe/delete/:id", delete(delete_recipe))
}

async fn validate_recipe(
    db: &PgPool,
    payload: &RecipeRequest,
    exclude: Option<i64>,
) -> Result<(), ApiError> {
    let mut errors = FieldErrors::new();
    check_required(&mut errors, "recipe_name", &payload.recipe_name);
    if errors.is_empty() && Recipe::name_taken(db, &payload.recipe_name, exclude).await? {
        errors.push("recipe_name", "The recipe_name has already been taken");
    }
    check_required(&mut errors, "description", &payload.description);
    if payload.description.chars().count() > 10000 {
        errors.push(
            "description",
            "The description must not be greater than 10000 characters",
        );
    }
    check_length(&mut errors, "subtitle", &payload.subtitle, 6, 50);
    if !is_valid_url(&payload.image) {
        errors.push("image", "The image must be a valid URL");
    }
    errors.into_result()
}

/// POST /recipe/add
#[instrument(skip(state, payload))]
pub async fn add_recipe(
    State(state): State<AppState>,
    Json(payload): Json<RecipeRequest>,
) -> Result<Json<AddRecipeResponse>, ApiError> {
    validate_recipe(&state.db, &payload, None).await?;

    let recipe = Recipe::create(
        &state.db,
        &payload.recipe_name,
        &payload.description,
        &payload.subtitle,
        &payload.image,
    )
    .await?;

    info!(recipe_id = recipe.id, "recipe added");
    Ok(Json(AddRecipeResponse {
        status: true,
        message: "New Recipe Registered successfully",
        data: recipe,
    }))
}

/// GET /recipe — an empty store is a 404, not an empty array.
#[instrument(skip(state))]
pub async fn get_all_recipes(
    State(state): State<AppState>,
) -> Result<Json<RecipeListResponse>, ApiError> {
    let recipes = Recipe::find_all(&state.db).await?;
    if recipes.is_empty() {
        return Err(ApiError::NotFound("No recipes found"));
    }
    Ok(Json(RecipeListResponse { recipes }))
}

/// GET /recipe/:id
#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let recipe = Recipe::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Recipe not found"))?;
    Ok(Json(RecipeResponse { recipe }))
}

/// GET /latestrecipe — the recipe with the maximum creation timestamp.
#[instrument(skip(state))]
pub async fn get_latest_recipe(
    State(state): State<AppState>,
) -> Result<Json<RecipeResponse>, ApiError> {
    let recipe = Recipe::find_latest(&state.db)
        .await?
        .ok_or(ApiError::NotFound("No recipes found"))?;
    Ok(Json(RecipeResponse { recipe }))
}

/// PUT /recipe/update/:id — existence first, then a full-replace validation
/// whose uniqueness check excludes the record itself. Returns the bare
/// updated record.
#[instrument(skip(state, payload))]
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<RecipeRequest>,
) -> Result<Json<Recipe>, ApiError> {
    if Recipe::find_by_id(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound("No recipe with that ID found"));
    }

    validate_recipe(&state.db, &payload, Some(id)).await?;

    let recipe = Recipe::update(
        &state.db,
        id,
        &payload.recipe_name,
        &payload.description,
        &payload.subtitle,
        &payload.image,
    )
    .await?
    .ok_or(ApiError::NotFound("No recipe with that ID found"))?;

    info!(recipe_id = id, "recipe updated");
    Ok(Json(recipe))
}

/// DELETE /recipe/delete/:id
#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !Recipe::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Recipe not found"));
    }
    info!(recipe_id = id, "recipe deleted");
    Ok(Json(MessageResponse {
        message: "Recipe deleted successfully",
    }))
}
