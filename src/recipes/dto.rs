use serde::{Deserialize, Serialize};

use crate::recipes::repo::Recipe;

/// Request body for both add and update: a full replace, all four fields
/// required every time.
#[derive(Debug, Deserialize)]
pub struct RecipeRequest {
    pub recipe_name: String,
    pub description: String,
    pub subtitle: String,
    pub image: String,
}

#[derive(Debug, Serialize)]
pub struct AddRecipeResponse {
    pub status: bool,
    pub message: &'static str,
    pub data: Recipe,
}

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub recipe: Recipe,
}

#[derive(Debug, Serialize)]
pub struct RecipeListResponse {
    pub recipes: Vec<Recipe>,
}
