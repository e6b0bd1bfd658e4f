use axum::Router;

use crate::state::AppState;

pub mod bearer;
pub mod dto;
pub mod handlers;
pub mod password;
pub mod token;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
