use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod query;
pub mod repo;
pub mod repo_types;

pub fn router() -> Router<AppState> {
    handlers::expense_routes()
}
