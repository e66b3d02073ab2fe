use crate::state::AppState;
use axum::Router;

pub mod debounce;
pub mod dto;
pub mod handlers;
pub mod repo;
pub mod view;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
