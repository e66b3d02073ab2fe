use crate::state::AppState;
use axum::Router;

pub mod handlers;
pub mod render;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
