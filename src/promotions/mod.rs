use crate::state::AppState;
use axum::Router;

pub mod handlers;
pub mod presets;
pub mod repo;
pub mod service;

pub use presets::{Promotion, PromotionCategory};

pub fn router() -> Router<AppState> {
    handlers::routes()
}
