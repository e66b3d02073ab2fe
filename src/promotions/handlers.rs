use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    auth::AdminUser,
    error::AppError,
    promotions::{
        presets::Promotion,
        service::{self, PersistTarget},
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/promotions", get(list_active))
        .route("/admin/promotions", get(admin_list))
        .route("/admin/promotions/:key/active", put(set_active))
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub active: bool,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub key: String,
    pub title: String,
    pub active: bool,
    pub persisted: &'static str,
}

/// Active promotions for the public menu page.
#[instrument(skip(state))]
pub async fn list_active(State(state): State<AppState>) -> Json<Vec<Promotion>> {
    Json(service::active_promotions(&state.db, state.local.as_ref()).await)
}

/// Every preset with overlay and active flags, for the manager screen.
#[instrument(skip(state))]
pub async fn admin_list(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Json<Vec<Promotion>> {
    Json(service::list_merged(&state.db, state.local.as_ref()).await)
}

#[instrument(skip(state))]
pub async fn set_active(
    State(state): State<AppState>,
    AdminUser(user_id): AdminUser,
    Path(key): Path<String>,
    Json(body): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, AppError> {
    let (promotion, target) =
        service::set_active(&state.db, state.local.as_ref(), &key, body.active).await?;

    info!(
        user_id = %user_id,
        key = %promotion.key,
        active = body.active,
        persisted = ?target,
        "promotion toggled"
    );
    Ok(Json(ToggleResponse {
        key: promotion.key,
        title: promotion.title,
        active: promotion.active,
        persisted: match target {
            PersistTarget::Remote => "remote",
            PersistTarget::Local => "local",
        },
    }))
}
