use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    auth::AdminUser,
    error::AppError,
    state::AppState,
    venue::dto::{LogoUploadResponse, VenueSettingsPayload},
    venue::repo::{self, VenueSettings},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/venue", get(public_venue))
        .route("/admin/venue", get(admin_venue).put(save_venue))
        .route("/admin/venue/logo", post(upload_logo))
        .layer(DefaultBodyLimit::max(5 * 1024 * 1024))
}

/// Contact card for the public menu page.
#[instrument(skip(state))]
pub async fn public_venue(State(state): State<AppState>) -> Json<VenueSettings> {
    Json(repo::load(&state.db, state.local.as_ref()).await)
}

#[instrument(skip(state))]
pub async fn admin_venue(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
) -> Json<VenueSettings> {
    Json(repo::load(&state.db, state.local.as_ref()).await)
}

#[instrument(skip(state, payload))]
pub async fn save_venue(
    State(state): State<AppState>,
    AdminUser(user_id): AdminUser,
    Json(payload): Json<VenueSettingsPayload>,
) -> Result<Json<VenueSettings>, AppError> {
    let settings = repo::save(&state.db, state.local.as_ref(), payload.into_settings())
        .await
        .map_err(|e| {
            error!(error = %e, "venue settings save failed");
            AppError::Internal(e)
        })?;
    info!(user_id = %user_id, "venue settings saved");
    Ok(Json(settings))
}

/// Logo upload: store the file, answer with its public URL. The URL lands
/// in the settings form and is persisted by the next save.
#[instrument(skip(state, mp))]
pub async fn upload_logo(
    State(state): State<AppState>,
    AdminUser(user_id): AdminUser,
    mut mp: Multipart,
) -> Result<Json<LogoUploadResponse>, AppError> {
    let mut upload: Option<(bytes::Bytes, String)> = None;
    while let Ok(Some(field)) = mp.next_field().await {
        let name = field.name().map(|s| s.to_string());
        if name.as_deref() == Some("logo") || name.as_deref() == Some("file") {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".into());
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("unreadable upload: {e}")))?;
            upload = Some((data, content_type));
        }
    }

    let Some((data, content_type)) = upload else {
        return Err(AppError::Validation("logo file is required".into()));
    };
    let Some(ext) = ext_from_mime(&content_type) else {
        return Err(AppError::Validation(format!(
            "unsupported logo content type {content_type}"
        )));
    };

    let key = format!("logos/{}.{}", Uuid::new_v4(), ext);
    state
        .storage
        .put_object(&key, data, &content_type)
        .await
        .map_err(|e| {
            error!(error = %e, key = %key, "logo upload failed");
            AppError::Internal(e)
        })?;

    let logo_url = state.storage.public_url(&key);
    info!(user_id = %user_id, key = %key, "logo uploaded");
    Ok(Json(LogoUploadResponse { logo_url }))
}

fn ext_from_mime(ct: &str) -> Option<&'static str> {
    match ct {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/svg+xml" => Some("svg"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ext_from_mime_accepts_images_only() {
        assert_eq!(ext_from_mime("image/jpeg"), Some("jpg"));
        assert_eq!(ext_from_mime("image/png"), Some("png"));
        assert_eq!(ext_from_mime("image/svg+xml"), Some("svg"));
        assert_eq!(ext_from_mime("application/pdf"), None);
    }
}
