use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use tracing::{info, instrument};

use crate::{
    auth::AdminUser,
    error::AppError,
    qr::render::{self, LogoOverlay, LogoShape, QrFormat, QrStyle},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/qr/export", post(export))
        .layer(DefaultBodyLimit::max(5 * 1024 * 1024))
}

/// Render the menu QR code with cosmetic customization and export it as an
/// image. Multipart fields: `url`, `format` (svg|png), `fg`/`bg` hex
/// colors, optional `logo` file with `logo_size`, `logo_padding`,
/// `logo_shape` (none|circle|square) and `logo_bg`.
#[instrument(skip(state, mp))]
pub async fn export(
    State(state): State<AppState>,
    AdminUser(user_id): AdminUser,
    mut mp: Multipart,
) -> Result<Response, AppError> {
    let mut url = format!("{}/menu", state.config.menu_base_url.trim_end_matches('/'));
    let mut format = QrFormat::default();
    let mut style = QrStyle::default();
    let mut logo: Option<LogoOverlay> = None;
    let mut logo_size: Option<f32> = None;
    let mut logo_padding: Option<u32> = None;
    let mut logo_shape: Option<LogoShape> = None;
    let mut logo_bg: Option<[u8; 3]> = None;

    while let Ok(Some(field)) = mp.next_field().await {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("url") => {
                let text = read_text(field).await?;
                if !text.trim().is_empty() {
                    url = text.trim().to_string();
                }
            }
            Some("format") => {
                let text = read_text(field).await?;
                format = QrFormat::parse(text.trim())
                    .ok_or_else(|| AppError::Validation(format!("unknown format {text}")))?;
            }
            Some("fg") => style.fg = read_color(field).await?,
            Some("bg") => style.bg = read_color(field).await?,
            Some("logo") => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".into());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable logo: {e}")))?;
                logo = Some(LogoOverlay::new(data.to_vec(), content_type));
            }
            Some("logo_size") => {
                let text = read_text(field).await?;
                let fraction = text
                    .trim()
                    .parse::<f32>()
                    .map_err(|_| AppError::Validation("logo_size must be a number".into()))?;
                logo_size = Some(fraction.clamp(0.05, 0.4));
            }
            Some("logo_padding") => {
                let text = read_text(field).await?;
                let px = text
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| AppError::Validation("logo_padding must be a number".into()))?;
                logo_padding = Some(px);
            }
            Some("logo_shape") => {
                let text = read_text(field).await?;
                logo_shape = Some(
                    LogoShape::parse(text.trim())
                        .ok_or_else(|| AppError::Validation(format!("unknown logo shape {text}")))?,
                );
            }
            Some("logo_bg") => logo_bg = Some(read_color(field).await?),
            _ => {}
        }
    }

    if let Some(mut overlay) = logo {
        if let Some(size) = logo_size {
            overlay.size = size;
        }
        if let Some(padding) = logo_padding {
            overlay.padding = padding;
        }
        if let Some(shape) = logo_shape {
            overlay.shape = shape;
        }
        if let Some(bg) = logo_bg {
            overlay.background = bg;
        }
        style.logo = Some(overlay);
    }

    info!(user_id = %user_id, url = %url, format = ?format, "qr export");
    let body: Response = match format {
        QrFormat::Svg => {
            let svg_data = render::render_svg(&url, &style).map_err(AppError::Internal)?;
            ([(header::CONTENT_TYPE, format.content_type())], svg_data).into_response()
        }
        QrFormat::Png => {
            let png = render::render_png(&url, &style).map_err(AppError::Internal)?;
            ([(header::CONTENT_TYPE, format.content_type())], png).into_response()
        }
    };
    Ok(body)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("unreadable field: {e}")))
}

async fn read_color(field: axum::extract::multipart::Field<'_>) -> Result<[u8; 3], AppError> {
    let text = read_text(field).await?;
    render::parse_hex_color(&text)
        .ok_or_else(|| AppError::Validation(format!("invalid color {text}")))
}
