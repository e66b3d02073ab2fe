use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use tracing::warn;

use crate::local_store::{read_json, write_json, LocalStore};

/// The one logically active settings row.
pub const DEFAULT_VENUE_ID: &str = "default";
pub const VENUE_SETTINGS_KEY: &str = "venue_settings";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VenueSettings {
    pub id: String,
    pub instagram_url: Option<String>,
    pub facebook_url: Option<String>,
    pub website_url: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub hours: Option<String>,
    pub google_maps_url: Option<String>,
    pub embed_url: Option<String>,
    pub show_map_embed: bool,
    pub bar_name: Option<String>,
    pub logo_url: Option<String>,
    pub updated_at: Option<OffsetDateTime>,
}

impl Default for VenueSettings {
    fn default() -> Self {
        Self {
            id: DEFAULT_VENUE_ID.to_string(),
            instagram_url: None,
            facebook_url: None,
            website_url: None,
            address: None,
            phone: None,
            email: None,
            hours: None,
            google_maps_url: None,
            embed_url: None,
            show_map_embed: false,
            bar_name: None,
            logo_url: None,
            updated_at: None,
        }
    }
}

const VENUE_COLUMNS: &str = "id, instagram_url, facebook_url, website_url, address, phone, email, \
                             hours, google_maps_url, embed_url, show_map_embed, bar_name, \
                             logo_url, updated_at";

async fn fetch_remote(db: &PgPool) -> anyhow::Result<Option<VenueSettings>> {
    let row = sqlx::query_as::<_, VenueSettings>(&format!(
        "SELECT {VENUE_COLUMNS} FROM venue_settings WHERE id = $1"
    ))
    .bind(DEFAULT_VENUE_ID)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Remote-first read. A reachable row is mirrored to the local store; an
/// unreachable store or a missing row means "use the fallback", never an
/// error.
pub async fn load(db: &PgPool, local: &dyn LocalStore) -> VenueSettings {
    match fetch_remote(db).await {
        Ok(Some(settings)) => {
            write_json(local, VENUE_SETTINGS_KEY, &settings);
            settings
        }
        Ok(None) => read_json(local, VENUE_SETTINGS_KEY).unwrap_or_default(),
        Err(e) => {
            warn!(error = %e, "venue settings fetch failed; using local fallback");
            read_json(local, VENUE_SETTINGS_KEY).unwrap_or_default()
        }
    }
}

/// Wholesale upsert keyed on the fixed identity; writes overwrite, never
/// append. The local mirror follows a successful remote write.
pub async fn save(
    db: &PgPool,
    local: &dyn LocalStore,
    mut settings: VenueSettings,
) -> anyhow::Result<VenueSettings> {
    settings.id = DEFAULT_VENUE_ID.to_string();
    settings.updated_at = Some(OffsetDateTime::now_utc());

    sqlx::query(
        r#"
        INSERT INTO venue_settings (id, instagram_url, facebook_url, website_url, address,
                                    phone, email, hours, google_maps_url, embed_url,
                                    show_map_embed, bar_name, logo_url, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        ON CONFLICT (id) DO UPDATE SET
            instagram_url = EXCLUDED.instagram_url,
            facebook_url = EXCLUDED.facebook_url,
            website_url = EXCLUDED.website_url,
            address = EXCLUDED.address,
            phone = EXCLUDED.phone,
            email = EXCLUDED.email,
            hours = EXCLUDED.hours,
            google_maps_url = EXCLUDED.google_maps_url,
            embed_url = EXCLUDED.embed_url,
            show_map_embed = EXCLUDED.show_map_embed,
            bar_name = EXCLUDED.bar_name,
            logo_url = EXCLUDED.logo_url,
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(&settings.id)
    .bind(&settings.instagram_url)
    .bind(&settings.facebook_url)
    .bind(&settings.website_url)
    .bind(&settings.address)
    .bind(&settings.phone)
    .bind(&settings.email)
    .bind(&settings.hours)
    .bind(&settings.google_maps_url)
    .bind(&settings.embed_url)
    .bind(settings.show_map_embed)
    .bind(&settings.bar_name)
    .bind(&settings.logo_url)
    .bind(settings.updated_at)
    .execute(db)
    .await?;

    write_json(local, VENUE_SETTINGS_KEY, &settings);
    Ok(settings)
}
