use serde::{Deserialize, Serialize};

use crate::venue::repo::VenueSettings;

/// Save body for the settings form. Blank strings collapse to NULL so a
/// cleared field truly clears the stored value.
#[derive(Debug, Default, Deserialize)]
pub struct VenueSettingsPayload {
    #[serde(default)]
    pub instagram_url: Option<String>,
    #[serde(default)]
    pub facebook_url: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub hours: Option<String>,
    #[serde(default)]
    pub google_maps_url: Option<String>,
    #[serde(default)]
    pub embed_url: Option<String>,
    #[serde(default)]
    pub show_map_embed: bool,
    #[serde(default)]
    pub bar_name: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

fn clean(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

impl VenueSettingsPayload {
    pub fn into_settings(self) -> VenueSettings {
        VenueSettings {
            instagram_url: clean(self.instagram_url),
            facebook_url: clean(self.facebook_url),
            website_url: clean(self.website_url),
            address: clean(self.address),
            phone: clean(self.phone),
            email: clean(self.email),
            hours: clean(self.hours),
            google_maps_url: clean(self.google_maps_url),
            embed_url: clean(self.embed_url),
            show_map_embed: self.show_map_embed,
            bar_name: clean(self.bar_name),
            logo_url: clean(self.logo_url),
            ..VenueSettings::default()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LogoUploadResponse {
    pub logo_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_collapse_to_none() {
        let payload = VenueSettingsPayload {
            bar_name: Some("  The Copper Still  ".into()),
            phone: Some("   ".into()),
            ..Default::default()
        };
        let settings = payload.into_settings();
        assert_eq!(settings.bar_name.as_deref(), Some("The Copper Still"));
        assert!(settings.phone.is_none());
        assert_eq!(settings.id, "default");
    }
}
