use std::collections::{HashMap, HashSet};

use sqlx::PgPool;
use tracing::warn;

use crate::error::AppError;
use crate::local_store::{read_json, write_json, LocalStore};
use crate::promotions::presets::{preset_by_key, Promotion, PromotionCategory, PRESET_PROMOTIONS};
use crate::promotions::repo::{self, PromotionRow};

pub const ACTIVE_PROMOTIONS_KEY: &str = "active_promotions";

/// Where a promotion toggle ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistTarget {
    Remote,
    Local,
}

/// Overlay record-store rows onto the presets. Remote active flags win
/// when any row is active; otherwise the locally persisted keys apply.
fn merge(rows: Option<&[PromotionRow]>, local_active: &[String]) -> Vec<Promotion> {
    let by_key: HashMap<&str, &PromotionRow> = rows
        .unwrap_or_default()
        .iter()
        .map(|r| (r.key.as_str(), r))
        .collect();

    let remote_active: HashSet<&str> = rows
        .unwrap_or_default()
        .iter()
        .filter(|r| r.active)
        .map(|r| r.key.as_str())
        .collect();
    let active: HashSet<&str> = if remote_active.is_empty() {
        local_active.iter().map(|k| k.as_str()).collect()
    } else {
        remote_active
    };

    PRESET_PROMOTIONS
        .iter()
        .map(|p| {
            let row = by_key.get(p.key).copied();
            Promotion {
                key: p.key.to_string(),
                title: row.map_or_else(|| p.title.to_string(), |r| r.title.clone()),
                description: row
                    .map_or_else(|| p.description.to_string(), |r| r.description.clone()),
                category: row
                    .and_then(|r| PromotionCategory::parse(&r.category))
                    .unwrap_or(p.category),
                active: active.contains(p.key),
            }
        })
        .collect()
}

/// All preset promotions with overlay and active flags. A record-store
/// failure or an empty table means "use the local fallback", not an error.
pub async fn list_merged(db: &PgPool, local: &dyn LocalStore) -> Vec<Promotion> {
    let local_active: Vec<String> = read_json(local, ACTIVE_PROMOTIONS_KEY).unwrap_or_default();
    match repo::fetch_all(db).await {
        Ok(rows) => {
            let merged = merge(Some(&rows), &local_active);
            let remote_active: Vec<String> = rows
                .iter()
                .filter(|r| r.active)
                .map(|r| r.key.clone())
                .collect();
            if !remote_active.is_empty() {
                write_json(local, ACTIVE_PROMOTIONS_KEY, &remote_active);
            }
            merged
        }
        Err(e) => {
            warn!(error = %e, "promotions table not available; using local fallback");
            merge(None, &local_active)
        }
    }
}

pub async fn active_promotions(db: &PgPool, local: &dyn LocalStore) -> Vec<Promotion> {
    list_merged(db, local)
        .await
        .into_iter()
        .filter(|p| p.active)
        .collect()
}

/// Flip a preset's active flag. The local key set is updated first so the
/// flip holds even when the record store is down; the remote upsert is
/// keyed on `key` and therefore idempotent.
pub async fn set_active(
    db: &PgPool,
    local: &dyn LocalStore,
    key: &str,
    active: bool,
) -> Result<(Promotion, PersistTarget), AppError> {
    let preset = preset_by_key(key).ok_or(AppError::NotFound("promotion"))?;

    let mut keys: Vec<String> = read_json(local, ACTIVE_PROMOTIONS_KEY).unwrap_or_default();
    if active {
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
    } else {
        keys.retain(|k| k != key);
    }
    write_json(local, ACTIVE_PROMOTIONS_KEY, &keys);

    let mut promotion = Promotion::from(preset);
    promotion.active = active;

    let row = PromotionRow {
        key: preset.key.to_string(),
        title: preset.title.to_string(),
        description: preset.description.to_string(),
        category: preset.category.as_str().to_string(),
        active,
    };
    match repo::upsert(db, &row).await {
        Ok(()) => Ok((promotion, PersistTarget::Remote)),
        Err(e) => {
            warn!(key, error = %e, "promotions upsert failed; active state kept locally");
            Ok((promotion, PersistTarget::Local))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &str, title: &str, category: &str, active: bool) -> PromotionRow {
        PromotionRow {
            key: key.into(),
            title: title.into(),
            description: format!("{title} description"),
            category: category.into(),
            active,
        }
    }

    #[test]
    fn merge_without_rows_uses_local_active_keys() {
        let local = vec!["welcome_drink_weekend".to_string()];
        let merged = merge(None, &local);
        assert_eq!(merged.len(), PRESET_PROMOTIONS.len());
        let welcome = merged
            .iter()
            .find(|p| p.key == "welcome_drink_weekend")
            .unwrap();
        assert!(welcome.active);
        assert!(merged
            .iter()
            .filter(|p| p.key != "welcome_drink_weekend")
            .all(|p| !p.active));
    }

    #[test]
    fn remote_text_overlays_preset() {
        let rows = vec![row(
            "buy2_beer_get1_free",
            "Beer Bonanza",
            "beer",
            false,
        )];
        let merged = merge(Some(&rows), &[]);
        let beer = merged
            .iter()
            .find(|p| p.key == "buy2_beer_get1_free")
            .unwrap();
        assert_eq!(beer.title, "Beer Bonanza");
        // rows without an overlay keep the preset text
        let pizza = merged
            .iter()
            .find(|p| p.key == "buy3_large_pizza_pay2")
            .unwrap();
        assert_eq!(pizza.title, "Buy 3 Large Pizza, Pay for 2");
    }

    #[test]
    fn remote_active_flags_win_over_local() {
        let rows = vec![row("buy3_large_pizza_pay2", "Pizza Deal", "food", true)];
        let local = vec!["welcome_drink_weekend".to_string()];
        let merged = merge(Some(&rows), &local);
        assert!(merged
            .iter()
            .find(|p| p.key == "buy3_large_pizza_pay2")
            .unwrap()
            .active);
        // local key is ignored once any remote row is active
        assert!(!merged
            .iter()
            .find(|p| p.key == "welcome_drink_weekend")
            .unwrap()
            .active);
    }

    #[test]
    fn unparseable_remote_category_falls_back_to_preset() {
        let rows = vec![row("combo_whiskey_starter", "Combo", "spirits", false)];
        let merged = merge(Some(&rows), &[]);
        let combo = merged
            .iter()
            .find(|p| p.key == "combo_whiskey_starter")
            .unwrap();
        assert_eq!(combo.category, PromotionCategory::Alcohol);
    }
}
