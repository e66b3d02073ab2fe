use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromotionCategory {
    Beer,
    Food,
    Drinks,
    Alcohol,
    General,
}

impl PromotionCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            PromotionCategory::Beer => "beer",
            PromotionCategory::Food => "food",
            PromotionCategory::Drinks => "drinks",
            PromotionCategory::Alcohol => "alcohol",
            PromotionCategory::General => "general",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "beer" => Some(PromotionCategory::Beer),
            "food" => Some(PromotionCategory::Food),
            "drinks" => Some(PromotionCategory::Drinks),
            "alcohol" => Some(PromotionCategory::Alcohol),
            "general" => Some(PromotionCategory::General),
            _ => None,
        }
    }
}

/// Ready-made promotion definition. Presets exist independently of the
/// record store and are only ever flipped active/inactive at runtime.
#[derive(Debug, Clone, Copy)]
pub struct PresetPromotion {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: PromotionCategory,
}

pub const PRESET_PROMOTIONS: [PresetPromotion; 5] = [
    PresetPromotion {
        key: "buy2_beer_get1_free",
        title: "Buy 2 Beer, Get 1 Free",
        description: "Order any two beers and get the third beer free of equal or lesser value.",
        category: PromotionCategory::Beer,
    },
    PresetPromotion {
        key: "happy_hour_beer_5to7",
        title: "Happy Hour Beer (5–7 PM)",
        description: "Flat 20% off on all beers during happy hours.",
        category: PromotionCategory::Beer,
    },
    PresetPromotion {
        key: "buy3_large_pizza_pay2",
        title: "Buy 3 Large Pizza, Pay for 2",
        description: "Get one large pizza free when you order three.",
        category: PromotionCategory::Food,
    },
    PresetPromotion {
        key: "combo_whiskey_starter",
        title: "Whiskey + Starter Combo",
        description: "Flat ₹200 off when ordering any whiskey with a starter.",
        category: PromotionCategory::Alcohol,
    },
    PresetPromotion {
        key: "welcome_drink_weekend",
        title: "Weekend Welcome Drink",
        description: "One complimentary mocktail for every dine-in group on weekends.",
        category: PromotionCategory::General,
    },
];

pub fn preset_by_key(key: &str) -> Option<&'static PresetPromotion> {
    PRESET_PROMOTIONS.iter().find(|p| p.key == key)
}

/// A promotion as shown to clients: preset definition, possibly overlaid
/// with record-store text, plus the runtime active flag.
#[derive(Debug, Clone, Serialize)]
pub struct Promotion {
    pub key: String,
    pub title: String,
    pub description: String,
    pub category: PromotionCategory,
    pub active: bool,
}

impl From<&PresetPromotion> for Promotion {
    fn from(p: &PresetPromotion) -> Self {
        Promotion {
            key: p.key.to_string(),
            title: p.title.to_string(),
            description: p.description.to_string(),
            category: p.category,
            active: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_lookup() {
        let p = preset_by_key("happy_hour_beer_5to7").expect("preset exists");
        assert_eq!(p.category, PromotionCategory::Beer);
        assert!(preset_by_key("no_such_key").is_none());
    }

    #[test]
    fn category_roundtrip() {
        for cat in [
            PromotionCategory::Beer,
            PromotionCategory::Food,
            PromotionCategory::Drinks,
            PromotionCategory::Alcohol,
            PromotionCategory::General,
        ] {
            assert_eq!(PromotionCategory::parse(cat.as_str()), Some(cat));
        }
        assert_eq!(PromotionCategory::parse("wine"), None);
    }
}
