use serde::{Deserialize, Serialize};
use sqlx::types::Decimal;
use uuid::Uuid;

use crate::error::AppError;
use crate::menu::view::{
    AvailabilityFilter, CategoryCount, DietFilter, ItemView, MenuFilter, MenuView,
};
use crate::menu::repo::{AlcoholItem, FoodItem};
use crate::promotions::Promotion;
use crate::venue::repo::VenueSettings;

/// Closed preset lists offered next to the free-text category field.
pub const FOOD_CATEGORY_PRESETS: [&str; 6] = [
    "Starters",
    "Main Course",
    "Breakfast",
    "Desserts",
    "Snacks",
    "Beverages",
];
pub const ALCOHOL_CATEGORY_PRESETS: [&str; 6] = [
    "Premium Spirits",
    "Whiskey",
    "Wines",
    "Beer",
    "Cocktails",
    "Rum",
];

fn default_true() -> bool {
    true
}

/// Create/update body for a food item; forms submit the whole record.
#[derive(Debug, Deserialize)]
pub struct FoodItemPayload {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub vegetarian: bool,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub featured: Option<bool>,
}

impl FoodItemPayload {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name is required".into()));
        }
        if self.category.trim().is_empty() {
            return Err(AppError::Validation("category is required".into()));
        }
        if self.price < Decimal::ZERO {
            return Err(AppError::Validation("price must be non-negative".into()));
        }
        Ok(())
    }
}

/// Create/update body for an alcohol item. Each pour price is independent
/// and optional.
#[derive(Debug, Deserialize)]
pub struct AlcoholItemPayload {
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    pub category: String,
    #[serde(default)]
    pub price_30ml: Option<Decimal>,
    #[serde(default)]
    pub price_60ml: Option<Decimal>,
    #[serde(default)]
    pub price_90ml: Option<Decimal>,
    #[serde(default)]
    pub price_180ml: Option<Decimal>,
    #[serde(default)]
    pub price_bottle: Option<Decimal>,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub featured: Option<bool>,
}

impl AlcoholItemPayload {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name is required".into()));
        }
        if self.category.trim().is_empty() {
            return Err(AppError::Validation("category is required".into()));
        }
        let pours = [
            ("30ml", self.price_30ml),
            ("60ml", self.price_60ml),
            ("90ml", self.price_90ml),
            ("180ml", self.price_180ml),
            ("bottle", self.price_bottle),
        ];
        for (label, price) in pours {
            if matches!(price, Some(p) if p < Decimal::ZERO) {
                return Err(AppError::Validation(format!(
                    "{label} price must be non-negative"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityUpdate {
    pub available: bool,
}

/// Arbitrary subset of currently visible items plus the target state.
#[derive(Debug, Deserialize)]
pub struct BulkAvailabilityRequest {
    pub ids: Vec<Uuid>,
    pub available: bool,
}

#[derive(Debug, Serialize)]
pub struct BulkAvailabilityResponse {
    pub updated: u64,
    pub available: bool,
}

#[derive(Debug, Deserialize)]
pub struct AdminListQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub diet: Option<DietFilter>,
    #[serde(default)]
    pub availability: Option<AvailabilityFilter>,
}

impl AdminListQuery {
    pub fn to_filter(&self) -> MenuFilter {
        MenuFilter {
            category: self.category.clone(),
            diet: self.diet.unwrap_or_default(),
            availability: self.availability.unwrap_or_default(),
            query: self.q.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdminFoodList {
    pub items: Vec<FoodItem>,
    pub categories: Vec<CategoryCount>,
}

#[derive(Debug, Serialize)]
pub struct AdminAlcoholList {
    pub items: Vec<AlcoholItem>,
    pub categories: Vec<CategoryCount>,
}

#[derive(Debug, Serialize)]
pub struct CategoryPresets {
    pub food: Vec<&'static str>,
    pub alcohol: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct PublicMenuQuery {
    #[serde(default)]
    pub view: Option<MenuView>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub diet: Option<DietFilter>,
}

#[derive(Debug, Serialize)]
pub struct BucketView {
    pub title: String,
    pub promotions: Vec<Promotion>,
    pub items: Vec<ItemView>,
}

#[derive(Debug, Serialize)]
pub struct MenuPage {
    pub view: MenuView,
    pub venue: VenueSettings,
    pub categories: Vec<CategoryCount>,
    pub buckets: Vec<BucketView>,
}
