use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::types::Decimal;
use uuid::Uuid;

use crate::menu::repo::{AlcoholItem, FoodItem};
use crate::promotions::{Promotion, PromotionCategory};

/// Sentinel bucket for items with an empty or missing category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A food or alcohol record in a shared rendering path. The explicit kind
/// tag replaces field-presence sniffing on the two record shapes.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MenuEntry {
    Food(FoodItem),
    Alcohol(AlcoholItem),
}

impl MenuEntry {
    pub fn id(&self) -> Uuid {
        match self {
            MenuEntry::Food(f) => f.id,
            MenuEntry::Alcohol(a) => a.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            MenuEntry::Food(f) => &f.name,
            MenuEntry::Alcohol(a) => &a.name,
        }
    }

    pub fn category(&self) -> &str {
        match self {
            MenuEntry::Food(f) => &f.category,
            MenuEntry::Alcohol(a) => &a.category,
        }
    }

    pub fn available(&self) -> bool {
        match self {
            MenuEntry::Food(f) => f.available,
            MenuEntry::Alcohol(a) => a.available,
        }
    }

    pub fn tags(&self) -> &[String] {
        match self {
            MenuEntry::Food(f) => f.tags.as_deref().unwrap_or(&[]),
            MenuEntry::Alcohol(a) => a.tags.as_deref().unwrap_or(&[]),
        }
    }

    /// None for entries the dietary dimension does not apply to.
    pub fn vegetarian(&self) -> Option<bool> {
        match self {
            MenuEntry::Food(f) => Some(f.vegetarian),
            MenuEntry::Alcohol(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuView {
    Food,
    Drinks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DietFilter {
    #[default]
    All,
    Veg,
    NonVeg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityFilter {
    #[default]
    All,
    Available,
    Unavailable,
}

/// The three filter dimensions plus the search query. Dimensions AND
/// together; an "all" value is the same as removing that predicate, so
/// application is idempotent and order-independent.
#[derive(Debug, Clone, Default)]
pub struct MenuFilter {
    /// Selected category chip, or None for all.
    pub category: Option<String>,
    /// Food-only dimension; alcohol entries pass regardless.
    pub diet: DietFilter,
    /// Admin-only dimension; the public menu pins this to Available.
    pub availability: AvailabilityFilter,
    pub query: String,
}

impl MenuFilter {
    pub fn passes(&self, entry: &MenuEntry) -> bool {
        self.passes_category(entry)
            && self.passes_diet(entry)
            && self.passes_availability(entry)
            && self.matches_query(entry)
    }

    pub fn apply(&self, entries: &[MenuEntry]) -> Vec<MenuEntry> {
        entries.iter().filter(|e| self.passes(e)).cloned().collect()
    }

    fn passes_category(&self, entry: &MenuEntry) -> bool {
        match &self.category {
            None => true,
            Some(c) => normalized_category(entry.category()) == c,
        }
    }

    fn passes_diet(&self, entry: &MenuEntry) -> bool {
        match self.diet {
            DietFilter::All => true,
            DietFilter::Veg => entry.vegetarian().unwrap_or(true),
            DietFilter::NonVeg => entry.vegetarian().map(|v| !v).unwrap_or(true),
        }
    }

    fn passes_availability(&self, entry: &MenuEntry) -> bool {
        match self.availability {
            AvailabilityFilter::All => true,
            AvailabilityFilter::Available => entry.available(),
            AvailabilityFilter::Unavailable => !entry.available(),
        }
    }

    fn matches_query(&self, entry: &MenuEntry) -> bool {
        let q = self.query.trim();
        if q.is_empty() {
            return true;
        }
        let q = q.to_lowercase();
        entry.name().to_lowercase().contains(&q)
            || entry.tags().iter().any(|t| t.to_lowercase().contains(&q))
    }
}

fn normalized_category(raw: &str) -> &str {
    if raw.trim().is_empty() {
        UNCATEGORIZED
    } else {
        raw
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Bucket {
    pub title: String,
    pub entries: Vec<MenuEntry>,
}

/// Partition entries into buckets keyed by category, preserving first-seen
/// category order. Category values match exactly (case-sensitive); blank
/// categories land in the sentinel bucket. No entry is dropped or
/// duplicated.
pub fn group_by_category(entries: Vec<MenuEntry>) -> Vec<Bucket> {
    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, Vec<MenuEntry>> = HashMap::new();
    for entry in entries {
        let title = normalized_category(entry.category()).to_string();
        if !grouped.contains_key(&title) {
            order.push(title.clone());
        }
        grouped.entry(title).or_default().push(entry);
    }
    order
        .into_iter()
        .map(|title| Bucket {
            entries: grouped.remove(&title).unwrap_or_default(),
            title,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

/// Per-chip counts. Candidate categories come from the full entry list in
/// first-seen order; each count applies every predicate except the
/// category selection, and zero-count categories stay in the list so the
/// chip row can render "CategoryName (0)".
pub fn category_counts(entries: &[MenuEntry], filter: &MenuFilter) -> Vec<CategoryCount> {
    let relaxed = MenuFilter {
        category: None,
        ..filter.clone()
    };
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for entry in entries {
        let name = normalized_category(entry.category());
        if !counts.contains_key(name) {
            order.push(name.to_string());
            counts.insert(name.to_string(), 0);
        }
        if relaxed.passes(entry) {
            if let Some(c) = counts.get_mut(name) {
                *c += 1;
            }
        }
    }
    order
        .into_iter()
        .map(|name| CategoryCount {
            count: counts.get(&name).copied().unwrap_or(0),
            name,
        })
        .collect()
}

/// Fixed association rules between active promotions and a bucket:
/// `general` applies everywhere; `food` applies on the food view; `alcohol`
/// and `drinks` apply on the drinks view unconditionally; `beer` applies to
/// buckets whose title contains "beer" case-insensitively. No other
/// combination associates.
pub fn promotions_for_bucket(
    promotions: &[Promotion],
    view: MenuView,
    bucket_title: &str,
) -> Vec<Promotion> {
    let title_lower = bucket_title.to_lowercase();
    promotions
        .iter()
        .filter(|p| match p.category {
            PromotionCategory::General => true,
            PromotionCategory::Food => view == MenuView::Food,
            PromotionCategory::Alcohol | PromotionCategory::Drinks => view == MenuView::Drinks,
            PromotionCategory::Beer => title_lower.contains("beer"),
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceLine {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'static str>,
    pub display: String,
}

pub fn format_price(amount: Decimal) -> String {
    format!("₹{amount}")
}

/// Price points present on an alcohol item, in fixed pour-size order.
/// Absent sizes are omitted, never shown as zero or blank.
pub fn pour_prices(item: &AlcoholItem) -> Vec<PriceLine> {
    let pours = [
        ("30ml", item.price_30ml),
        ("60ml", item.price_60ml),
        ("90ml", item.price_90ml),
        ("180ml", item.price_180ml),
        ("Bottle", item.price_bottle),
    ];
    pours
        .into_iter()
        .filter_map(|(label, price)| {
            price.map(|p| PriceLine {
                label: Some(label),
                display: format_price(p),
            })
        })
        .collect()
}

#[derive(Debug, Serialize)]
pub struct ItemView {
    pub id: Uuid,
    pub kind: &'static str,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vegetarian: Option<bool>,
    pub tags: Vec<String>,
    pub featured: bool,
    pub prices: Vec<PriceLine>,
}

pub fn present(entry: &MenuEntry) -> ItemView {
    match entry {
        MenuEntry::Food(f) => ItemView {
            id: f.id,
            kind: "food",
            name: f.name.clone(),
            brand: None,
            description: f.description.clone(),
            vegetarian: Some(f.vegetarian),
            tags: f.tags.clone().unwrap_or_default(),
            featured: f.featured.unwrap_or(false),
            prices: vec![PriceLine {
                label: None,
                display: format_price(f.price),
            }],
        },
        MenuEntry::Alcohol(a) => ItemView {
            id: a.id,
            kind: "alcohol",
            name: a.name.clone(),
            brand: a.brand.clone(),
            description: None,
            vegetarian: None,
            tags: a.tags.clone().unwrap_or_default(),
            featured: a.featured.unwrap_or(false),
            prices: pour_prices(a),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn food(name: &str, category: &str, vegetarian: bool, available: bool) -> MenuEntry {
        MenuEntry::Food(FoodItem {
            id: Uuid::new_v4(),
            name: name.into(),
            category: category.into(),
            description: None,
            price: Decimal::new(350, 0),
            vegetarian,
            available,
            tags: None,
            featured: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        })
    }

    fn food_tagged(name: &str, category: &str, tags: &[&str]) -> MenuEntry {
        MenuEntry::Food(FoodItem {
            id: Uuid::new_v4(),
            name: name.into(),
            category: category.into(),
            description: None,
            price: Decimal::new(400, 0),
            vegetarian: true,
            available: true,
            tags: Some(tags.iter().map(|t| t.to_string()).collect()),
            featured: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        })
    }

    fn alcohol(name: &str, category: &str) -> AlcoholItem {
        AlcoholItem {
            id: Uuid::new_v4(),
            name: name.into(),
            brand: None,
            category: category.into(),
            price_30ml: None,
            price_60ml: None,
            price_90ml: None,
            price_180ml: None,
            price_bottle: None,
            available: true,
            tags: None,
            featured: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn promo(key: &str, category: PromotionCategory) -> Promotion {
        Promotion {
            key: key.into(),
            title: key.into(),
            description: String::new(),
            category,
            active: true,
        }
    }

    #[test]
    fn grouping_round_trip_loses_nothing() {
        let entries = vec![
            food("Paneer Tikka", "Starters", true, true),
            food("Grilled Chicken", "Main Course", false, true),
            food("Chicken Wings", "Starters", false, true),
            food("Mystery Dish", "", true, true),
            food("Pasta Alfredo", "Main Course", true, true),
        ];
        let names: Vec<String> = entries.iter().map(|e| e.name().to_string()).collect();

        let buckets = group_by_category(entries);
        let titles: Vec<&str> = buckets.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(titles, ["Starters", "Main Course", UNCATEGORIZED]);

        let mut flattened: Vec<String> = buckets
            .iter()
            .flat_map(|b| b.entries.iter().map(|e| e.name().to_string()))
            .collect();
        assert_eq!(flattened.len(), names.len());
        flattened.sort();
        let mut expected = names;
        expected.sort();
        assert_eq!(flattened, expected);
    }

    #[test]
    fn grouping_empty_input_yields_no_buckets() {
        assert!(group_by_category(Vec::new()).is_empty());
    }

    #[test]
    fn grouping_is_case_sensitive() {
        let buckets = group_by_category(vec![
            food("Idli", "breakfast", true, true),
            food("Dosa", "Breakfast", true, true),
        ]);
        assert_eq!(buckets.len(), 2);
    }

    #[test]
    fn blank_query_is_a_no_op() {
        let entries = vec![
            food("Classic Mojito", "Cocktails", true, true),
            food("Margarita", "Cocktails", true, true),
        ];
        for query in ["", "   ", "\t"] {
            let filter = MenuFilter {
                query: query.into(),
                ..Default::default()
            };
            assert_eq!(filter.apply(&entries).len(), entries.len());
        }
    }

    #[test]
    fn search_matches_name_substring_case_insensitively() {
        let entries = vec![
            food("Classic Mojito", "Cocktails", true, true),
            food("Margarita", "Cocktails", true, true),
        ];
        let filter = MenuFilter {
            query: "MOJ".into(),
            ..Default::default()
        };
        let got = filter.apply(&entries);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].name(), "Classic Mojito");
    }

    #[test]
    fn search_matches_tags() {
        let entries = vec![
            food_tagged("Paneer Tikka", "Starters", &["spicy", "vegan"]),
            food_tagged("Bruschetta", "Starters", &["gluten_free"]),
        ];
        let filter = MenuFilter {
            query: "Spicy".into(),
            ..Default::default()
        };
        let got = filter.apply(&entries);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].name(), "Paneer Tikka");
    }

    #[test]
    fn filters_are_idempotent() {
        let entries = vec![
            food("Idli", "Breakfast", true, true),
            food("Omelette", "Breakfast", false, false),
            food("Paneer Tikka", "Starters", true, true),
        ];
        let filter = MenuFilter {
            category: Some("Breakfast".into()),
            diet: DietFilter::Veg,
            availability: AvailabilityFilter::Available,
            query: String::new(),
        };
        let once = filter.apply(&entries);
        let twice = filter.apply(&once);
        assert_eq!(
            once.iter().map(MenuEntry::id).collect::<Vec<_>>(),
            twice.iter().map(MenuEntry::id).collect::<Vec<_>>()
        );
    }

    #[test]
    fn diet_filter_leaves_alcohol_untouched() {
        let entries = vec![
            food("Omelette", "Breakfast", false, true),
            MenuEntry::Alcohol(alcohol("Aged Rum", "Premium Spirits")),
        ];
        let veg = MenuFilter {
            diet: DietFilter::Veg,
            ..Default::default()
        };
        let got = veg.apply(&entries);
        assert_eq!(got.len(), 1);
        assert_eq!(got[0].name(), "Aged Rum");
    }

    #[test]
    fn public_view_hides_unavailable_items() {
        // available-only view of two breakfast items keeps just the one on sale
        let entries = vec![
            food("Idli", "Breakfast", true, true),
            food("Omelette", "Breakfast", false, false),
        ];
        let filter = MenuFilter {
            availability: AvailabilityFilter::Available,
            ..Default::default()
        };
        let buckets = group_by_category(filter.apply(&entries));
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].title, "Breakfast");
        assert_eq!(buckets[0].entries.len(), 1);
        assert_eq!(buckets[0].entries[0].name(), "Idli");
    }

    #[test]
    fn chip_counts_keep_empty_categories() {
        let entries = vec![
            food("Idli", "Breakfast", true, true),
            food("Omelette", "Breakfast", false, true),
            food("Paneer Tikka", "Starters", true, false),
        ];
        let filter = MenuFilter {
            availability: AvailabilityFilter::Available,
            ..Default::default()
        };
        let counts = category_counts(&entries, &filter);
        assert_eq!(
            counts,
            vec![
                CategoryCount {
                    name: "Breakfast".into(),
                    count: 2
                },
                CategoryCount {
                    name: "Starters".into(),
                    count: 0
                },
            ]
        );
        // while the bucket list drops the emptied category entirely
        let buckets = group_by_category(filter.apply(&entries));
        assert_eq!(buckets.len(), 1);
    }

    #[test]
    fn chip_counts_ignore_the_category_selection() {
        let entries = vec![
            food("Idli", "Breakfast", true, true),
            food("Paneer Tikka", "Starters", true, true),
        ];
        let filter = MenuFilter {
            category: Some("Breakfast".into()),
            ..Default::default()
        };
        let counts = category_counts(&entries, &filter);
        assert_eq!(counts.len(), 2);
        assert!(counts.iter().all(|c| c.count == 1));
    }

    #[test]
    fn general_promotions_attach_to_every_bucket() {
        let promos = vec![promo("welcome_drink_weekend", PromotionCategory::General)];
        for view in [MenuView::Food, MenuView::Drinks] {
            assert_eq!(promotions_for_bucket(&promos, view, "Anything").len(), 1);
        }
    }

    #[test]
    fn beer_promotions_match_bucket_titles_containing_beer() {
        let promos = vec![promo("buy2_beer_get1_free", PromotionCategory::Beer)];
        assert_eq!(
            promotions_for_bucket(&promos, MenuView::Drinks, "IPA Beer").len(),
            1
        );
        assert_eq!(
            promotions_for_bucket(&promos, MenuView::Drinks, "BEER & CIDER").len(),
            1
        );
        // title matching is the only rule for beer promotions
        assert!(promotions_for_bucket(&promos, MenuView::Drinks, "Lager").is_empty());
    }

    #[test]
    fn food_and_drinks_promotions_follow_the_view() {
        let food_promo = vec![promo("buy3_large_pizza_pay2", PromotionCategory::Food)];
        assert_eq!(
            promotions_for_bucket(&food_promo, MenuView::Food, "Starters").len(),
            1
        );
        assert!(promotions_for_bucket(&food_promo, MenuView::Drinks, "Starters").is_empty());

        let alcohol_promo = vec![promo("combo_whiskey_starter", PromotionCategory::Alcohol)];
        assert_eq!(
            promotions_for_bucket(&alcohol_promo, MenuView::Drinks, "Whiskey").len(),
            1
        );
        assert!(promotions_for_bucket(&alcohol_promo, MenuView::Food, "Whiskey").is_empty());
    }

    #[test]
    fn pour_prices_list_present_sizes_in_fixed_order() {
        let mut item = alcohol("Single Malt Whiskey", "Premium Spirits");
        item.price_60ml = Some(Decimal::new(250, 0));
        item.price_bottle = Some(Decimal::new(1800, 0));

        let prices = pour_prices(&item);
        assert_eq!(
            prices,
            vec![
                PriceLine {
                    label: Some("60ml"),
                    display: "₹250".into()
                },
                PriceLine {
                    label: Some("Bottle"),
                    display: "₹1800".into()
                },
            ]
        );
    }

    #[test]
    fn pour_prices_empty_when_no_size_is_priced() {
        let item = alcohol("Mystery Pour", "Specials");
        assert!(pour_prices(&item).is_empty());
    }

    #[test]
    fn presentation_tags_entries_with_their_kind() {
        let entry = food("Idli", "Breakfast", true, true);
        let view = present(&entry);
        assert_eq!(view.kind, "food");
        assert_eq!(view.prices.len(), 1);
        assert_eq!(view.prices[0].display, "₹350");

        let drink = MenuEntry::Alcohol(alcohol("Cosmopolitan", "Cocktails"));
        assert_eq!(present(&drink).kind, "alcohol");
    }
}
