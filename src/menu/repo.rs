use anyhow::Context;
use serde::{Deserialize, Serialize};
use sqlx::types::Decimal;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;
use crate::menu::dto::{AlcoholItemPayload, FoodItemPayload};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FoodItem {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub vegetarian: bool,
    pub available: bool,
    pub tags: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AlcoholItem {
    pub id: Uuid,
    pub name: String,
    pub brand: Option<String>,
    pub category: String,
    pub price_30ml: Option<Decimal>,
    pub price_60ml: Option<Decimal>,
    pub price_90ml: Option<Decimal>,
    pub price_180ml: Option<Decimal>,
    pub price_bottle: Option<Decimal>,
    pub available: bool,
    pub tags: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub created_at: OffsetDateTime,
}

const FOOD_COLUMNS: &str =
    "id, name, category, description, price, vegetarian, available, tags, featured, created_at";
const ALCOHOL_COLUMNS: &str = "id, name, brand, category, price_30ml, price_60ml, price_90ml, \
                               price_180ml, price_bottle, available, tags, featured, created_at";

impl FoodItem {
    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<FoodItem>> {
        let rows = sqlx::query_as::<_, FoodItem>(&format!(
            "SELECT {FOOD_COLUMNS} FROM food_menu ORDER BY category, name"
        ))
        .fetch_all(db)
        .await
        .context("list food items")?;
        Ok(rows)
    }

    pub async fn insert(db: &PgPool, p: &FoodItemPayload) -> anyhow::Result<FoodItem> {
        let item = sqlx::query_as::<_, FoodItem>(&format!(
            r#"
            INSERT INTO food_menu (name, category, description, price, vegetarian, available, tags, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {FOOD_COLUMNS}
            "#
        ))
        .bind(&p.name)
        .bind(&p.category)
        .bind(&p.description)
        .bind(p.price)
        .bind(p.vegetarian)
        .bind(p.available)
        .bind(&p.tags)
        .bind(p.featured)
        .fetch_one(db)
        .await
        .context("insert food item")?;
        Ok(item)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        p: &FoodItemPayload,
    ) -> anyhow::Result<Option<FoodItem>> {
        let item = sqlx::query_as::<_, FoodItem>(&format!(
            r#"
            UPDATE food_menu
            SET name = $2, category = $3, description = $4, price = $5,
                vegetarian = $6, available = $7, tags = $8, featured = $9
            WHERE id = $1
            RETURNING {FOOD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&p.name)
        .bind(&p.category)
        .bind(&p.description)
        .bind(p.price)
        .bind(p.vegetarian)
        .bind(p.available)
        .bind(&p.tags)
        .bind(p.featured)
        .fetch_optional(db)
        .await
        .context("update food item")?;
        Ok(item)
    }

    pub async fn set_available(
        db: &PgPool,
        id: Uuid,
        available: bool,
    ) -> anyhow::Result<Option<FoodItem>> {
        let item = sqlx::query_as::<_, FoodItem>(&format!(
            "UPDATE food_menu SET available = $2 WHERE id = $1 RETURNING {FOOD_COLUMNS}"
        ))
        .bind(id)
        .bind(available)
        .fetch_optional(db)
        .await
        .context("set food availability")?;
        Ok(item)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM food_menu WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("delete food item")?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn set_available_bulk(
        db: &PgPool,
        ids: &[Uuid],
        available: bool,
    ) -> Result<u64, AppError> {
        set_available_bulk_in("food_menu", db, ids, available).await
    }
}

impl AlcoholItem {
    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<AlcoholItem>> {
        let rows = sqlx::query_as::<_, AlcoholItem>(&format!(
            "SELECT {ALCOHOL_COLUMNS} FROM alcohol ORDER BY category, name"
        ))
        .fetch_all(db)
        .await
        .context("list alcohol items")?;
        Ok(rows)
    }

    pub async fn insert(db: &PgPool, p: &AlcoholItemPayload) -> anyhow::Result<AlcoholItem> {
        let item = sqlx::query_as::<_, AlcoholItem>(&format!(
            r#"
            INSERT INTO alcohol (name, brand, category, price_30ml, price_60ml, price_90ml,
                                 price_180ml, price_bottle, available, tags, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {ALCOHOL_COLUMNS}
            "#
        ))
        .bind(&p.name)
        .bind(&p.brand)
        .bind(&p.category)
        .bind(p.price_30ml)
        .bind(p.price_60ml)
        .bind(p.price_90ml)
        .bind(p.price_180ml)
        .bind(p.price_bottle)
        .bind(p.available)
        .bind(&p.tags)
        .bind(p.featured)
        .fetch_one(db)
        .await
        .context("insert alcohol item")?;
        Ok(item)
    }

    pub async fn update(
        db: &PgPool,
        id: Uuid,
        p: &AlcoholItemPayload,
    ) -> anyhow::Result<Option<AlcoholItem>> {
        let item = sqlx::query_as::<_, AlcoholItem>(&format!(
            r#"
            UPDATE alcohol
            SET name = $2, brand = $3, category = $4, price_30ml = $5, price_60ml = $6,
                price_90ml = $7, price_180ml = $8, price_bottle = $9, available = $10,
                tags = $11, featured = $12
            WHERE id = $1
            RETURNING {ALCOHOL_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&p.name)
        .bind(&p.brand)
        .bind(&p.category)
        .bind(p.price_30ml)
        .bind(p.price_60ml)
        .bind(p.price_90ml)
        .bind(p.price_180ml)
        .bind(p.price_bottle)
        .bind(p.available)
        .bind(&p.tags)
        .bind(p.featured)
        .fetch_optional(db)
        .await
        .context("update alcohol item")?;
        Ok(item)
    }

    pub async fn set_available(
        db: &PgPool,
        id: Uuid,
        available: bool,
    ) -> anyhow::Result<Option<AlcoholItem>> {
        let item = sqlx::query_as::<_, AlcoholItem>(&format!(
            "UPDATE alcohol SET available = $2 WHERE id = $1 RETURNING {ALCOHOL_COLUMNS}"
        ))
        .bind(id)
        .bind(available)
        .fetch_optional(db)
        .await
        .context("set alcohol availability")?;
        Ok(item)
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM alcohol WHERE id = $1")
            .bind(id)
            .execute(db)
            .await
            .context("delete alcohol item")?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn set_available_bulk(
        db: &PgPool,
        ids: &[Uuid],
        available: bool,
    ) -> Result<u64, AppError> {
        set_available_bulk_in("alcohol", db, ids, available).await
    }
}

/// One logical operation: every selected id flips or none do. A row-count
/// mismatch (stale selection, concurrent delete) rolls the whole update
/// back and surfaces as a partial-update error.
async fn set_available_bulk_in(
    table: &str,
    db: &PgPool,
    ids: &[Uuid],
    available: bool,
) -> Result<u64, AppError> {
    if ids.is_empty() {
        return Ok(0);
    }

    let mut tx = db.begin().await.context("begin bulk update").map_err(AppError::Internal)?;
    let res = sqlx::query(&format!(
        "UPDATE {table} SET available = $1 WHERE id = ANY($2)"
    ))
    .bind(available)
    .bind(ids)
    .execute(&mut *tx)
    .await
    .context("bulk availability update")
    .map_err(AppError::Internal)?;

    let updated = res.rows_affected();
    if updated as usize != ids.len() {
        tx.rollback()
            .await
            .context("rollback bulk update")
            .map_err(AppError::Internal)?;
        return Err(AppError::PartialUpdate {
            expected: ids.len(),
            updated: updated as usize,
        });
    }

    tx.commit()
        .await
        .context("commit bulk update")
        .map_err(AppError::Internal)?;
    Ok(updated)
}
