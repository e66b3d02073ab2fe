use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, FromRow)]
pub struct PromotionRow {
    pub key: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub active: bool,
}

pub async fn fetch_all(db: &PgPool) -> anyhow::Result<Vec<PromotionRow>> {
    let rows = sqlx::query_as::<_, PromotionRow>(
        r#"
        SELECT key, title, description, category, active
        FROM promotions
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn upsert(db: &PgPool, row: &PromotionRow) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO promotions (key, title, description, category, active)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (key) DO UPDATE SET
            title = EXCLUDED.title,
            description = EXCLUDED.description,
            category = EXCLUDED.category,
            active = EXCLUDED.active
        "#,
    )
    .bind(&row.key)
    .bind(&row.title)
    .bind(&row.description)
    .bind(&row.category)
    .bind(row.active)
    .execute(db)
    .await?;
    Ok(())
}
