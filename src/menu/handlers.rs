use anyhow::anyhow;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post, put},
    Json, Router,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    auth::AdminUser,
    error::AppError,
    menu::dto::{
        AdminAlcoholList, AdminFoodList, AdminListQuery, AlcoholItemPayload, AvailabilityUpdate,
        BucketView, BulkAvailabilityRequest, BulkAvailabilityResponse, CategoryPresets,
        FoodItemPayload, MenuPage, PublicMenuQuery, ALCOHOL_CATEGORY_PRESETS,
        FOOD_CATEGORY_PRESETS,
    },
    menu::repo::{AlcoholItem, FoodItem},
    menu::view::{
        self, category_counts, group_by_category, AvailabilityFilter, MenuEntry, MenuFilter,
        MenuView,
    },
    promotions, venue,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/menu", get(public_menu))
        .route("/admin/menu/presets", get(category_presets))
        .route("/admin/food", get(admin_list_food).post(create_food))
        .route("/admin/food/availability", post(bulk_food_availability))
        .route("/admin/food/:id", put(update_food).delete(delete_food))
        .route("/admin/food/:id/availability", patch(set_food_availability))
        .route("/admin/alcohol", get(admin_list_alcohol).post(create_alcohol))
        .route("/admin/alcohol/availability", post(bulk_alcohol_availability))
        .route("/admin/alcohol/:id", put(update_alcohol).delete(delete_alcohol))
        .route(
            "/admin/alcohol/:id/availability",
            patch(set_alcohol_availability),
        )
}

// --- public menu ---

/// The browse page. Food and alcohol are fetched together and both awaited;
/// a failure on either side surfaces as one combined error. The public view
/// pins availability to available-only.
#[instrument(skip(state))]
pub async fn public_menu(
    State(state): State<AppState>,
    Query(q): Query<PublicMenuQuery>,
) -> Result<Json<MenuPage>, AppError> {
    let (food, alcohol, promotions, venue) = tokio::join!(
        FoodItem::list_all(&state.db),
        AlcoholItem::list_all(&state.db),
        promotions::service::active_promotions(&state.db, state.local.as_ref()),
        venue::repo::load(&state.db, state.local.as_ref()),
    );

    let (food, alcohol) = match (food, alcohol) {
        (Ok(f), Ok(a)) => (f, a),
        (food, alcohol) => {
            if let Err(e) = &food {
                error!(error = %e, "food fetch failed");
            }
            if let Err(e) = &alcohol {
                error!(error = %e, "alcohol fetch failed");
            }
            return Err(AppError::Internal(anyhow!("failed to load the menu")));
        }
    };

    let menu_view = q.view.unwrap_or(MenuView::Food);
    let entries: Vec<MenuEntry> = match menu_view {
        MenuView::Food => food.into_iter().map(MenuEntry::Food).collect(),
        MenuView::Drinks => alcohol.into_iter().map(MenuEntry::Alcohol).collect(),
    };

    let filter = MenuFilter {
        category: q.category,
        diet: q.diet.unwrap_or_default(),
        availability: AvailabilityFilter::Available,
        query: q.q.unwrap_or_default(),
    };

    let categories = category_counts(&entries, &filter);
    let buckets = group_by_category(filter.apply(&entries))
        .into_iter()
        .map(|b| BucketView {
            promotions: view::promotions_for_bucket(&promotions, menu_view, &b.title),
            items: b.entries.iter().map(view::present).collect(),
            title: b.title,
        })
        .collect();

    Ok(Json(MenuPage {
        view: menu_view,
        venue,
        categories,
        buckets,
    }))
}

#[instrument]
pub async fn category_presets(AdminUser(_): AdminUser) -> Json<CategoryPresets> {
    Json(CategoryPresets {
        food: FOOD_CATEGORY_PRESETS.to_vec(),
        alcohol: ALCOHOL_CATEGORY_PRESETS.to_vec(),
    })
}

// --- food admin ---

#[instrument(skip(state))]
pub async fn admin_list_food(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Query(q): Query<AdminListQuery>,
) -> Result<Json<AdminFoodList>, AppError> {
    let items = FoodItem::list_all(&state.db)
        .await
        .map_err(AppError::Internal)?;
    let entries: Vec<MenuEntry> = items.into_iter().map(MenuEntry::Food).collect();

    let filter = q.to_filter();
    let categories = category_counts(&entries, &filter);
    let items = filter
        .apply(&entries)
        .into_iter()
        .filter_map(|e| match e {
            MenuEntry::Food(f) => Some(f),
            MenuEntry::Alcohol(_) => None,
        })
        .collect();

    Ok(Json(AdminFoodList { items, categories }))
}

#[instrument(skip(state, payload))]
pub async fn create_food(
    State(state): State<AppState>,
    AdminUser(user_id): AdminUser,
    Json(payload): Json<FoodItemPayload>,
) -> Result<(StatusCode, Json<FoodItem>), AppError> {
    payload.validate()?;
    let item = FoodItem::insert(&state.db, &payload)
        .await
        .map_err(AppError::Internal)?;
    info!(user_id = %user_id, item_id = %item.id, name = %item.name, "food item created");
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state, payload))]
pub async fn update_food(
    State(state): State<AppState>,
    AdminUser(user_id): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<FoodItemPayload>,
) -> Result<Json<FoodItem>, AppError> {
    payload.validate()?;
    let item = FoodItem::update(&state.db, id, &payload)
        .await
        .map_err(AppError::Internal)?
        .ok_or(AppError::NotFound("food item"))?;
    info!(user_id = %user_id, item_id = %item.id, "food item updated");
    Ok(Json(item))
}

#[instrument(skip(state))]
pub async fn set_food_availability(
    State(state): State<AppState>,
    AdminUser(user_id): AdminUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AvailabilityUpdate>,
) -> Result<Json<FoodItem>, AppError> {
    let item = FoodItem::set_available(&state.db, id, body.available)
        .await
        .map_err(AppError::Internal)?
        .ok_or(AppError::NotFound("food item"))?;
    info!(user_id = %user_id, item_id = %item.id, available = item.available, "food availability updated");
    Ok(Json(item))
}

#[instrument(skip(state))]
pub async fn bulk_food_availability(
    State(state): State<AppState>,
    AdminUser(user_id): AdminUser,
    Json(body): Json<BulkAvailabilityRequest>,
) -> Result<Json<BulkAvailabilityResponse>, AppError> {
    let updated = FoodItem::set_available_bulk(&state.db, &body.ids, body.available).await?;
    info!(user_id = %user_id, updated, available = body.available, "bulk food availability updated");
    Ok(Json(BulkAvailabilityResponse {
        updated,
        available: body.available,
    }))
}

#[instrument(skip(state))]
pub async fn delete_food(
    State(state): State<AppState>,
    AdminUser(user_id): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = FoodItem::delete(&state.db, id)
        .await
        .map_err(AppError::Internal)?;
    if !deleted {
        return Err(AppError::NotFound("food item"));
    }
    info!(user_id = %user_id, item_id = %id, "food item deleted");
    Ok(StatusCode::NO_CONTENT)
}

// --- alcohol admin ---

#[instrument(skip(state))]
pub async fn admin_list_alcohol(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Query(q): Query<AdminListQuery>,
) -> Result<Json<AdminAlcoholList>, AppError> {
    let items = AlcoholItem::list_all(&state.db)
        .await
        .map_err(AppError::Internal)?;
    let entries: Vec<MenuEntry> = items.into_iter().map(MenuEntry::Alcohol).collect();

    let filter = q.to_filter();
    let categories = category_counts(&entries, &filter);
    let items = filter
        .apply(&entries)
        .into_iter()
        .filter_map(|e| match e {
            MenuEntry::Alcohol(a) => Some(a),
            MenuEntry::Food(_) => None,
        })
        .collect();

    Ok(Json(AdminAlcoholList { items, categories }))
}

#[instrument(skip(state, payload))]
pub async fn create_alcohol(
    State(state): State<AppState>,
    AdminUser(user_id): AdminUser,
    Json(payload): Json<AlcoholItemPayload>,
) -> Result<(StatusCode, Json<AlcoholItem>), AppError> {
    payload.validate()?;
    let item = AlcoholItem::insert(&state.db, &payload)
        .await
        .map_err(AppError::Internal)?;
    info!(user_id = %user_id, item_id = %item.id, name = %item.name, "alcohol item created");
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state, payload))]
pub async fn update_alcohol(
    State(state): State<AppState>,
    AdminUser(user_id): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AlcoholItemPayload>,
) -> Result<Json<AlcoholItem>, AppError> {
    payload.validate()?;
    let item = AlcoholItem::update(&state.db, id, &payload)
        .await
        .map_err(AppError::Internal)?
        .ok_or(AppError::NotFound("alcohol item"))?;
    info!(user_id = %user_id, item_id = %item.id, "alcohol item updated");
    Ok(Json(item))
}

#[instrument(skip(state))]
pub async fn set_alcohol_availability(
    State(state): State<AppState>,
    AdminUser(user_id): AdminUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AvailabilityUpdate>,
) -> Result<Json<AlcoholItem>, AppError> {
    let item = AlcoholItem::set_available(&state.db, id, body.available)
        .await
        .map_err(AppError::Internal)?
        .ok_or(AppError::NotFound("alcohol item"))?;
    info!(user_id = %user_id, item_id = %item.id, available = item.available, "alcohol availability updated");
    Ok(Json(item))
}

#[instrument(skip(state))]
pub async fn bulk_alcohol_availability(
    State(state): State<AppState>,
    AdminUser(user_id): AdminUser,
    Json(body): Json<BulkAvailabilityRequest>,
) -> Result<Json<BulkAvailabilityResponse>, AppError> {
    let updated = AlcoholItem::set_available_bulk(&state.db, &body.ids, body.available).await?;
    info!(user_id = %user_id, updated, available = body.available, "bulk alcohol availability updated");
    Ok(Json(BulkAvailabilityResponse {
        updated,
        available: body.available,
    }))
}

#[instrument(skip(state))]
pub async fn delete_alcohol(
    State(state): State<AppState>,
    AdminUser(user_id): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = AlcoholItem::delete(&state.db, id)
        .await
        .map_err(AppError::Internal)?;
    if !deleted {
        return Err(AppError::NotFound("alcohol item"));
    }
    info!(user_id = %user_id, item_id = %id, "alcohol item deleted");
    Ok(StatusCode::NO_CONTENT)
}
