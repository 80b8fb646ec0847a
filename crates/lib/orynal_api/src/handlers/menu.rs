//! Menu request handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use orynal_core::models::list::ListResponse;
use orynal_core::models::menu::{Food, FoodInput};
use orynal_core::params::{self, Params, RawQuery};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::models::Envelope;
use crate::services::ownership::{AdminPolicy, require_ownership};
use crate::services::restaurants;

fn food_not_found(restaurant_id: i64, food_id: i64) -> AppError {
    AppError::NotFound(format!(
        "menu item {food_id} not found in restaurant {restaurant_id}"
    ))
}

/// `GET /api/restaurants/{id}/menu/categories`
pub async fn categories(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Envelope<Vec<String>>>> {
    let kinds = orynal_core::menu::categories(&state.pool, id).await?;
    Ok(Json(Envelope::ok("menu categories", kinds)))
}

/// `GET /api/restaurants/{id}/menu`: `q` filters on the item type.
pub async fn list_foods(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(raw): Query<RawQuery>,
) -> AppResult<Json<Envelope<ListResponse<Food>>>> {
    let params = params::menu_search(Params::default(), &raw)?;
    let page = orynal_core::menu::list_foods(&state.pool, id, &params).await?;
    Ok(Json(Envelope::ok("menu", page)))
}

/// `GET /api/restaurants/{id}/menu/{food_id}`
pub async fn get_food(
    State(state): State<AppState>,
    Path((id, food_id)): Path<(i64, i64)>,
) -> AppResult<Json<Envelope<Food>>> {
    let food = orynal_core::menu::get_food(&state.pool, id, food_id)
        .await?
        .ok_or_else(|| food_not_found(id, food_id))?;
    Ok(Json(Envelope::ok("menu item", food)))
}

/// `POST /api/restaurants/{id}/menu`
pub async fn create_food(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(body): Json<FoodInput>,
) -> AppResult<(StatusCode, Json<Envelope<Food>>)> {
    require_ownership(state.restaurants.as_ref(), &user, id, AdminPolicy::Enforce).await?;
    restaurants::validate_food(&body)?;
    let food = orynal_core::menu::create_food(&state.pool, id, &body).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::created("menu item created", food)),
    ))
}

/// `PUT /api/restaurants/{id}/menu/{food_id}`
pub async fn update_food(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((id, food_id)): Path<(i64, i64)>,
    Json(body): Json<FoodInput>,
) -> AppResult<Json<Envelope<Food>>> {
    require_ownership(state.restaurants.as_ref(), &user, id, AdminPolicy::Enforce).await?;
    restaurants::validate_food(&body)?;
    let food = orynal_core::menu::update_food(&state.pool, id, food_id, &body)
        .await?
        .ok_or_else(|| food_not_found(id, food_id))?;
    Ok(Json(Envelope::ok("menu item updated", food)))
}

/// `DELETE /api/restaurants/{id}/menu/{food_id}`
pub async fn delete_food(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((id, food_id)): Path<(i64, i64)>,
) -> AppResult<Json<Envelope<()>>> {
    require_ownership(state.restaurants.as_ref(), &user, id, AdminPolicy::Enforce).await?;
    if !orynal_core::menu::delete_food(&state.pool, id, food_id).await? {
        return Err(food_not_found(id, food_id));
    }
    Ok(Json(Envelope::ok("menu item deleted", ())))
}
