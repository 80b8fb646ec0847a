//! Restaurant request handlers.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use orynal_core::models::auth::Role;
use orynal_core::models::list::ListResponse;
use orynal_core::models::order::Order;
use orynal_core::models::restaurant::{
    PopularRestaurant, Restaurant, RestaurantInput, Statistics,
};
use orynal_core::orders::OrderScope;
use orynal_core::params::{self, Params, RawQuery};
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::{CurrentUser, Viewer};
use crate::models::Envelope;
use crate::services::ownership::{AdminPolicy, require_ownership};
use crate::services::restaurants;

/// `GET /api/restaurants`: public listing. A signed-in owner sees only the
/// restaurants they own.
pub async fn list_restaurants(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Query(raw): Query<RawQuery>,
) -> AppResult<Json<Envelope<ListResponse<Restaurant>>>> {
    let params = params::restaurants_search(Params::default(), &raw)?;
    let owner_id = viewer
        .0
        .filter(|user| user.role == Role::Owner)
        .map(|user| user.user_id);
    let page = orynal_core::restaurants::list_restaurants(&state.pool, owner_id, &params).await?;
    Ok(Json(Envelope::ok("restaurants", page)))
}

/// `GET /api/restaurants/{id}`
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Envelope<Restaurant>>> {
    let restaurant = restaurants::require_restaurant(&state.pool, id).await?;
    Ok(Json(Envelope::ok("restaurant", restaurant)))
}

/// `GET /api/restaurants/statistics`
pub async fn statistics(
    State(state): State<AppState>,
) -> AppResult<Json<Envelope<Statistics>>> {
    let stats = orynal_core::restaurants::statistics(&state.pool).await?;
    Ok(Json(Envelope::ok("statistics", stats)))
}

/// `GET /api/restaurants/popular`: ranked by number of orders.
pub async fn popular(
    State(state): State<AppState>,
) -> AppResult<Json<Envelope<Vec<PopularRestaurant>>>> {
    let ranking = orynal_core::restaurants::popular(&state.pool).await?;
    Ok(Json(Envelope::ok("popular restaurants", ranking)))
}

/// `PUT /api/restaurants/{id}`: owner of the restaurant or an admin.
pub async fn update_restaurant(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(body): Json<RestaurantInput>,
) -> AppResult<Json<Envelope<Restaurant>>> {
    require_ownership(state.restaurants.as_ref(), &user, id, AdminPolicy::Bypass).await?;
    restaurants::validate_restaurant(&body)?;
    restaurants::check_amenities(&state.pool, &body).await?;
    let restaurant = orynal_core::restaurants::update_restaurant(&state.pool, id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("restaurant {id} not found")))?;
    Ok(Json(Envelope::ok("restaurant updated", restaurant)))
}

/// `DELETE /api/restaurants/{id}`: owner of the restaurant or an admin.
pub async fn delete_restaurant(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Envelope<()>>> {
    require_ownership(state.restaurants.as_ref(), &user, id, AdminPolicy::Bypass).await?;
    if !orynal_core::restaurants::delete_restaurant(&state.pool, id).await? {
        return Err(AppError::NotFound(format!("restaurant {id} not found")));
    }
    info!(restaurant_id = id, user_id = user.user_id, "restaurant deleted");
    Ok(Json(Envelope::ok("restaurant deleted", ())))
}

/// `GET /api/restaurants/{id}/orders`: orders placed at a restaurant the
/// caller owns.
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Query(raw): Query<RawQuery>,
) -> AppResult<Json<Envelope<ListResponse<Order>>>> {
    require_ownership(state.restaurants.as_ref(), &user, id, AdminPolicy::Enforce).await?;
    let params = params::orders_search(Params::default(), &raw)?;
    let page =
        orynal_core::orders::list_orders(&state.pool, OrderScope::Restaurant(id), &params).await?;
    Ok(Json(Envelope::ok("orders", page)))
}
