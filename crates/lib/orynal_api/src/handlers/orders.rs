//! Order request handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use orynal_core::models::list::ListResponse;
use orynal_core::models::order::{NewOrder, Order, OrderUpdate};
use orynal_core::orders::OrderScope;
use orynal_core::params::{self, Params, RawQuery};
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::models::Envelope;
use crate::services::orders::{self, OrderAction};

fn order_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("order {id} not found"))
}

async fn load_authorized(
    state: &AppState,
    user: &CurrentUser,
    id: i64,
    action: OrderAction,
) -> AppResult<Order> {
    let order = orynal_core::orders::get_order(&state.pool, id)
        .await?
        .ok_or_else(|| order_not_found(id))?;
    orders::authorize(state.restaurants.as_ref(), user, &order, action).await?;
    Ok(order)
}

/// `POST /api/orders/create`: the guest is the caller.
pub async fn create_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<NewOrder>,
) -> AppResult<(StatusCode, Json<Envelope<Order>>)> {
    orders::validate_new_order(&state.pool, &body).await?;
    let order = orynal_core::orders::create_order(&state.pool, user.user_id, &body).await?;
    info!(
        order_id = order.id,
        restaurant_id = order.restaurant_id,
        user_id = user.user_id,
        "order placed"
    );
    Ok((
        StatusCode::CREATED,
        Json(Envelope::created("order created", order)),
    ))
}

/// `GET /api/orders`: the caller's own orders.
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(raw): Query<RawQuery>,
) -> AppResult<Json<Envelope<ListResponse<Order>>>> {
    let params = params::orders_search(Params::default(), &raw)?;
    let page =
        orynal_core::orders::list_orders(&state.pool, OrderScope::User(user.user_id), &params)
            .await?;
    Ok(Json(Envelope::ok("orders", page)))
}

/// `GET /api/orders/{id}`
pub async fn get_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Envelope<Order>>> {
    let order = load_authorized(&state, &user, id, OrderAction::Read).await?;
    Ok(Json(Envelope::ok("order", order)))
}

/// `PUT /api/orders/{id}`: absent fields keep their value.
pub async fn update_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(body): Json<OrderUpdate>,
) -> AppResult<Json<Envelope<Order>>> {
    let order = load_authorized(&state, &user, id, OrderAction::Update).await?;
    orders::check_status_change(&user, &body)?;
    orders::validate_order_update(&body)?;
    if let Some(table_id) = body.table_id
        && orynal_core::tables::get_table(&state.pool, order.restaurant_id, table_id)
            .await?
            .is_none()
    {
        return Err(AppError::Validation(format!(
            "table {table_id} does not belong to restaurant {}",
            order.restaurant_id
        )));
    }

    let updated = orynal_core::orders::update_order(&state.pool, id, &body)
        .await?
        .ok_or_else(|| order_not_found(id))?;
    Ok(Json(Envelope::ok("order updated", updated)))
}

/// `DELETE /api/orders/{id}`
pub async fn delete_order(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Envelope<()>>> {
    load_authorized(&state, &user, id, OrderAction::Delete).await?;
    if !orynal_core::orders::delete_order(&state.pool, id).await? {
        return Err(order_not_found(id));
    }
    info!(order_id = id, user_id = user.user_id, "order deleted");
    Ok(Json(Envelope::ok("order deleted", ())))
}
