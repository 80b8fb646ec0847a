//! Admin request handlers, nested under `/api/admin` behind the admin role
//! gate.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use orynal_core::models::auth::{Role, UserProfile};
use orynal_core::models::list::ListResponse;
use orynal_core::models::restaurant::{Restaurant, RestaurantInput};
use orynal_core::params::{self, Params, RawQuery};
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{CreateOwnerRequest, CreateRestaurantRequest, Created, Envelope};
use crate::services::{restaurants, users};

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

async fn list_accounts(
    state: &AppState,
    role: Role,
    raw: &RawQuery,
) -> AppResult<ListResponse<UserProfile>> {
    let params = params::users_search(Params::default(), raw)?;
    Ok(orynal_core::users::list_users(&state.pool, role, &params).await?)
}

async fn delete_account(state: &AppState, role: Role, id: i64) -> AppResult<()> {
    let identity = users::find_with_role(state.identities.as_ref(), id, role).await?;
    if !orynal_core::users::delete_user(&state.pool, identity.id).await? {
        return Err(AppError::NotFound(format!("{role} {id} not found")));
    }
    info!(user_id = id, %role, "account deleted by admin");
    Ok(())
}

/// `GET /api/admin/owners`
pub async fn list_owners(
    State(state): State<AppState>,
    Query(raw): Query<RawQuery>,
) -> AppResult<Json<Envelope<ListResponse<UserProfile>>>> {
    let page = list_accounts(&state, Role::Owner, &raw).await?;
    Ok(Json(Envelope::ok("owners", page)))
}

/// `POST /api/admin/owners`: the created account always has the owner role.
pub async fn create_owner(
    State(state): State<AppState>,
    Json(body): Json<CreateOwnerRequest>,
) -> AppResult<(StatusCode, Json<Envelope<Created>>)> {
    let id = users::create_owner(state.identities.as_ref(), body).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::created("owner created", Created { id })),
    ))
}

/// `DELETE /api/admin/owners/{id}`
pub async fn delete_owner(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Envelope<()>>> {
    delete_account(&state, Role::Owner, id).await?;
    Ok(Json(Envelope::ok("owner deleted", ())))
}

/// `GET /api/admin/clients`
pub async fn list_clients(
    State(state): State<AppState>,
    Query(raw): Query<RawQuery>,
) -> AppResult<Json<Envelope<ListResponse<UserProfile>>>> {
    let page = list_accounts(&state, Role::User, &raw).await?;
    Ok(Json(Envelope::ok("clients", page)))
}

/// `DELETE /api/admin/clients/{id}`
pub async fn delete_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Envelope<()>>> {
    delete_account(&state, Role::User, id).await?;
    Ok(Json(Envelope::ok("client deleted", ())))
}

// ---------------------------------------------------------------------------
// Restaurants
// ---------------------------------------------------------------------------

/// `GET /api/admin/restaurants`: every restaurant, regardless of owner.
pub async fn list_restaurants(
    State(state): State<AppState>,
    Query(raw): Query<RawQuery>,
) -> AppResult<Json<Envelope<ListResponse<Restaurant>>>> {
    let params = params::restaurants_search(Params::default(), &raw)?;
    let page = orynal_core::restaurants::list_restaurants(&state.pool, None, &params).await?;
    Ok(Json(Envelope::ok("restaurants", page)))
}

/// `POST /api/admin/restaurants`
pub async fn create_restaurant(
    State(state): State<AppState>,
    Json(body): Json<CreateRestaurantRequest>,
) -> AppResult<(StatusCode, Json<Envelope<Restaurant>>)> {
    restaurants::validate_restaurant(&body.restaurant)?;
    restaurants::resolve_owner(state.identities.as_ref(), body.owner_id).await?;
    restaurants::check_amenities(&state.pool, &body.restaurant).await?;

    let restaurant =
        orynal_core::restaurants::create_restaurant(&state.pool, body.owner_id, &body.restaurant)
            .await?;
    info!(restaurant_id = restaurant.id, owner_id = body.owner_id, "restaurant created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::created("restaurant created", restaurant)),
    ))
}

/// `GET /api/admin/restaurants/{id}`
pub async fn get_restaurant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Envelope<Restaurant>>> {
    let restaurant = restaurants::require_restaurant(&state.pool, id).await?;
    Ok(Json(Envelope::ok("restaurant", restaurant)))
}

/// `PUT /api/admin/restaurants/{id}`
pub async fn update_restaurant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<RestaurantInput>,
) -> AppResult<Json<Envelope<Restaurant>>> {
    restaurants::validate_restaurant(&body)?;
    restaurants::check_amenities(&state.pool, &body).await?;
    let restaurant = orynal_core::restaurants::update_restaurant(&state.pool, id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("restaurant {id} not found")))?;
    Ok(Json(Envelope::ok("restaurant updated", restaurant)))
}

/// `DELETE /api/admin/restaurants/{id}`
pub async fn delete_restaurant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Envelope<()>>> {
    if !orynal_core::restaurants::delete_restaurant(&state.pool, id).await? {
        return Err(AppError::NotFound(format!("restaurant {id} not found")));
    }
    info!(restaurant_id = id, "restaurant deleted by admin");
    Ok(Json(Envelope::ok("restaurant deleted", ())))
}
