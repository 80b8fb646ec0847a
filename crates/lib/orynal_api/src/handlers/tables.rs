//! Table request handlers. Reads are public; writes require the owner role
//! and ownership of the restaurant.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use orynal_core::models::list::ListResponse;
use orynal_core::models::table::{Table, TableInput};
use orynal_core::params::{self, Params, RawQuery};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::models::Envelope;
use crate::services::ownership::{AdminPolicy, require_ownership};
use crate::services::restaurants;

fn table_not_found(restaurant_id: i64, table_id: i64) -> AppError {
    AppError::NotFound(format!(
        "table {table_id} not found in restaurant {restaurant_id}"
    ))
}

/// `GET /api/restaurants/{id}/tables/categories`: distinct table types.
pub async fn categories(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Envelope<Vec<String>>>> {
    let kinds = orynal_core::tables::categories(&state.pool, id).await?;
    Ok(Json(Envelope::ok("table categories", kinds)))
}

/// `GET /api/restaurants/{id}/tables`: `date` keeps only tables with no
/// order on that day.
pub async fn list_tables(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(raw): Query<RawQuery>,
) -> AppResult<Json<Envelope<ListResponse<Table>>>> {
    let params = params::tables_search(Params::default(), &raw)?;
    let page = orynal_core::tables::list_tables(&state.pool, id, &params).await?;
    Ok(Json(Envelope::ok("tables", page)))
}

/// `GET /api/restaurants/{id}/tables/{table_id}`
pub async fn get_table(
    State(state): State<AppState>,
    Path((id, table_id)): Path<(i64, i64)>,
) -> AppResult<Json<Envelope<Table>>> {
    let table = orynal_core::tables::get_table(&state.pool, id, table_id)
        .await?
        .ok_or_else(|| table_not_found(id, table_id))?;
    Ok(Json(Envelope::ok("table", table)))
}

/// `POST /api/restaurants/{id}/tables`
pub async fn create_table(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(body): Json<TableInput>,
) -> AppResult<(StatusCode, Json<Envelope<Table>>)> {
    require_ownership(state.restaurants.as_ref(), &user, id, AdminPolicy::Enforce).await?;
    restaurants::validate_table(&body)?;
    let table = orynal_core::tables::create_table(&state.pool, id, &body).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::created("table created", table)),
    ))
}

/// `PUT /api/restaurants/{id}/tables/{table_id}`
pub async fn update_table(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((id, table_id)): Path<(i64, i64)>,
    Json(body): Json<TableInput>,
) -> AppResult<Json<Envelope<Table>>> {
    require_ownership(state.restaurants.as_ref(), &user, id, AdminPolicy::Enforce).await?;
    restaurants::validate_table(&body)?;
    let table = orynal_core::tables::update_table(&state.pool, id, table_id, &body)
        .await?
        .ok_or_else(|| table_not_found(id, table_id))?;
    Ok(Json(Envelope::ok("table updated", table)))
}

/// `DELETE /api/restaurants/{id}/tables/{table_id}`
pub async fn delete_table(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((id, table_id)): Path<(i64, i64)>,
) -> AppResult<Json<Envelope<()>>> {
    require_ownership(state.restaurants.as_ref(), &user, id, AdminPolicy::Enforce).await?;
    if !orynal_core::tables::delete_table(&state.pool, id, table_id).await? {
        return Err(table_not_found(id, table_id));
    }
    Ok(Json(Envelope::ok("table deleted", ())))
}
