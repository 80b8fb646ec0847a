//! Amenity catalog handlers. The public API calls amenities "services".

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use orynal_core::models::amenity::{Amenity, AmenityInput};
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::Envelope;
use crate::services::restaurants;

fn amenity_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("service {id} not found"))
}

/// `GET /api/restaurants/services`, also served under `/api/admin`.
pub async fn list_amenities(
    State(state): State<AppState>,
) -> AppResult<Json<Envelope<Vec<Amenity>>>> {
    let catalog = orynal_core::amenities::list_amenities(&state.pool).await?;
    Ok(Json(Envelope::ok("services", catalog)))
}

/// `POST /api/admin/services`
pub async fn create_amenity(
    State(state): State<AppState>,
    Json(body): Json<AmenityInput>,
) -> AppResult<(StatusCode, Json<Envelope<Amenity>>)> {
    restaurants::validate_amenity(&body)?;
    let amenity = orynal_core::amenities::create_amenity(&state.pool, &body).await?;
    info!(amenity_id = amenity.id, name = %amenity.name, "service created");
    Ok((
        StatusCode::CREATED,
        Json(Envelope::created("service created", amenity)),
    ))
}

/// `PUT /api/admin/services/{id}`
pub async fn update_amenity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<AmenityInput>,
) -> AppResult<Json<Envelope<Amenity>>> {
    restaurants::validate_amenity(&body)?;
    let amenity = orynal_core::amenities::update_amenity(&state.pool, id, &body)
        .await?
        .ok_or_else(|| amenity_not_found(id))?;
    Ok(Json(Envelope::ok("service updated", amenity)))
}

/// `DELETE /api/admin/services/{id}`: restaurants lose the amenity too.
pub async fn delete_amenity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Envelope<()>>> {
    if !orynal_core::amenities::delete_amenity(&state.pool, id).await? {
        return Err(amenity_not_found(id));
    }
    info!(amenity_id = id, "service deleted");
    Ok(Json(Envelope::ok("service deleted", ())))
}
