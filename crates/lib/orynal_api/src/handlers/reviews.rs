//! Review request handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use orynal_core::models::list::ListResponse;
use orynal_core::models::review::{Review, ReviewInput};
use orynal_core::params::{self, Params, RawQuery};
use tracing::debug;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::models::Envelope;
use crate::services::restaurants;

/// `GET /api/restaurants/{id}/reviews`
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(raw): Query<RawQuery>,
) -> AppResult<Json<Envelope<ListResponse<Review>>>> {
    let params = params::reviews_search(Params::default(), &raw)?;
    let page = orynal_core::reviews::list_reviews(&state.pool, id, &params).await?;
    Ok(Json(Envelope::ok("reviews", page)))
}

/// `POST /api/restaurants/{id}/reviews`
pub async fn create_review(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(body): Json<ReviewInput>,
) -> AppResult<(StatusCode, Json<Envelope<Review>>)> {
    restaurants::validate_review(&body)?;
    restaurants::require_restaurant(&state.pool, id).await?;
    let review = orynal_core::reviews::create_review(&state.pool, id, user.user_id, &body).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::created("review created", review)),
    ))
}

/// `DELETE /api/restaurants/{id}/reviews/{review_id}`: author only.
pub async fn delete_review(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((id, review_id)): Path<(i64, i64)>,
) -> AppResult<Json<Envelope<()>>> {
    let review = orynal_core::reviews::get_review(&state.pool, id, review_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("review {review_id} not found")))?;
    if review.user_id != user.user_id {
        debug!(review_id, user_id = user.user_id, "review delete by non-author");
        return Err(AppError::Forbidden("not your review".into()));
    }
    if !orynal_core::reviews::delete_review(&state.pool, review_id).await? {
        return Err(AppError::NotFound(format!("review {review_id} not found")));
    }
    Ok(Json(Envelope::ok("review deleted", ())))
}
