//! Self-service profile handlers. Every route here sits behind strict auth.

use axum::extract::State;
use axum::{Extension, Json};
use orynal_core::models::auth::{ProfileUpdate, UserProfile};
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::models::{ChangePasswordRequest, Envelope};
use crate::services::users;

/// `GET /api/profile`
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Envelope<UserProfile>>> {
    let identity = users::find_identity(state.identities.as_ref(), user.user_id).await?;
    Ok(Json(Envelope::ok("profile", UserProfile::from(&identity))))
}

/// `PUT /api/profile`: name, surname and phone only.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<ProfileUpdate>,
) -> AppResult<Json<Envelope<UserProfile>>> {
    if body.name.trim().is_empty() || body.phone.trim().is_empty() {
        return Err(AppError::Validation("name and phone are required".into()));
    }
    let profile = orynal_core::users::update_profile(&state.pool, user.user_id, &body)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", user.user_id)))?;
    Ok(Json(Envelope::ok("profile updated", profile)))
}

/// `DELETE /api/profile`: owners and users may close their account.
pub async fn delete_profile(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Envelope<()>>> {
    let identity = users::find_identity(state.identities.as_ref(), user.user_id).await?;
    users::ensure_deletable(&identity)?;
    if !orynal_core::users::delete_user(&state.pool, identity.id).await? {
        return Err(AppError::NotFound(format!("user {} not found", identity.id)));
    }
    info!(user_id = identity.id, "account deleted");
    Ok(Json(Envelope::ok("profile deleted", ())))
}

/// `PUT /api/profile/change-password`
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<ChangePasswordRequest>,
) -> AppResult<Json<Envelope<()>>> {
    users::change_password(&state.pool, state.identities.as_ref(), user.user_id, body).await?;
    Ok(Json(Envelope::ok("password changed", ())))
}
