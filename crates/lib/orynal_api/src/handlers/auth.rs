//! Authentication request handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use orynal_core::models::auth::{Registration, TokenPair};

use crate::AppState;
use crate::error::AppResult;
use crate::models::{Created, Envelope, LoginRequest, RefreshRequest};

/// `POST /api/auth/login`: authenticate with email + password.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<Envelope<TokenPair>>> {
    let pair = state.issuer().login(&body.email, &body.password).await?;
    Ok(Json(Envelope::ok("logged in", pair)))
}

/// `POST /api/auth/register`: create a user account. Any role in the body
/// is ignored.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<Registration>,
) -> AppResult<(StatusCode, Json<Envelope<Created>>)> {
    let id = state.issuer().register(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::created("user registered", Created { id })),
    ))
}

/// `POST /api/auth/refresh-token`: exchange a refresh token for a new pair.
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> AppResult<Json<Envelope<TokenPair>>> {
    let pair = state.issuer().refresh_token(&body.refresh_token).await?;
    Ok(Json(Envelope::ok("token refreshed", pair)))
}
