//! Role gate: lets a request through only when the authenticated role
//! matches the role the route was mounted with.
//!
//! Mount after [`validate_auth`](super::auth::validate_auth):
//!
//! ```ignore
//! post(handler)
//!     .route_layer(from_fn_with_state(Role::Owner, require_role))
//!     .route_layer(from_fn_with_state(state.clone(), validate_auth))
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use orynal_core::models::auth::Role;
use tracing::debug;

use super::auth::CurrentUser;
use crate::error::AppError;

/// Axum middleware: rejects with 403 unless the caller's role is `expected`.
pub async fn require_role(
    State(expected): State<Role>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = request.extensions().get::<CurrentUser>().copied();
    match user {
        Some(user) if user.role == expected => Ok(next.run(request).await),
        Some(user) => {
            debug!(user_id = user.user_id, role = %user.role, %expected, "role gate rejected");
            Err(AppError::Forbidden("not permitted".into()))
        }
        None => Err(AppError::Forbidden("not permitted".into())),
    }
}
