//! Ownership gate for restaurant-scoped mutations.

use orynal_core::models::auth::Role;
use orynal_core::models::restaurant::RestaurantRef;
use orynal_core::store::RestaurantStore;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;

/// Whether an admin skips the owner comparison on a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminPolicy {
    /// Admins pass regardless of who owns the restaurant.
    Bypass,
    /// Admins are held to the owner comparison like everyone else.
    Enforce,
}

/// Ensure `user` may mutate restaurant `restaurant_id`.
///
/// Missing restaurant → 404. Caller is neither the owner nor an admin on a
/// [`AdminPolicy::Bypass`] route → 403.
pub async fn require_ownership(
    restaurants: &dyn RestaurantStore,
    user: &CurrentUser,
    restaurant_id: i64,
    policy: AdminPolicy,
) -> AppResult<RestaurantRef> {
    let restaurant = restaurants
        .find_restaurant(restaurant_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("restaurant {restaurant_id} not found")))?;

    if policy == AdminPolicy::Bypass && user.role == Role::Admin {
        return Ok(restaurant);
    }
    if restaurant.owner_id != user.user_id {
        debug!(
            user_id = user.user_id,
            restaurant_id,
            owner_id = restaurant.owner_id,
            "ownership gate rejected"
        );
        return Err(AppError::Forbidden("permission denied".into()));
    }
    Ok(restaurant)
}
