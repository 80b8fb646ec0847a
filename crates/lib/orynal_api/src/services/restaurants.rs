//! Input checks for restaurants and the tables and menu items they own.

use orynal_core::models::amenity::AmenityInput;
use orynal_core::models::auth::Role;
use orynal_core::models::menu::FoodInput;
use orynal_core::models::restaurant::{Restaurant, RestaurantInput};
use orynal_core::models::review::{ReviewInput, STARS};
use orynal_core::models::table::TableInput;
use orynal_core::store::IdentityStore;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};

fn required(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} is required")));
    }
    Ok(())
}

pub fn validate_restaurant(input: &RestaurantInput) -> AppResult<()> {
    required(&input.name, "name")?;
    required(&input.address, "address")?;
    required(&input.city, "city")?;
    required(&input.phone, "phone")
}

pub fn validate_amenity(input: &AmenityInput) -> AppResult<()> {
    required(&input.name, "name")
}

/// Every amenity a restaurant input links must be in the catalog.
pub async fn check_amenities(pool: &PgPool, input: &RestaurantInput) -> AppResult<()> {
    let Some(ids) = input.unique_amenity_ids() else {
        return Ok(());
    };
    let known = orynal_core::amenities::count_amenities(pool, &ids).await?;
    if known != ids.len() as i64 {
        return Err(AppError::Validation("unknown service in serviceIds".into()));
    }
    Ok(())
}

pub fn validate_table(input: &TableInput) -> AppResult<()> {
    required(&input.name, "name")?;
    required(&input.kind, "type")?;
    if input.capacity <= 0 {
        return Err(AppError::Validation("capacity must be positive".into()));
    }
    Ok(())
}

pub fn validate_food(input: &FoodInput) -> AppResult<()> {
    required(&input.name, "name")?;
    required(&input.kind, "type")?;
    if !input.price.is_finite() || input.price < 0.0 {
        return Err(AppError::Validation("price must not be negative".into()));
    }
    Ok(())
}

pub fn validate_review(input: &ReviewInput) -> AppResult<()> {
    if !STARS.contains(&input.stars) {
        return Err(AppError::Validation(format!(
            "stars must be between {} and {}",
            STARS.start(),
            STARS.end()
        )));
    }
    Ok(())
}

/// The account a new restaurant is assigned to must exist and be an owner.
pub async fn resolve_owner(identities: &dyn IdentityStore, owner_id: i64) -> AppResult<()> {
    let owner = identities
        .find_by_id(owner_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("owner {owner_id} not found")))?;
    if owner.role != Role::Owner {
        return Err(AppError::Validation(format!(
            "user {owner_id} is not an owner"
        )));
    }
    Ok(())
}

/// Fetch a restaurant or 404.
pub async fn require_restaurant(pool: &PgPool, id: i64) -> AppResult<Restaurant> {
    orynal_core::restaurants::get_restaurant(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("restaurant {id} not found")))
}
