//! Amenity catalog persistence and restaurant links.

use std::collections::HashMap;

use sqlx::{PgConnection, PgPool};

use crate::models::amenity::{Amenity, AmenityInput};
use crate::store::StoreError;

/// The whole catalog, alphabetically.
pub async fn list_amenities(pool: &PgPool) -> Result<Vec<Amenity>, sqlx::Error> {
    sqlx::query_as::<_, Amenity>("SELECT id, name FROM amenities ORDER BY name, id")
        .fetch_all(pool)
        .await
}

/// Add an amenity. A duplicate name yields `Conflict`.
pub async fn create_amenity(pool: &PgPool, input: &AmenityInput) -> Result<Amenity, StoreError> {
    sqlx::query_as::<_, Amenity>("INSERT INTO amenities (name) VALUES ($1) RETURNING id, name")
        .bind(input.name.trim())
        .fetch_one(pool)
        .await
        .map_err(|e| StoreError::from_unique(e, "amenity"))
}

/// Rename an amenity.
pub async fn update_amenity(
    pool: &PgPool,
    id: i64,
    input: &AmenityInput,
) -> Result<Option<Amenity>, StoreError> {
    sqlx::query_as::<_, Amenity>("UPDATE amenities SET name = $1 WHERE id = $2 RETURNING id, name")
        .bind(input.name.trim())
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(|e| StoreError::from_unique(e, "amenity"))
}

/// Remove an amenity; restaurants lose it with it.
pub async fn delete_amenity(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM amenities WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// How many of `ids` exist in the catalog. Callers pass deduplicated IDs.
pub async fn count_amenities(pool: &PgPool, ids: &[i64]) -> Result<i64, sqlx::Error> {
    if ids.is_empty() {
        return Ok(0);
    }
    sqlx::query_scalar("SELECT COUNT(*) FROM amenities WHERE id = ANY($1)")
        .bind(ids)
        .fetch_one(pool)
        .await
}

/// Amenities of each restaurant in `restaurant_ids`, keyed by restaurant.
pub async fn amenities_by_restaurant(
    pool: &PgPool,
    restaurant_ids: &[i64],
) -> Result<HashMap<i64, Vec<Amenity>>, sqlx::Error> {
    let mut grouped: HashMap<i64, Vec<Amenity>> = HashMap::new();
    if restaurant_ids.is_empty() {
        return Ok(grouped);
    }
    let rows = sqlx::query_as::<_, (i64, i64, String)>(
        r#"
        SELECT ra.restaurant_id, a.id, a.name
        FROM restaurant_amenities ra
        JOIN amenities a ON a.id = ra.amenity_id
        WHERE ra.restaurant_id = ANY($1)
        ORDER BY a.name, a.id
        "#,
    )
    .bind(restaurant_ids)
    .fetch_all(pool)
    .await?;

    for (restaurant_id, id, name) in rows {
        grouped
            .entry(restaurant_id)
            .or_default()
            .push(Amenity { id, name });
    }
    Ok(grouped)
}

/// Replace the amenity set of a restaurant.
pub(crate) async fn replace_restaurant_amenities(
    conn: &mut PgConnection,
    restaurant_id: i64,
    amenity_ids: &[i64],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM restaurant_amenities WHERE restaurant_id = $1")
        .bind(restaurant_id)
        .execute(&mut *conn)
        .await?;
    if !amenity_ids.is_empty() {
        sqlx::query(
            "INSERT INTO restaurant_amenities (restaurant_id, amenity_id) \
             SELECT $1, UNNEST($2::bigint[]) ON CONFLICT DO NOTHING",
        )
        .bind(restaurant_id)
        .bind(amenity_ids)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
