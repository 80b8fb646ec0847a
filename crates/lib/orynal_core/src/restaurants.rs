//! Restaurant persistence.

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::amenities::{amenities_by_restaurant, replace_restaurant_amenities};
use crate::models::list::ListResponse;
use crate::models::restaurant::{
    PopularRestaurant, Restaurant, RestaurantInput, RestaurantRef, Statistics,
};
use crate::params::Params;
use crate::sql::{ensure_offset, push_order_and_page};
use crate::store::StoreError;

const RESTAURANT_COLUMNS: &str =
    "id, name, address, description, city, status, phone, mode_from, mode_to, owner_id";

/// How many restaurants the popularity ranking returns.
pub const POPULAR_LIMIT: i64 = 10;

/// Fill in the linked amenities of every restaurant in `restaurants`.
pub async fn attach_amenities<'a>(
    pool: &PgPool,
    restaurants: impl IntoIterator<Item = &'a mut Restaurant>,
) -> Result<(), sqlx::Error> {
    let mut restaurants: Vec<&mut Restaurant> = restaurants.into_iter().collect();
    let ids: Vec<i64> = restaurants.iter().map(|r| r.id).collect();
    let mut grouped = amenities_by_restaurant(pool, &ids).await?;
    for restaurant in restaurants.iter_mut() {
        restaurant.amenities = grouped.remove(&restaurant.id).unwrap_or_default();
    }
    Ok(())
}

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, owner_id: Option<i64>, params: &Params) {
    query.push(" WHERE TRUE");
    if let Some(owner_id) = owner_id {
        query.push(" AND owner_id = ").push_bind(owner_id);
    }
    if let Some(pattern) = params.like_pattern() {
        query.push(" AND LOWER(name) LIKE ").push_bind(pattern);
    }
}

/// List restaurants, optionally only those of one owner.
pub async fn list_restaurants(
    pool: &PgPool,
    owner_id: Option<i64>,
    params: &Params,
) -> Result<ListResponse<Restaurant>, StoreError> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM restaurants");
    push_filters(&mut count, owner_id, params);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;
    ensure_offset(total, params)?;

    let mut query = QueryBuilder::new(format!("SELECT {RESTAURANT_COLUMNS} FROM restaurants"));
    push_filters(&mut query, owner_id, params);
    push_order_and_page(&mut query, params, "id");
    let mut items = query.build_query_as::<Restaurant>().fetch_all(pool).await?;
    attach_amenities(pool, &mut items).await?;

    Ok(ListResponse::new(items, total, params))
}

/// Fetch a restaurant by ID, with its amenities.
pub async fn get_restaurant(pool: &PgPool, id: i64) -> Result<Option<Restaurant>, sqlx::Error> {
    let restaurant = sqlx::query_as::<_, Restaurant>(&format!(
        "SELECT {RESTAURANT_COLUMNS} FROM restaurants WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(mut restaurant) = restaurant else {
        return Ok(None);
    };
    attach_amenities(pool, std::iter::once(&mut restaurant)).await?;
    Ok(Some(restaurant))
}

/// Fetch only the ID and owner of a restaurant.
pub async fn find_restaurant_ref(
    pool: &PgPool,
    id: i64,
) -> Result<Option<RestaurantRef>, sqlx::Error> {
    sqlx::query_as::<_, RestaurantRef>("SELECT id, owner_id FROM restaurants WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Create a restaurant owned by `owner_id`, linking the requested amenities
/// in the same transaction.
pub async fn create_restaurant(
    pool: &PgPool,
    owner_id: i64,
    input: &RestaurantInput,
) -> Result<Restaurant, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let restaurant = sqlx::query_as::<_, Restaurant>(&format!(
        "INSERT INTO restaurants (name, address, description, city, status, phone, mode_from, mode_to, owner_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING {RESTAURANT_COLUMNS}"
    ))
    .bind(&input.name)
    .bind(&input.address)
    .bind(&input.description)
    .bind(&input.city)
    .bind(input.status)
    .bind(&input.phone)
    .bind(input.mode_from)
    .bind(input.mode_to)
    .bind(owner_id)
    .fetch_one(&mut *tx)
    .await?;

    if let Some(ids) = input.unique_amenity_ids() {
        replace_restaurant_amenities(&mut *tx, restaurant.id, &ids).await?;
    }
    tx.commit().await?;
    reload(pool, restaurant).await
}

/// Update a restaurant's editable fields. Amenity links are replaced only
/// when the input names them.
pub async fn update_restaurant(
    pool: &PgPool,
    id: i64,
    input: &RestaurantInput,
) -> Result<Option<Restaurant>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let restaurant = sqlx::query_as::<_, Restaurant>(&format!(
        "UPDATE restaurants \
         SET name = $1, address = $2, description = $3, city = $4, status = $5, \
             phone = $6, mode_from = $7, mode_to = $8, updated_at = now() \
         WHERE id = $9 \
         RETURNING {RESTAURANT_COLUMNS}"
    ))
    .bind(&input.name)
    .bind(&input.address)
    .bind(&input.description)
    .bind(&input.city)
    .bind(input.status)
    .bind(&input.phone)
    .bind(input.mode_from)
    .bind(input.mode_to)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(restaurant) = restaurant else {
        return Ok(None);
    };
    if let Some(ids) = input.unique_amenity_ids() {
        replace_restaurant_amenities(&mut *tx, restaurant.id, &ids).await?;
    }
    tx.commit().await?;
    reload(pool, restaurant).await.map(Some)
}

async fn reload(pool: &PgPool, mut restaurant: Restaurant) -> Result<Restaurant, sqlx::Error> {
    attach_amenities(pool, std::iter::once(&mut restaurant)).await?;
    Ok(restaurant)
}

/// Delete a restaurant (tables, menu, orders and reviews cascade).
pub async fn delete_restaurant(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM restaurants WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Site-wide order and restaurant counters.
pub async fn statistics(pool: &PgPool) -> Result<Statistics, sqlx::Error> {
    let (orders, restaurants) = sqlx::query_as::<_, (i64, i64)>(
        "SELECT (SELECT COUNT(*) FROM orders), (SELECT COUNT(*) FROM restaurants)",
    )
    .fetch_one(pool)
    .await?;
    Ok(Statistics::from_counts(orders, restaurants))
}

/// The restaurants with the most orders, best first.
pub async fn popular(pool: &PgPool) -> Result<Vec<PopularRestaurant>, sqlx::Error> {
    let mut ranking = sqlx::query_as::<_, PopularRestaurant>(
        r#"
        SELECT r.id, r.name, r.address, r.description, r.city, r.status, r.phone,
               r.mode_from, r.mode_to, r.owner_id, COUNT(o.id) AS orders_count
        FROM restaurants r
        LEFT JOIN orders o ON o.restaurant_id = r.id
        GROUP BY r.id
        ORDER BY orders_count DESC, r.id
        LIMIT $1
        "#,
    )
    .bind(POPULAR_LIMIT)
    .fetch_all(pool)
    .await?;
    attach_amenities(pool, ranking.iter_mut().map(|entry| &mut entry.restaurant)).await?;
    Ok(ranking)
}
