//! Menu persistence.

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::list::ListResponse;
use crate::models::menu::{Food, FoodInput};
use crate::params::Params;
use crate::sql::{ensure_offset, push_order_and_page};
use crate::store::StoreError;

const FOOD_COLUMNS: &str = "id, name, type, description, price, available, restaurant_id";

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, restaurant_id: i64, params: &Params) {
    query.push(" WHERE restaurant_id = ").push_bind(restaurant_id);
    // `q` selects a menu category.
    if let Some(pattern) = params.like_pattern() {
        query.push(" AND LOWER(type) LIKE ").push_bind(pattern);
    }
}

/// List a restaurant's menu.
pub async fn list_foods(
    pool: &PgPool,
    restaurant_id: i64,
    params: &Params,
) -> Result<ListResponse<Food>, StoreError> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM foods");
    push_filters(&mut count, restaurant_id, params);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;
    ensure_offset(total, params)?;

    let mut query = QueryBuilder::new(format!("SELECT {FOOD_COLUMNS} FROM foods"));
    push_filters(&mut query, restaurant_id, params);
    push_order_and_page(&mut query, params, "id");
    let items = query.build_query_as::<Food>().fetch_all(pool).await?;

    Ok(ListResponse::new(items, total, params))
}

/// Distinct menu categories of a restaurant.
pub async fn categories(pool: &PgPool, restaurant_id: i64) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT type FROM foods WHERE restaurant_id = $1 ORDER BY type",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await
}

/// Fetch one menu item of a restaurant.
pub async fn get_food(
    pool: &PgPool,
    restaurant_id: i64,
    food_id: i64,
) -> Result<Option<Food>, sqlx::Error> {
    sqlx::query_as::<_, Food>(&format!(
        "SELECT {FOOD_COLUMNS} FROM foods WHERE id = $1 AND restaurant_id = $2"
    ))
    .bind(food_id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await
}

/// How many of `food_ids` are on the restaurant's menu.
pub async fn count_menu_items(
    pool: &PgPool,
    restaurant_id: i64,
    food_ids: &[i64],
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM foods WHERE restaurant_id = $1 AND id = ANY($2)",
    )
    .bind(restaurant_id)
    .bind(food_ids)
    .fetch_one(pool)
    .await
}

/// Add an item to a restaurant's menu.
pub async fn create_food(
    pool: &PgPool,
    restaurant_id: i64,
    input: &FoodInput,
) -> Result<Food, sqlx::Error> {
    sqlx::query_as::<_, Food>(&format!(
        "INSERT INTO foods (name, type, description, price, available, restaurant_id) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {FOOD_COLUMNS}"
    ))
    .bind(&input.name)
    .bind(&input.kind)
    .bind(&input.description)
    .bind(input.price)
    .bind(input.available)
    .bind(restaurant_id)
    .fetch_one(pool)
    .await
}

/// Update a menu item of a restaurant.
pub async fn update_food(
    pool: &PgPool,
    restaurant_id: i64,
    food_id: i64,
    input: &FoodInput,
) -> Result<Option<Food>, sqlx::Error> {
    sqlx::query_as::<_, Food>(&format!(
        "UPDATE foods SET name = $1, type = $2, description = $3, price = $4, available = $5 \
         WHERE id = $6 AND restaurant_id = $7 \
         RETURNING {FOOD_COLUMNS}"
    ))
    .bind(&input.name)
    .bind(&input.kind)
    .bind(&input.description)
    .bind(input.price)
    .bind(input.available)
    .bind(food_id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await
}

/// Remove an item from a restaurant's menu.
pub async fn delete_food(
    pool: &PgPool,
    restaurant_id: i64,
    food_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM foods WHERE id = $1 AND restaurant_id = $2")
        .bind(food_id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
