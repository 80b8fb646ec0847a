//! Order persistence.

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::list::ListResponse;
use crate::models::order::{NewOrder, Order, OrderUpdate};
use crate::params::Params;
use crate::sql::{ensure_offset, push_order_and_page};
use crate::store::StoreError;

const ORDER_COLUMNS: &str = "id, restaurant_id, table_id, user_id, total_sum, date, status";

/// Which orders a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderScope {
    /// Orders placed by one guest.
    User(i64),
    /// Orders received by one restaurant.
    Restaurant(i64),
}

fn push_scope(query: &mut QueryBuilder<'_, Postgres>, scope: OrderScope) {
    match scope {
        OrderScope::User(user_id) => query.push(" WHERE user_id = ").push_bind(user_id),
        OrderScope::Restaurant(id) => query.push(" WHERE restaurant_id = ").push_bind(id),
    };
}

/// List orders in `scope`, newest first unless the client sorts.
pub async fn list_orders(
    pool: &PgPool,
    scope: OrderScope,
    params: &Params,
) -> Result<ListResponse<Order>, StoreError> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM orders");
    push_scope(&mut count, scope);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;
    ensure_offset(total, params)?;

    let mut query = QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders"));
    push_scope(&mut query, scope);
    push_order_and_page(&mut query, params, "date DESC, id DESC");
    let items = query.build_query_as::<Order>().fetch_all(pool).await?;

    Ok(ListResponse::new(items, total, params))
}

/// Fetch an order with its food IDs.
pub async fn get_order(pool: &PgPool, id: i64) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(mut order) = order else {
        return Ok(None);
    };
    order.foods = food_ids(pool, id).await?;
    Ok(Some(order))
}

async fn food_ids(pool: &PgPool, order_id: i64) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT food_id FROM order_foods WHERE order_id = $1 ORDER BY food_id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await
}

/// Place an order for `user_id`, linking its foods in the same transaction.
pub async fn create_order(
    pool: &PgPool,
    user_id: i64,
    new_order: &NewOrder,
) -> Result<Order, sqlx::Error> {
    let mut foods = new_order.foods.clone();
    foods.sort_unstable();
    foods.dedup();

    let mut tx = pool.begin().await?;

    let mut order = sqlx::query_as::<_, Order>(&format!(
        "INSERT INTO orders (restaurant_id, table_id, user_id, total_sum, date) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(new_order.restaurant_id)
    .bind(new_order.table_id)
    .bind(user_id)
    .bind(new_order.total_sum)
    .bind(new_order.date)
    .fetch_one(&mut *tx)
    .await?;

    if !foods.is_empty() {
        sqlx::query(
            "INSERT INTO order_foods (order_id, food_id) SELECT $1, UNNEST($2::bigint[])",
        )
        .bind(order.id)
        .bind(&foods)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    order.foods = foods;
    Ok(order)
}

/// Apply the fields present in `update` and return the order with its foods.
pub async fn update_order(
    pool: &PgPool,
    id: i64,
    update: &OrderUpdate,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "UPDATE orders SET \
             table_id = COALESCE($1, table_id), \
             total_sum = COALESCE($2, total_sum), \
             date = COALESCE($3, date), \
             status = COALESCE($4, status), \
             updated_at = now() \
         WHERE id = $5 \
         RETURNING {ORDER_COLUMNS}"
    ))
    .bind(update.table_id)
    .bind(update.total_sum)
    .bind(update.date)
    .bind(update.status.map(|s| s.as_str()))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let Some(mut order) = order else {
        return Ok(None);
    };
    order.foods = food_ids(pool, id).await?;
    Ok(Some(order))
}

/// Delete an order (its food links cascade).
pub async fn delete_order(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM orders WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
