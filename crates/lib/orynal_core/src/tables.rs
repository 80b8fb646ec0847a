//! Restaurant table persistence.

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::list::ListResponse;
use crate::models::table::{Table, TableInput};
use crate::params::Params;
use crate::sql::{ensure_offset, push_order_and_page};
use crate::store::StoreError;

const TABLE_COLUMNS: &str = "id, name, type, description, capacity, restaurant_id";

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, restaurant_id: i64, params: &Params) {
    query.push(" WHERE restaurant_id = ").push_bind(restaurant_id);
    if let Some(pattern) = params.like_pattern() {
        query.push(" AND LOWER(name) LIKE ").push_bind(pattern);
    }
    // A date narrows the list to tables still free on that calendar day.
    if let Some(date) = params.date {
        query
            .push(
                " AND NOT EXISTS (SELECT 1 FROM orders o \
                 WHERE o.table_id = tables.id AND o.date::date = ",
            )
            .push_bind(date)
            .push("::date)");
    }
}

/// List a restaurant's tables.
pub async fn list_tables(
    pool: &PgPool,
    restaurant_id: i64,
    params: &Params,
) -> Result<ListResponse<Table>, StoreError> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM tables");
    push_filters(&mut count, restaurant_id, params);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;
    ensure_offset(total, params)?;

    let mut query = QueryBuilder::new(format!("SELECT {TABLE_COLUMNS} FROM tables"));
    push_filters(&mut query, restaurant_id, params);
    push_order_and_page(&mut query, params, "id");
    let items = query.build_query_as::<Table>().fetch_all(pool).await?;

    Ok(ListResponse::new(items, total, params))
}

/// Distinct table types offered by a restaurant.
pub async fn categories(pool: &PgPool, restaurant_id: i64) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT type FROM tables WHERE restaurant_id = $1 ORDER BY type",
    )
    .bind(restaurant_id)
    .fetch_all(pool)
    .await
}

/// Fetch one table of a restaurant.
pub async fn get_table(
    pool: &PgPool,
    restaurant_id: i64,
    table_id: i64,
) -> Result<Option<Table>, sqlx::Error> {
    sqlx::query_as::<_, Table>(&format!(
        "SELECT {TABLE_COLUMNS} FROM tables WHERE id = $1 AND restaurant_id = $2"
    ))
    .bind(table_id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await
}

/// Add a table to a restaurant.
pub async fn create_table(
    pool: &PgPool,
    restaurant_id: i64,
    input: &TableInput,
) -> Result<Table, sqlx::Error> {
    sqlx::query_as::<_, Table>(&format!(
        "INSERT INTO tables (name, type, description, capacity, restaurant_id) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING {TABLE_COLUMNS}"
    ))
    .bind(&input.name)
    .bind(&input.kind)
    .bind(&input.description)
    .bind(input.capacity)
    .bind(restaurant_id)
    .fetch_one(pool)
    .await
}

/// Update a table of a restaurant.
pub async fn update_table(
    pool: &PgPool,
    restaurant_id: i64,
    table_id: i64,
    input: &TableInput,
) -> Result<Option<Table>, sqlx::Error> {
    sqlx::query_as::<_, Table>(&format!(
        "UPDATE tables SET name = $1, type = $2, description = $3, capacity = $4 \
         WHERE id = $5 AND restaurant_id = $6 \
         RETURNING {TABLE_COLUMNS}"
    ))
    .bind(&input.name)
    .bind(&input.kind)
    .bind(&input.description)
    .bind(input.capacity)
    .bind(table_id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await
}

/// Delete a table of a restaurant.
pub async fn delete_table(
    pool: &PgPool,
    restaurant_id: i64,
    table_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tables WHERE id = $1 AND restaurant_id = $2")
        .bind(table_id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
