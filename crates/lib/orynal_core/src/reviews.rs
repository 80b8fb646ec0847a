//! Restaurant review persistence.

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::list::ListResponse;
use crate::models::review::{Review, ReviewInput};
use crate::params::Params;
use crate::sql::{ensure_offset, push_order_and_page};
use crate::store::StoreError;

const REVIEW_SELECT: &str = "SELECT r.id, r.stars, r.description, r.user_id, \
     u.name AS user_name, r.restaurant_id, r.created_at \
     FROM restaurant_reviews r JOIN users u ON u.id = r.user_id";

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, restaurant_id: i64) {
    query.push(" WHERE r.restaurant_id = ").push_bind(restaurant_id);
}

/// List a restaurant's reviews, newest first.
pub async fn list_reviews(
    pool: &PgPool,
    restaurant_id: i64,
    params: &Params,
) -> Result<ListResponse<Review>, StoreError> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM restaurant_reviews r");
    push_filters(&mut count, restaurant_id);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;
    ensure_offset(total, params)?;

    let mut query = QueryBuilder::new(REVIEW_SELECT);
    push_filters(&mut query, restaurant_id);
    push_order_and_page(&mut query, params, "r.created_at DESC, r.id DESC");
    let items = query.build_query_as::<Review>().fetch_all(pool).await?;

    Ok(ListResponse::new(items, total, params))
}

/// Fetch one review of a restaurant.
pub async fn get_review(
    pool: &PgPool,
    restaurant_id: i64,
    review_id: i64,
) -> Result<Option<Review>, sqlx::Error> {
    sqlx::query_as::<_, Review>(&format!(
        "{REVIEW_SELECT} WHERE r.id = $1 AND r.restaurant_id = $2"
    ))
    .bind(review_id)
    .bind(restaurant_id)
    .fetch_optional(pool)
    .await
}

/// Post a review by `user_id`.
pub async fn create_review(
    pool: &PgPool,
    restaurant_id: i64,
    user_id: i64,
    input: &ReviewInput,
) -> Result<Review, sqlx::Error> {
    sqlx::query_as::<_, Review>(
        r#"
        WITH r AS (
            INSERT INTO restaurant_reviews (stars, description, user_id, restaurant_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, stars, description, user_id, restaurant_id, created_at
        )
        SELECT r.id, r.stars, r.description, r.user_id, u.name AS user_name,
               r.restaurant_id, r.created_at
        FROM r JOIN users u ON u.id = r.user_id
        "#,
    )
    .bind(input.stars)
    .bind(&input.description)
    .bind(user_id)
    .bind(restaurant_id)
    .fetch_one(pool)
    .await
}

/// Delete a review.
pub async fn delete_review(pool: &PgPool, review_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM restaurant_reviews WHERE id = $1")
        .bind(review_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
