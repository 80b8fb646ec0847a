//! Auth-related database queries.

use sqlx::PgPool;

use crate::models::auth::{Identity, NewIdentity, SessionRecord};
use crate::store::StoreError;

const IDENTITY_COLUMNS: &str = "id, name, surname, email, phone, password_hash, role";

/// Fetch an identity by email.
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<Identity>, StoreError> {
    let row = sqlx::query_as::<_, Identity>(&format!(
        "SELECT {IDENTITY_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch an identity by ID.
pub async fn find_user_by_id(pool: &PgPool, user_id: i64) -> Result<Option<Identity>, StoreError> {
    let row = sqlx::query_as::<_, Identity>(&format!(
        "SELECT {IDENTITY_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Insert a new identity, returning the stored row.
pub async fn create_user(pool: &PgPool, identity: &NewIdentity) -> Result<Identity, StoreError> {
    sqlx::query_as::<_, Identity>(&format!(
        "INSERT INTO users (name, surname, email, phone, password_hash, role) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         RETURNING {IDENTITY_COLUMNS}"
    ))
    .bind(&identity.name)
    .bind(&identity.surname)
    .bind(&identity.email)
    .bind(&identity.phone)
    .bind(&identity.password_hash)
    .bind(identity.role.as_str())
    .fetch_one(pool)
    .await
    .map_err(|e| StoreError::from_unique(e, "user with this email or phone"))
}

/// Store the latest token pair for a user, replacing any earlier pair.
pub async fn upsert_user_token(pool: &PgPool, record: &SessionRecord) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO user_tokens (user_id, role, email, access_token, refresh_token, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (user_id) DO UPDATE SET \
             role = EXCLUDED.role, \
             email = EXCLUDED.email, \
             access_token = EXCLUDED.access_token, \
             refresh_token = EXCLUDED.refresh_token, \
             updated_at = EXCLUDED.updated_at",
    )
    .bind(record.user_id)
    .bind(record.role.as_str())
    .bind(&record.email)
    .bind(&record.access_token)
    .bind(&record.refresh_token)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}
