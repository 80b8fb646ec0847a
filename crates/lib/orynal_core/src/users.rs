//! Identity management beyond sign-up: profiles, admin listings and the
//! bootstrap admin account.

use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;

use crate::auth::AuthError;
use crate::auth::password::hash_password_blocking;
use crate::models::auth::{NewIdentity, ProfileUpdate, Role, UserProfile};
use crate::models::list::ListResponse;
use crate::params::Params;
use crate::sql::{ensure_offset, push_order_and_page};
use crate::store::{IdentityStore, StoreError};

const PROFILE_COLUMNS: &str = "id, name, surname, email, phone, role";

fn push_filters(query: &mut QueryBuilder<'_, Postgres>, role: Role, params: &Params) {
    query.push(" WHERE role = ").push_bind(role.as_str());
    if let Some(pattern) = params.like_pattern() {
        query
            .push(" AND (LOWER(name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(surname) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(email) LIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// List identities with `role`.
pub async fn list_users(
    pool: &PgPool,
    role: Role,
    params: &Params,
) -> Result<ListResponse<UserProfile>, StoreError> {
    let mut count = QueryBuilder::new("SELECT COUNT(*) FROM users");
    push_filters(&mut count, role, params);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;
    ensure_offset(total, params)?;

    let mut query = QueryBuilder::new(format!("SELECT {PROFILE_COLUMNS} FROM users"));
    push_filters(&mut query, role, params);
    push_order_and_page(&mut query, params, "id");
    let items = query.build_query_as::<UserProfile>().fetch_all(pool).await?;

    Ok(ListResponse::new(items, total, params))
}

/// Change name, surname and phone. Role and email are never touched here.
pub async fn update_profile(
    pool: &PgPool,
    user_id: i64,
    update: &ProfileUpdate,
) -> Result<Option<UserProfile>, StoreError> {
    sqlx::query_as::<_, UserProfile>(&format!(
        "UPDATE users SET name = $1, surname = $2, phone = $3, updated_at = now() \
         WHERE id = $4 \
         RETURNING {PROFILE_COLUMNS}"
    ))
    .bind(&update.name)
    .bind(&update.surname)
    .bind(&update.phone)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| StoreError::from_unique(e, "user with this phone"))
}

/// Replace a user's password digest.
pub async fn update_password(
    pool: &PgPool,
    user_id: i64,
    password_hash: &str,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE users SET password_hash = $1, updated_at = now() WHERE id = $2")
            .bind(password_hash)
            .bind(user_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete an identity (its session and everything it owns cascade).
pub async fn delete_user(pool: &PgPool, user_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Admin account to create on startup when missing.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub phone: String,
}

/// Create the admin described by `seed` unless its email is taken.
///
/// Returns whether an account was created. Admins cannot be created
/// through the API.
pub async fn seed_admin(identities: &dyn IdentityStore, seed: AdminSeed) -> Result<bool, AuthError> {
    if identities.find_by_email(&seed.email).await?.is_some() {
        return Ok(false);
    }
    let password_hash = hash_password_blocking(seed.password).await?;
    let admin = identities
        .save(NewIdentity {
            name: "Admin".into(),
            surname: String::new(),
            email: seed.email,
            phone: seed.phone,
            password_hash,
            role: Role::Admin,
        })
        .await?;
    info!(user_id = admin.id, "seeded admin account");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SessionIssuer;
    use crate::auth::jwt;
    use crate::models::auth::AccessClaims;
    use crate::store::MemoryStore;

    fn seed() -> AdminSeed {
        AdminSeed {
            email: "root@example.com".into(),
            password: "change-me-now".into(),
            phone: "+000".into(),
        }
    }

    #[tokio::test]
    async fn seeded_admin_can_log_in_as_admin() {
        let store = MemoryStore::new();
        assert!(seed_admin(&store, seed()).await.unwrap());

        let issuer = SessionIssuer::new(&store, &store, b"secret");
        let pair = issuer.login("root@example.com", "change-me-now").await.unwrap();
        let claims: AccessClaims = jwt::verify(&pair.access_token, b"secret").unwrap();
        assert_eq!(claims.role, Role::Admin);
    }

    #[tokio::test]
    async fn seeding_twice_is_a_no_op() {
        let store = MemoryStore::new();
        assert!(seed_admin(&store, seed()).await.unwrap());
        assert!(!seed_admin(&store, seed()).await.unwrap());
    }
}
