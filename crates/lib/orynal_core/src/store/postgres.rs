//! Postgres-backed stores.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{IdentityStore, RestaurantStore, SessionStore, StoreError};
use crate::auth::queries;
use crate::models::auth::{Identity, NewIdentity, SessionRecord};
use crate::models::restaurant::RestaurantRef;

/// Implements every store trait over one connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        queries::find_user_by_email(&self.pool, email).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Identity>, StoreError> {
        queries::find_user_by_id(&self.pool, id).await
    }

    async fn save(&self, identity: NewIdentity) -> Result<Identity, StoreError> {
        queries::create_user(&self.pool, &identity).await
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn upsert(&self, record: SessionRecord) -> Result<(), StoreError> {
        queries::upsert_user_token(&self.pool, &record).await
    }
}

#[async_trait]
impl RestaurantStore for PgStore {
    async fn find_restaurant(&self, id: i64) -> Result<Option<RestaurantRef>, StoreError> {
        Ok(crate::restaurants::find_restaurant_ref(&self.pool, id).await?)
    }
}
