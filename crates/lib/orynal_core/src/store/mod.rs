//! Storage seams for the auth core.
//!
//! The session issuer and the ownership gate only see these traits. The
//! Postgres implementation lives in [`postgres`]; [`memory`] backs tests and
//! local experiments.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::auth::{Identity, NewIdentity, SessionRecord};
use crate::models::restaurant::RestaurantRef;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write (e.g. duplicate email).
    #[error("{0} already exists")]
    Conflict(String),

    /// The requested page starts past the last item.
    #[error("offset exceeds total items")]
    OffsetExceedsTotal,

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl StoreError {
    /// Map a unique-violation to [`StoreError::Conflict`] naming `what`.
    pub fn from_unique(e: sqlx::Error, what: &str) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(what.to_string())
            }
            _ => StoreError::Db(e),
        }
    }
}

/// Identity lookup and persistence.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Identity>, StoreError>;

    /// Insert a new identity. Duplicate email or phone yields `Conflict`.
    async fn save(&self, identity: NewIdentity) -> Result<Identity, StoreError>;
}

/// Latest-token-pair persistence, one record per identity.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert or overwrite the pair stored for `record.user_id`.
    async fn upsert(&self, record: SessionRecord) -> Result<(), StoreError>;
}

/// Restaurant lookup used by the ownership gate.
#[async_trait]
pub trait RestaurantStore: Send + Sync {
    async fn find_restaurant(&self, id: i64) -> Result<Option<RestaurantRef>, StoreError>;
}
