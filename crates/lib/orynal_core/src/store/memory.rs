//! In-memory stores for tests and local runs without Postgres.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{IdentityStore, RestaurantStore, SessionStore, StoreError};
use crate::models::auth::{Identity, NewIdentity, Role, SessionRecord};
use crate::models::restaurant::RestaurantRef;

#[derive(Debug, Default)]
struct Inner {
    next_user_id: i64,
    next_restaurant_id: i64,
    users: HashMap<i64, Identity>,
    sessions: HashMap<i64, SessionRecord>,
    restaurants: HashMap<i64, RestaurantRef>,
}

/// Implements every store trait over process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a restaurant owned by `owner_id`, returning its id.
    pub fn insert_restaurant(&self, owner_id: i64) -> i64 {
        let mut inner = self.lock();
        inner.next_restaurant_id += 1;
        let id = inner.next_restaurant_id;
        inner.restaurants.insert(id, RestaurantRef { id, owner_id });
        id
    }

    /// The token pair currently stored for `user_id`.
    pub fn session(&self, user_id: i64) -> Option<SessionRecord> {
        self.lock().sessions.get(&user_id).cloned()
    }

    /// Change a stored identity's role. Returns false for unknown ids.
    pub fn set_role(&self, user_id: i64, role: Role) -> bool {
        match self.lock().users.get_mut(&user_id) {
            Some(identity) => {
                identity.role = role;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl IdentityStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        Ok(self.lock().users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Identity>, StoreError> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn save(&self, identity: NewIdentity) -> Result<Identity, StoreError> {
        let mut inner = self.lock();
        let taken = inner
            .users
            .values()
            .any(|u| u.email == identity.email || u.phone == identity.phone);
        if taken {
            return Err(StoreError::Conflict("user with this email or phone".into()));
        }
        inner.next_user_id += 1;
        let stored = Identity {
            id: inner.next_user_id,
            name: identity.name,
            surname: identity.surname,
            email: identity.email,
            phone: identity.phone,
            password_hash: identity.password_hash,
            role: identity.role,
        };
        inner.users.insert(stored.id, stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn upsert(&self, record: SessionRecord) -> Result<(), StoreError> {
        let mut inner = self.lock();
        let created_at = inner
            .sessions
            .get(&record.user_id)
            .map_or(record.created_at, |existing| existing.created_at);
        inner.sessions.insert(
            record.user_id,
            SessionRecord {
                created_at,
                ..record
            },
        );
        Ok(())
    }
}

#[async_trait]
impl RestaurantStore for MemoryStore {
    async fn find_restaurant(&self, id: i64) -> Result<Option<RestaurantRef>, StoreError> {
        Ok(self.lock().restaurants.get(&id).copied())
    }
}
