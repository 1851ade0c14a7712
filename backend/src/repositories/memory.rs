//! In-memory user store
//!
//! Used by the test suites and for running the service without PostgreSQL
//! (`database.backend = "memory"`). Data is lost on restart.

use super::user::{NewUser, StoreError, UserChanges, UserRecord, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// User store held in a `HashMap` behind an async `RwLock`
///
/// The uniqueness check and the write happen under the same write guard, so
/// concurrent inserts of one email cannot both succeed.
#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_taken(users: &HashMap<Uuid, UserRecord>, email: &str, except: Option<Uuid>) -> bool {
    users
        .values()
        .any(|u| u.email == email && Some(u.id) != except)
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut users = self.users.write().await;
        if email_taken(&users, &user.email, None) {
            return Err(StoreError::DuplicateEmail);
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        let mut users: Vec<UserRecord> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(users)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: UserChanges,
    ) -> Result<Option<UserRecord>, StoreError> {
        let mut users = self.users.write().await;
        if !users.contains_key(&id) {
            return Ok(None);
        }
        if let Some(email) = &changes.email {
            if email_taken(&users, email, Some(id)) {
                return Err(StoreError::DuplicateEmail);
            }
        }

        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.users.write().await.remove(&id).is_some())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.users.read().await.len() as u64)
    }
}
