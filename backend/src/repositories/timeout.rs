//! Per-operation deadline for a user store
//!
//! Every call is raced against a fixed timeout. There are no retries: an
//! insert that timed out may or may not have been applied, and retrying it
//! without an idempotency key could create a duplicate side effect.

use super::user::{NewUser, StoreError, UserChanges, UserRecord, UserStore};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

/// Wraps another store and bounds each operation by `limit`
#[derive(Clone)]
pub struct TimeoutUserStore {
    inner: Arc<dyn UserStore>,
    limit: Duration,
}

impl TimeoutUserStore {
    pub fn new(inner: Arc<dyn UserStore>, limit: Duration) -> Self {
        Self { inner, limit }
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>> + Send,
    {
        match tokio::time::timeout(self.limit, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    operation,
                    limit_ms = self.limit.as_millis() as u64,
                    "User store operation timed out"
                );
                Err(StoreError::Timeout(self.limit))
            }
        }
    }
}

#[async_trait]
impl UserStore for TimeoutUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        self.bounded("find_by_email", self.inner.find_by_email(email))
            .await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        self.bounded("find_by_id", self.inner.find_by_id(id)).await
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        self.bounded("insert", self.inner.insert(user)).await
    }

    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        self.bounded("list", self.inner.list()).await
    }

    async fn update(
        &self,
        id: Uuid,
        changes: UserChanges,
    ) -> Result<Option<UserRecord>, StoreError> {
        self.bounded("update", self.inner.update(id, changes)).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.bounded("delete", self.inner.delete(id)).await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.bounded("count", self.inner.count()).await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        self.bounded("health_check", self.inner.health_check()).await
    }
}
