//! User store abstraction
//!
//! The auth gateway and user service only see [`UserStore`]. Concrete
//! backends live next to this module: [`super::PgUserStore`] for PostgreSQL,
//! [`super::InMemoryUserStore`] for tests and local runs, and
//! [`super::TimeoutUserStore`] which bounds every call of another store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;
use user_accounts_shared::types::UserResponse;
use uuid::Uuid;

/// User record as persisted
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Public view of the record; the password hash is dropped
impl From<UserRecord> for UserResponse {
    fn from(record: UserRecord) -> Self {
        UserResponse {
            id: record.id,
            name: record.name,
            email: record.email,
            created_at: record.created_at,
        }
    }
}

/// Input for inserting a user; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Fields to change on an existing user. `None` leaves the field as is.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Errors surfaced by a user store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Uniqueness constraint on `email` rejected the write
    #[error("email already registered")]
    DuplicateEmail,

    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("store backend error: {0}")]
    Backend(#[source] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::DuplicateEmail;
            }
        }
        StoreError::Backend(err.into())
    }
}

/// Persistence interface for user records
///
/// Implementations must enforce email uniqueness atomically: of two
/// concurrent inserts with the same email, exactly one succeeds and the other
/// returns [`StoreError::DuplicateEmail`].
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError>;

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    /// All users, oldest first
    async fn list(&self) -> Result<Vec<UserRecord>, StoreError>;

    /// Apply `changes`; `Ok(None)` when no user has this id
    async fn update(&self, id: Uuid, changes: UserChanges)
        -> Result<Option<UserRecord>, StoreError>;

    /// Returns whether a user was deleted
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
