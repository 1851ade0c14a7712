//! PostgreSQL-backed user store

use super::user::{NewUser, StoreError, UserChanges, UserRecord, UserStore};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

/// User store for PostgreSQL
///
/// Email uniqueness is enforced by the `users_email_key` unique index; a
/// violation comes back from sqlx as a database error and is mapped to
/// [`StoreError::DuplicateEmail`].
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (id, name, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn list(&self) -> Result<Vec<UserRecord>, StoreError> {
        let users = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            ORDER BY created_at, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: UserChanges,
    ) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email)
            WHERE id = $1
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::db::health_check(&self.pool)
            .await
            .map_err(StoreError::Backend)
    }
}
