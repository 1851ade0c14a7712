//! User management for authenticated callers
//!
//! CRUD over user records. Creating a user follows the registration input
//! rules but leaves duplicate detection entirely to the store's unique
//! constraint.

use crate::auth::PasswordService;
use crate::error::ApiError;
use crate::repositories::{NewUser, UserChanges, UserStore};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::info;
use user_accounts_shared::types::{RegisterRequest, UpdateUserRequest, UserResponse};
use uuid::Uuid;

fn user_not_found() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

/// User service
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    passwords: PasswordService,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, passwords: PasswordService) -> Self {
        Self { store, passwords }
    }

    /// Create a user
    pub async fn create(&self, req: &RegisterRequest) -> Result<UserResponse, ApiError> {
        req.validate()?;

        let password_hash = self
            .passwords
            .hash_async(req.password.expose_secret().clone())
            .await?;

        let user = self
            .store
            .insert(NewUser {
                name: req.name.trim().to_string(),
                email: req.email.clone(),
                password_hash,
            })
            .await?;

        info!(user_id = %user.id, "User created");
        Ok(user.into())
    }

    /// Get a user by id
    pub async fn get(&self, id: Uuid) -> Result<UserResponse, ApiError> {
        self.store
            .find_by_id(id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(user_not_found)
    }

    /// List all users, oldest first
    pub async fn list(&self) -> Result<Vec<UserResponse>, ApiError> {
        let users = self.store.list().await?;
        Ok(users.into_iter().map(UserResponse::from).collect())
    }

    /// Update name and/or email
    pub async fn update(
        &self,
        id: Uuid,
        req: UpdateUserRequest,
    ) -> Result<UserResponse, ApiError> {
        let req = req.normalized();
        if req.is_empty() {
            return Err(ApiError::Validation("No fields to update".to_string()));
        }
        req.validate()?;

        let changes = UserChanges {
            name: req.name.map(|n| n.trim().to_string()),
            email: req.email,
        };

        let user = self
            .store
            .update(id, changes)
            .await?
            .ok_or_else(user_not_found)?;

        info!(user_id = %user.id, "User updated");
        Ok(user.into())
    }

    /// Delete a user
    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        if !self.store.delete(id).await? {
            return Err(user_not_found());
        }
        info!(user_id = %id, "User deleted");
        Ok(())
    }
}
