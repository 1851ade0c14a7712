//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! # Design Principles
//!
//! 1. **Pre-compute expensive resources**: JWT keys and the timing
//!    placeholder hash are created once
//! 2. **Cheap cloning**: All fields use Arc or are already Clone-cheap
//! 3. **Immutable after creation**: State is read-only during request handling

use crate::auth::{JwtService, PasswordService};
use crate::config::AppConfig;
use crate::repositories::UserStore;
use crate::services::{AuthService, UserService};
use anyhow::Context;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::info;

/// Shared application state
///
/// # Performance
///
/// - `store`: `Arc<dyn UserStore>`, cloning is O(1)
/// - `config`: Wrapped in Arc, cloning is O(1)
/// - `auth`: Pre-computed JWT keys wrapped in Arc, cloning is O(1)
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// User store every service reads and writes through
    pub store: Arc<dyn UserStore>,
    /// Register / login / token authorization
    pub auth: AuthService,
    /// User CRUD
    pub users: UserService,
    /// Prometheus handle, present when the binary installed the recorder
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new application state
    ///
    /// # Note
    /// This derives the JWT keys and hashes the login timing placeholder,
    /// so it should only be called once at application startup.
    pub fn new(store: Arc<dyn UserStore>, config: AppConfig) -> anyhow::Result<Self> {
        let passwords =
            PasswordService::new(&config.password).context("invalid password settings")?;
        let jwt = JwtService::new(&config.jwt.secret, config.jwt.token_expiry_secs);
        info!(
            algorithm = ?passwords.algorithm(),
            token_expiry_secs = jwt.expiry_secs(),
            "Auth configured"
        );

        let auth = AuthService::new(store.clone(), passwords.clone(), jwt)
            .context("failed to prepare auth service")?;
        let users = UserService::new(store.clone(), passwords);

        Ok(Self {
            config: Arc::new(config),
            store,
            auth,
            users,
            metrics: None,
        })
    }

    /// Attach the Prometheus handle rendered by `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[inline]
    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    #[inline]
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    #[inline]
    pub fn users(&self) -> &UserService {
        &self.users
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PasswordAlgorithm, PasswordConfig};
    use crate::repositories::InMemoryUserStore;

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.jwt.secret = "test-secret-key-for-testing-only-32chars".to_string();
        config.password = PasswordConfig {
            algorithm: PasswordAlgorithm::Argon2,
            argon2_memory_kib: 1024,
            argon2_iterations: 1,
            bcrypt_cost: 4,
        };
        config
    }

    #[tokio::test]
    async fn test_state_clone_is_cheap() {
        let state = AppState::new(Arc::new(InMemoryUserStore::new()), test_config()).unwrap();

        // Clone should be O(1) - just Arc increments
        let cloned = state.clone();
        assert!(Arc::ptr_eq(&state.config, &cloned.config));
        assert!(cloned.metrics.is_none());
    }

    #[tokio::test]
    async fn test_jwt_service_is_precomputed() {
        let state = AppState::new(Arc::new(InMemoryUserStore::new()), test_config()).unwrap();

        let user_id = uuid::Uuid::new_v4();
        let token = state.auth().jwt().issue(user_id, "a@x.com").unwrap();
        assert_eq!(state.auth().authorize(&token).unwrap().user_id, user_id);
    }

    #[test]
    fn test_invalid_password_settings_fail() {
        let mut config = test_config();
        config.password.bcrypt_cost = 99;
        assert!(AppState::new(Arc::new(InMemoryUserStore::new()), config).is_err());
    }
}
