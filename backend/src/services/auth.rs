//! Auth gateway: registration, login and token authorization
//!
//! Orchestrates the user store, the password hasher and the token service.
//! Every component error is translated into an [`ApiError`] here, before it
//! reaches the HTTP layer.
//!
//! # Performance
//!
//! - Password hashing/verification runs on the blocking thread pool
//! - Token validation uses pre-computed keys and never touches the store

use crate::auth::{AuthUser, HashError, JwtService, PasswordService};
use crate::error::ApiError;
use crate::repositories::{NewUser, UserStore};
use secrecy::ExposeSecret;
use std::sync::Arc;
use tracing::{debug, error, info};
use user_accounts_shared::types::{LoginRequest, LoginResponse, RegisterRequest, UserResponse};

/// Fixed input hashed once at startup; its hash is verified against when a
/// login names an unknown email so both failure paths cost one verification.
const TIMING_PLACEHOLDER: &str = "timing-equalization-placeholder";

/// Auth gateway
///
/// Holds no mutable state: clones share the same store handle and keys.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    passwords: PasswordService,
    jwt: JwtService,
    placeholder_hash: Arc<str>,
}

impl AuthService {
    /// Create the gateway from its collaborators
    ///
    /// Hashes the timing placeholder, so this is as slow as one password hash.
    pub fn new(
        store: Arc<dyn UserStore>,
        passwords: PasswordService,
        jwt: JwtService,
    ) -> Result<Self, HashError> {
        let placeholder_hash = passwords.hash(TIMING_PLACEHOLDER)?;
        Ok(Self {
            store,
            passwords,
            jwt,
            placeholder_hash: placeholder_hash.into(),
        })
    }

    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    /// Register a new user
    ///
    /// The lookup before insert gives the common duplicate case a cheap
    /// answer; the store's unique constraint still decides concurrent races.
    pub async fn register(&self, req: &RegisterRequest) -> Result<UserResponse, ApiError> {
        req.validate()?;

        if self.store.find_by_email(&req.email).await?.is_some() {
            return Err(ApiError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

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

        info!(user_id = %user.id, "User registered");
        Ok(user.into())
    }

    /// Login with email and password
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ApiError> {
        req.validate()?;
        let password = req.password.expose_secret().clone();

        let Some(user) = self.store.find_by_email(&req.email).await? else {
            // Burn one verification so the response time does not reveal
            // whether the account exists.
            let _ = PasswordService::verify_async(self.placeholder_hash.to_string(), password)
                .await;
            record_login("unknown_email");
            return Err(ApiError::invalid_credentials());
        };

        let valid = PasswordService::verify_async(user.password_hash.clone(), password)
            .await
            .map_err(|e| {
                error!(user_id = %user.id, error = %e, "Stored password hash is unusable");
                ApiError::from(e)
            })?;

        if !valid {
            record_login("wrong_password");
            return Err(ApiError::invalid_credentials());
        }

        let token = self.jwt.issue(user.id, &user.email)?;

        record_login("success");
        info!(user_id = %user.id, "User logged in");

        Ok(LoginResponse {
            token,
            user: user.into(),
        })
    }

    /// Validate a presented token and build the request context
    pub fn authorize(&self, token: &str) -> Result<AuthUser, ApiError> {
        let claims = self.jwt.validate(token).map_err(|e| {
            debug!(reason = %e, "Rejected bearer token");
            ApiError::from(e)
        })?;

        let user_id = claims.user_id().map_err(|e| {
            debug!(reason = %e, "Token subject is not a user id");
            ApiError::authentication_required()
        })?;

        Ok(AuthUser {
            user_id,
            email: claims.email,
        })
    }
}

fn record_login(outcome: &'static str) {
    metrics::counter!("auth_login_total", "outcome" => outcome).increment(1);
}
