//! API request and response types

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{
    check_field, validate_email, validate_name, validate_password, ValidationError,
};

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Registration request
///
/// Also used by the authenticated "create user" operation.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: SecretString,
}

impl RegisterRequest {
    /// Check input shape before any lookup or hashing happens
    pub fn validate(&self) -> Result<(), ValidationError> {
        use secrecy::ExposeSecret;

        check_field("name", validate_name(&self.name))?;
        check_field("email", validate_email(&self.email))?;
        check_field("password", validate_password(self.password.expose_secret()))?;
        Ok(())
    }
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
}

impl LoginRequest {
    /// Shape check only; credential rules are not revealed here
    pub fn validate(&self) -> Result<(), ValidationError> {
        use secrecy::ExposeSecret;

        check_field("email", validate_email(&self.email))?;
        if self.password.expose_secret().is_empty() {
            return Err(ValidationError::new("password", "Password cannot be empty"));
        }
        Ok(())
    }
}

/// Partial update of a user record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UpdateUserRequest {
    /// Drop empty strings so they count as "not provided"
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.filter(|n| !n.is_empty()),
            email: self.email.filter(|e| !e.is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }

    /// Validate whichever fields are present
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            check_field("name", validate_name(name))?;
        }
        if let Some(email) = &self.email {
            check_field("email", validate_email(email))?;
        }
        Ok(())
    }
}

/// Public view of a user, never carries the password hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Response to a successful registration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: UserResponse,
}

/// Response to a successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

/// Plain acknowledgement message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
