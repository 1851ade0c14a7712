//! JWT token generation and validation
//!
//! Issues HS256 identity tokens and validates them with an explicit
//! algorithm-family check. Keys are pre-computed once at startup.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Default token lifetime: 24 hours
pub const DEFAULT_TOKEN_EXPIRY_SECS: i64 = 24 * 60 * 60;

/// HMAC algorithms accepted on validation. Tokens are issued as HS256.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] =
    [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Subject email
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::Malformed)
    }
}

/// Token errors
///
/// `BadSignature` covers both a tampered token and one signed with another
/// key; the two cannot be told apart.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid or uses a disallowed algorithm")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Pre-computed JWT keys for efficient token operations
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    /// Create new JWT keys from secret
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// JWT service for token operations
///
/// The secret is process-wide and never rotated: leaking it lets anyone
/// mint tokens until the process is restarted with a new secret, and there is
/// no revocation besides expiry.
#[derive(Clone)]
pub struct JwtService {
    keys: Option<JwtKeys>,
    expiry_secs: i64,
}

impl JwtService {
    /// Create a JWT service with pre-computed keys
    ///
    /// An empty secret leaves the service without keys: issuing fails with
    /// [`TokenError::Signing`] and every token is rejected.
    pub fn new(secret: &str, expiry_secs: i64) -> Self {
        Self {
            keys: (!secret.is_empty()).then(|| JwtKeys::new(secret)),
            expiry_secs,
        }
    }

    /// Token lifetime in seconds
    #[inline]
    pub fn expiry_secs(&self) -> i64 {
        self.expiry_secs
    }

    /// Issue a token for a user, valid from now
    #[inline]
    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String, TokenError> {
        self.issue_at(user_id, email, Utc::now())
    }

    /// Issue a token as if it had been issued at `issued_at`
    pub fn issue_at(
        &self,
        user_id: Uuid,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let keys = self.keys.as_ref().ok_or_else(|| {
            TokenError::Signing("signing secret is not configured".to_string())
        })?;

        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::seconds(self.expiry_secs)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Validate a token and return its claims
    ///
    /// Checks, in order: structure, declared algorithm (HMAC family only),
    /// signature, expiry (`exp >= now`, no leeway).
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let algorithm = declared_algorithm(token)?;
        if !ACCEPTED_ALGORITHMS.contains(&algorithm) {
            return Err(TokenError::BadSignature);
        }

        let keys = self.keys.as_ref().ok_or(TokenError::BadSignature)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let token_data = decode::<Claims>(token, &keys.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::BadSignature
                }
                _ => TokenError::Malformed,
            }
        })?;

        Ok(token_data.claims)
    }
}

/// Read the `alg` field from the token header without trusting anything else
///
/// Unknown algorithm names (including `none`) are reported as
/// `BadSignature`, since a header that parses but names a foreign algorithm
/// is an algorithm-substitution attempt rather than garbage.
fn declared_algorithm(token: &str) -> Result<Algorithm, TokenError> {
    let mut parts = token.split('.');
    let (Some(header), Some(_payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed);
    };

    let raw = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| TokenError::Malformed)?;
    let header: RawHeader = serde_json::from_slice(&raw).map_err(|_| TokenError::Malformed)?;

    header
        .alg
        .parse::<Algorithm>()
        .map_err(|_| TokenError::BadSignature)
}
