//! Authentication module
//!
//! Provides JWT-based authentication with argon2 (or bcrypt) password hashing.

mod jwt;
mod middleware;
mod password;

pub use jwt::{Claims, JwtService, TokenError, DEFAULT_TOKEN_EXPIRY_SECS};
pub use middleware::{auth_middleware, bearer_token, AuthUser};
pub use password::{HashError, PasswordService};
