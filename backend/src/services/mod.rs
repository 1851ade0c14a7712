//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! the user store, the password hasher and the token service.

pub mod auth;
pub mod user;

pub use auth::AuthService;
pub use user::UserService;
