//! User stores
//!
//! Provides the persistence seam used by the auth gateway and user service.

pub mod memory;
pub mod postgres;
pub mod timeout;
pub mod user;

pub use memory::InMemoryUserStore;
pub use postgres::PgUserStore;
pub use timeout::TimeoutUserStore;
pub use user::{NewUser, StoreError, UserChanges, UserRecord, UserStore};
