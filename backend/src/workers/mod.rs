//! Background tasks

mod user_counter;

pub use user_counter::{count_users_once, spawn_user_counter, UserCounterHandle};
