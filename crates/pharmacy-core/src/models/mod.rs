//! Wire types exchanged with the pharmacy backend.
//!
//! - `UserProfile`: the authenticated user, keyed by `role`
//! - `LoginResponse`: the body returned by the login endpoint

pub mod user;

pub use user::{LoginResponse, UserProfile};
