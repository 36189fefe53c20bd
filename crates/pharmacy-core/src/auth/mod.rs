//! Session and credential handling.
//!
//! This module provides:
//! - `SessionContext`: the shared session (CSRF token + user profile) handed
//!   to both the request client and the login flow
//! - `SessionStore`: where that session is persisted between runs
//! - `Credentials`: one login attempt's username and password

pub mod credentials;
pub mod session;

pub use credentials::Credentials;
pub use session::{FileSessionStore, MemorySessionStore, SessionContext, SessionData, SessionStore};
