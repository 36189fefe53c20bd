//! Client library for the pharmacy management backend.
//!
//! - `api`: JSON request client with CSRF and cookie handling
//! - `auth`: session context, session storage and credentials
//! - `login`: login form lifecycle and role-based redirects
//! - `config`: client configuration
//! - `models`: wire types

pub mod api;
pub mod auth;
pub mod config;
pub mod login;
pub mod models;

pub use api::{ApiError, RequestClient, RequestOptions};
pub use auth::{Credentials, SessionContext};
pub use config::Config;
pub use login::{LoginFlow, LoginForm, PageResolver};
