//! JSON API client for the pharmacy backend.
//!
//! This module provides the `RequestClient` for calling backend endpoints.
//! The backend authenticates with a session cookie; mutating requests also
//! carry the CSRF token issued at login.

pub mod client;
pub mod error;
pub mod options;

pub use client::{RequestClient, CSRF_HEADER};
pub use error::ApiError;
pub use options::RequestOptions;
pub use reqwest::Method;
