//! Per-call request configuration.

use std::collections::BTreeMap;

use reqwest::Method;
use serde::Serialize;

use super::ApiError;

/// Options for a single API call. Built fresh for every request.
///
/// Cookies are always sent: the client keeps a cookie jar, so there is no
/// credentials setting to turn off.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: BTreeMap::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self::default().with_method(Method::POST)
    }

    pub fn put() -> Self {
        Self::default().with_method(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::default().with_method(Method::DELETE)
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Serialize `body` as the JSON payload
    pub fn with_json<B: Serialize + ?Sized>(self, body: &B) -> Result<Self, ApiError> {
        let encoded = serde_json::to_string(body).map_err(ApiError::Encode)?;
        let mut options = self.with_header("Content-Type", "application/json");
        options.body = Some(encoded);
        Ok(options)
    }

    /// Anything other than GET may change server state
    pub fn is_mutating(&self) -> bool {
        self.method != Method::GET
    }
}
