//! Client for the pharmacy backend's JSON API.
//!
//! Every call sends the cookie jar, attaches the CSRF token to mutating
//! requests and turns the response into a `serde_json::Value` or an
//! `ApiError`.

use std::time::Duration;

use reqwest::{header, Client, Method};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::{Credentials, SessionContext};
use crate::config::Config;
use crate::models::LoginResponse;

use super::{ApiError, RequestOptions};

// ============================================================================
// Constants
// ============================================================================

/// Anti-forgery header attached to mutating requests
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Default endpoint for login
pub const LOGIN_ENDPOINT: &str = "login";

/// Default endpoint for the backend's session check
pub const SESSION_STATUS_ENDPOINT: &str = "session_status";

/// API client for the pharmacy backend.
/// Clone is cheap - reqwest::Client and the session are reference counted.
#[derive(Clone)]
pub struct RequestClient {
    client: Client,
    base_url: String,
    login_endpoint: String,
    session_status_endpoint: String,
    session: SessionContext,
}

impl RequestClient {
    /// Create a client for `base_url` with default endpoint names
    pub fn new(base_url: &str, session: SessionContext) -> Result<Self, ApiError> {
        let client = Client::builder().cookie_store(true).build()?;
        Ok(Self::with_http_client(client, base_url, session))
    }

    /// Create a client from the loaded configuration
    pub fn from_config(config: &Config, session: SessionContext) -> Result<Self, ApiError> {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let mut api = Self::with_http_client(builder.build()?, &config.api_base_url, session);
        api.login_endpoint = config.login_endpoint.clone();
        api.session_status_endpoint = config.session_status_endpoint.clone();
        Ok(api)
    }

    fn with_http_client(client: Client, base_url: &str, session: SessionContext) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            login_endpoint: LOGIN_ENDPOINT.to_string(),
            session_status_endpoint: SESSION_STATUS_ENDPOINT.to_string(),
            session,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    async fn headers(&self, options: &RequestOptions) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        for (name, value) in &options.headers {
            let name = header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ApiError::InvalidHeader(name.clone()))?;
            let value = header::HeaderValue::from_str(value)
                .map_err(|_| ApiError::InvalidHeader(name.as_str().to_string()))?;
            headers.insert(name, value);
        }

        if options.is_mutating() {
            if let Some(token) = self.session.csrf_token().await {
                let value = header::HeaderValue::from_str(&token)
                    .map_err(|_| ApiError::InvalidHeader(CSRF_HEADER.to_string()))?;
                headers.insert(header::HeaderName::from_static("x-csrf-token"), value);
            }
        }

        Ok(headers)
    }

    /// Perform one call against `endpoint` and return the parsed JSON body.
    ///
    /// The body is read as text and parsed before the status is checked, so
    /// a non-JSON body is always `MalformedResponse`.
    pub async fn request(&self, endpoint: &str, options: RequestOptions) -> Result<Value, ApiError> {
        let url = self.url(endpoint);
        let headers = self.headers(&options).await?;
        debug!(method = %options.method, url = %url, "Sending request");

        let mut builder = self
            .client
            .request(options.method.clone(), &url)
            .headers(headers);
        if let Some(body) = options.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.inspect_err(|e| {
            warn!(url = %url, error = %e, "Request failed to send");
        })?;

        let status = response.status();
        let text = response.text().await?;

        let body: Value = serde_json::from_str(&text).map_err(|e| {
            warn!(url = %url, status = %status, error = %e, "Response is not JSON");
            ApiError::malformed(&text)
        })?;

        if !status.is_success() {
            let err = ApiError::from_status(status, &body);
            warn!(url = %url, status = %status, error = %err, "Request rejected");
            return Err(err);
        }

        Ok(body)
    }

    /// GET `endpoint` and decode the body as `T`
    pub async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let value = self.request(endpoint, RequestOptions::get()).await?;
        Self::decode(value)
    }

    /// Send `body` as JSON with `method` and decode the response as `T`
    pub async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let options = RequestOptions::default().with_method(method).with_json(body)?;
        let value = self.request(endpoint, options).await?;
        Self::decode(value)
    }

    fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
        <T as Deserialize>::deserialize(&value).map_err(|_| ApiError::malformed(&value.to_string()))
    }

    /// Ask the backend whether the current cookie session is still valid.
    /// The shape of the answer belongs to the backend.
    pub async fn check_session(&self) -> Result<Value, ApiError> {
        self.request(&self.session_status_endpoint, RequestOptions::default())
            .await
    }

    /// POST credentials to the login endpoint
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.send_json(Method::POST, &self.login_endpoint, credentials)
            .await
    }
}
