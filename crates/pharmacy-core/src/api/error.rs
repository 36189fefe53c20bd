use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {}", error_chain(.0))]
    Network(#[from] reqwest::Error),

    #[error("Invalid response from server: {snippet}")]
    MalformedResponse { snippet: String },

    /// Non-2xx status, or a failure reported by the backend in a 2xx body
    /// (`status` is `None` in that case).
    #[error("{message}")]
    RequestFailed { status: Option<u16>, message: String },

    #[error("{0}")]
    Validation(String),

    #[error("Invalid header {0}")]
    InvalidHeader(String),

    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Render an error and its causes as `outer: cause: root cause`.
/// reqwest keeps the useful part (e.g. "Connection refused") in the source chain.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !rendered.contains(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        source = cause.source();
    }
    rendered
}

/// Number of characters of a raw body kept for diagnostics
const MAX_SNIPPET_CHARS: usize = 100;

impl ApiError {
    /// Keep the first characters of a body that failed to parse
    pub fn malformed(body: &str) -> Self {
        ApiError::MalformedResponse {
            snippet: body.chars().take(MAX_SNIPPET_CHARS).collect(),
        }
    }

    /// Build the error for a non-2xx response.
    /// Prefers the backend's `message` field over the generic status line.
    pub fn from_status(status: reqwest::StatusCode, body: &serde_json::Value) -> Self {
        let message = body
            .get("message")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| {
                format!(
                    "HTTP {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("")
                )
                .trim_end()
                .to_string()
            });

        ApiError::RequestFailed {
            status: Some(status.as_u16()),
            message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            ApiError::RequestFailed { status, .. } => *status,
            _ => None,
        }
    }
}
