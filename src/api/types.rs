//! Remote API types: wire shapes, the transport seam and client errors.
//!
//! The remote reservation API is an external collaborator. Everything that
//! crosses that boundary is described here so the client wrapper and the
//! mock transport in tests agree on one shape.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

pub use reqwest::Method;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by remote API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("API request failed: {0}")]
    Request(String),

    /// The request exceeded its timeout.
    #[error("API request timed out")]
    Timeout,

    /// The remote answered with a non-success status, or with an `error`
    /// field in an otherwise successful envelope.
    #[error("API response error: status {status}: {message}")]
    Status { status: u16, code: Option<String>, message: String },

    /// The response body did not have the expected shape.
    #[error("API response parse failed: {0}")]
    Parse(String),

    /// The response parsed but lacked a required value.
    #[error("API response invalid: {0}")]
    InvalidResponse(String),

    /// No refresh token was available for the refresh flow.
    #[error("no refresh token in session")]
    MissingRefreshToken,

    /// The access token expired and could not be refreshed; the session
    /// has been cleared.
    #[error("session expired")]
    SessionExpired,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// Build a status error from a failed response, pulling the message
    /// from `message`, `msg` or `error` in that order.
    #[must_use]
    pub fn from_response(response: &RemoteResponse) -> Self {
        let code = response
            .body
            .get("code")
            .and_then(Value::as_str)
            .map(str::to_owned);
        Self::Status { status: response.status, code, message: remote_message(&response.body) }
    }

    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Request(_) => "E_API_REQUEST",
            Self::Timeout => "E_API_TIMEOUT",
            Self::Status { .. } => "E_API_STATUS",
            Self::Parse(_) => "E_API_PARSE",
            Self::InvalidResponse(_) => "E_API_INVALID",
            Self::MissingRefreshToken => "E_MISSING_REFRESH_TOKEN",
            Self::SessionExpired => "E_SESSION_EXPIRED",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    /// Whether the failure is transient on the remote side. Nothing retries
    /// automatically except the token refresh; this feeds logging only.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Timeout | Self::Status { status: 429 | 500..=599, .. })
    }
}

const FALLBACK_MESSAGE: &str = "API request failed";

/// Human message carried by a remote error body.
pub(crate) fn remote_message(body: &Value) -> String {
    if let Value::String(text) = body {
        if !text.trim().is_empty() {
            return text.clone();
        }
    }
    ["message", "msg", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .filter(|text| !text.is_empty())
        .unwrap_or(FALLBACK_MESSAGE)
        .to_owned()
}

// =============================================================================
// REQUEST / RESPONSE
// =============================================================================

/// One outbound call to the remote API. The bearer token is supplied
/// separately so a request can be replayed with a refreshed token.
#[derive(Debug, Clone)]
pub struct RemoteRequest {
    pub method: Method,
    /// Path relative to the configured base URL, e.g. `/manage/items`.
    pub path: String,
    pub body: Option<Value>,
    /// Overrides the client-wide request timeout.
    pub timeout: Option<Duration>,
}

impl RemoteRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), body: None, timeout: None }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Parse`] if `body` cannot be represented as JSON.
    pub fn json(mut self, body: &impl Serialize) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Parse(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Status and raw JSON body of a remote response. Empty bodies are `Null`,
/// non-JSON bodies are kept as a JSON string.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteResponse {
    pub status: u16,
    pub body: Value,
}

impl RemoteResponse {
    #[must_use]
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// =============================================================================
// TRANSPORT TRAIT
// =============================================================================

/// Sends a single request to the remote API. Enables mocking in tests.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Perform the HTTP call, attaching `bearer` as an `Authorization` header
    /// when present.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Request`] or [`ApiError::Timeout`] when no response
    /// was received. Non-success statuses are returned as `Ok`.
    async fn send(&self, request: &RemoteRequest, bearer: Option<&str>) -> Result<RemoteResponse, ApiError>;
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
