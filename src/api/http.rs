//! `reqwest` implementation of [`Transport`].

use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use super::types::{ApiError, RemoteRequest, RemoteResponse, Transport};
use crate::config::ApiTimeouts;

pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the TLS backend cannot be
    /// initialised.
    pub fn new(base_url: &str, timeouts: ApiTimeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &RemoteRequest, bearer: Option<&str>) -> Result<RemoteResponse, ApiError> {
        let url = join_url(&self.base_url, &request.path);
        let mut builder = self.http.request(request.method.clone(), url);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(map_send_error)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(map_send_error)?;
        debug!(method = %request.method, path = %request.path, status, "remote api response");

        Ok(RemoteResponse::new(status, parse_body(&text)))
    }
}

fn map_send_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() { ApiError::Timeout } else { ApiError::Request(err.to_string()) }
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    if path.starts_with('/') {
        format!("{base_url}{path}")
    } else {
        format!("{base_url}/{path}")
    }
}

/// Empty bodies become `Null`; bodies that are not JSON are kept as a string.
pub(crate) fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
