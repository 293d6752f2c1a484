//! Token-aware client for the remote reservation API.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::Envelope;
use super::http::HttpTransport;
use super::models::RefreshTokens;
use super::types::{ApiError, RemoteRequest, RemoteResponse, Transport};
use super::AUTH_REFRESH;
use crate::config::AppConfig;
use crate::session::Session;

const TOKEN_EXPIRED_CODE: &str = "AUTH_TOKEN_EXPIRED";

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(&config.api_base_url, config.timeouts)?;
        Ok(Self::new(Arc::new(transport)))
    }

    /// One call, no refresh. Used for anonymous endpoints, the refresh call
    /// itself and the route guard's role check.
    ///
    /// # Errors
    ///
    /// Returns the transport error, or [`ApiError::Status`] for a
    /// non-success status or an envelope carrying `error`.
    pub async fn send_once(&self, request: &RemoteRequest, bearer: Option<&str>) -> Result<Envelope, ApiError> {
        let response = self.transport.send(request, bearer).await?;
        into_envelope(request, response)
    }

    /// Anonymous call (login, signup, email verification).
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::send_once`].
    pub async fn fetch_public(&self, request: RemoteRequest) -> Result<Envelope, ApiError> {
        self.send_once(&request, None).await
    }

    /// Authenticated call with the session's access token.
    ///
    /// A 401 that signals an expired token triggers at most one refresh and
    /// one replay. Concurrent calls sharing `session` refresh once between
    /// them: a call that finds the token already rotated by another just
    /// replays. If the refresh fails the session is cleared and
    /// [`ApiError::SessionExpired`] is returned; a failed replay returns its
    /// own error.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::send_once`], plus [`ApiError::SessionExpired`].
    pub async fn fetch(&self, session: &Session, request: RemoteRequest) -> Result<Envelope, ApiError> {
        let sent_with = session.access_token();
        let response = self.transport.send(&request, sent_with.as_deref()).await?;
        if response.status != 401 || !signals_expired_token(&response.body) {
            return into_envelope(&request, response);
        }

        let token = {
            let _gate = session.refresh_gate().await;
            if session.is_cleared() {
                return Err(ApiError::SessionExpired);
            }
            let current = session.access_token();
            if current != sent_with {
                debug!(method = %request.method, path = %request.path, "access token already refreshed; replaying");
                current
            } else {
                info!(method = %request.method, path = %request.path, "access token expired; refreshing");
                if let Err(e) = self.refresh(session).await {
                    warn!(error = %e, "token refresh failed; clearing session");
                    session.clear();
                    return Err(ApiError::SessionExpired);
                }
                session.access_token()
            }
        };

        let replay = self.transport.send(&request, token.as_deref()).await?;
        into_envelope(&request, replay)
    }

    /// Exchange the session's refresh token for a new access token and store
    /// it (plus a rotated refresh token when the remote returns one).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingRefreshToken`] without a refresh token,
    /// [`ApiError::InvalidResponse`] when the answer has no access token, or
    /// the error of the refresh call.
    pub async fn refresh(&self, session: &Session) -> Result<(), ApiError> {
        let refresh = session.refresh_token().ok_or(ApiError::MissingRefreshToken)?;
        let envelope = self
            .send_once(&RemoteRequest::post(AUTH_REFRESH), Some(&refresh))
            .await?;
        let tokens: RefreshTokens = envelope.data_as()?;
        if tokens.access_token.trim().is_empty() {
            return Err(ApiError::InvalidResponse("refresh response has no access_token".into()));
        }
        session.rotate(tokens.access_token, tokens.refresh_token);
        Ok(())
    }
}

fn into_envelope(request: &RemoteRequest, response: RemoteResponse) -> Result<Envelope, ApiError> {
    if !response.is_success() {
        let err = ApiError::from_response(&response);
        warn!(
            method = %request.method,
            path = %request.path,
            status = response.status,
            code = err.error_code(),
            retryable = err.retryable(),
            error = %err,
            "remote api error"
        );
        return Err(err);
    }
    Envelope::from(response).checked()
}

/// Whether a 401 body reports an expired access token rather than a bad one.
#[must_use]
pub fn signals_expired_token(body: &Value) -> bool {
    if body.get("code").and_then(Value::as_str) == Some(TOKEN_EXPIRED_CODE) {
        return true;
    }
    ["msg", "message"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(Value::as_str))
        .any(|text| text.to_ascii_lowercase().contains("expired"))
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
