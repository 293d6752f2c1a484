//! Session actions: login, logout, token refresh, signup, email verification.
//!
//! Each action performs its remote call(s) and records token changes on the
//! [`Session`]; the route layer turns those changes into cookies.

use std::time::Duration;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::api::models::{
    Credentials, LoginTokens, MessageBody, Role, SignupRequest, SignupResult, UserData,
};
use crate::api::{
    ApiClient, ApiError, AUTH_LOGIN, AUTH_LOGOUT, AUTH_RESEND_VERIFICATION, AUTH_SIGNUP, AUTH_VERIFY_EMAIL,
    RemoteRequest, USER_DATA,
};
use crate::guard::{ADMIN_DASHBOARD_PATH, DASHBOARD_PATH};
use crate::session::Session;

const INVALID_CREDENTIALS_CODE: &str = "AUTH_INVALID_CREDENTIALS";
const RESEND_OK_MESSAGE: &str = "Verification email sent again.";
const RESEND_FAILED_MESSAGE: &str = "Could not resend the verification email.";

/// Landing page after login for `role`.
#[must_use]
pub fn dashboard_path(role: Role) -> &'static str {
    if role.is_admin() { ADMIN_DASHBOARD_PATH } else { DASHBOARD_PATH }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginOutcome {
    pub user: UserData,
    pub redirect_to: &'static str,
}

/// Result shape for actions that report rather than fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
}

/// What `verify_email` asks the remote to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyTarget {
    /// Send a verification mail to this address (right after signup).
    Email(String),
    /// Confirm the token from the mailed link.
    Token(String),
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum VerifyBody<'a> {
    Email(&'a str),
    Token(&'a str),
}

// =============================================================================
// LOGIN / LOGOUT
// =============================================================================

/// Exchange credentials for a token pair, store it, then load the user to
/// pick the landing page. `timeout` overrides the client-wide timeout.
///
/// # Errors
///
/// Returns the remote failure (an unqualified 401 is reported as
/// `AUTH_INVALID_CREDENTIALS`), or [`ApiError::InvalidResponse`] when either
/// token is missing.
pub async fn login(
    api: &ApiClient,
    session: &Session,
    email: &str,
    password: &str,
    timeout: Option<Duration>,
) -> Result<LoginOutcome, ApiError> {
    info!(%email, "login attempt");

    let mut request = RemoteRequest::post(AUTH_LOGIN).json(&Credentials { email, password })?;
    if let Some(timeout) = timeout {
        request = request.timeout(timeout);
    }
    let envelope = api.fetch_public(request).await.map_err(|e| {
        warn!(%email, error = %e, "login rejected");
        credentials_error(e)
    })?;

    let tokens: LoginTokens = envelope.data_as()?;
    if tokens.access_token.trim().is_empty() || tokens.refresh_token.trim().is_empty() {
        error!(%email, "login response is missing tokens");
        return Err(ApiError::InvalidResponse("login response is missing tokens".into()));
    }
    session.issue(tokens.access_token, tokens.refresh_token);

    let user = get_user_data(api, session).await?;
    let redirect_to = dashboard_path(user.grade);
    info!(%email, role = %user.grade, redirect_to, "login succeeded");
    Ok(LoginOutcome { user, redirect_to })
}

fn credentials_error(err: ApiError) -> ApiError {
    match err {
        ApiError::Status { status: 401, code: None, message } => {
            ApiError::Status { status: 401, code: Some(INVALID_CREDENTIALS_CODE.to_owned()), message }
        }
        other => other,
    }
}

/// Best-effort remote logout, then drop both tokens.
pub async fn logout(api: &ApiClient, session: &Session) {
    if let Some(token) = session.access_token() {
        if let Err(e) = api.send_once(&RemoteRequest::post(AUTH_LOGOUT), Some(&token)).await {
            warn!(error = %e, "remote logout failed; clearing session anyway");
        }
    }
    session.clear();
    info!("logged out");
}

/// Refresh the access token. Any failure clears the session and yields
/// `None`.
pub async fn refresh_token(api: &ApiClient, session: &Session) -> Option<String> {
    if session.refresh_token().is_none() {
        warn!("no refresh token; clearing session");
        session.clear();
        return None;
    }
    match api.refresh(session).await {
        Ok(()) => session.access_token(),
        Err(e) => {
            warn!(error = %e, "token refresh failed; clearing session");
            session.clear();
            None
        }
    }
}

// =============================================================================
// USER
// =============================================================================

/// # Errors
///
/// Returns the remote failure, or [`ApiError::InvalidResponse`] if the user
/// lacks `id`, `email` or `name`.
pub async fn get_user_data(api: &ApiClient, session: &Session) -> Result<UserData, ApiError> {
    let envelope = api.fetch(session, RemoteRequest::get(USER_DATA)).await?;
    envelope.data_as::<UserData>()?.validate()
}

/// Whether the current user is an admin. Errors count as "no".
pub async fn check_admin_access(api: &ApiClient, session: &Session) -> bool {
    match get_user_data(api, session).await {
        Ok(user) => user.grade.is_admin(),
        Err(e) => {
            warn!(error = %e, "admin access check failed");
            false
        }
    }
}

// =============================================================================
// SIGNUP / VERIFICATION
// =============================================================================

/// # Errors
///
/// Returns the remote failure or a parse error.
pub async fn signup(api: &ApiClient, email: &str, password: &str, name: &str) -> Result<SignupResult, ApiError> {
    info!(%email, %name, "signup attempt");
    let request = RemoteRequest::post(AUTH_SIGNUP).json(&SignupRequest { email, password, name })?;
    let result: SignupResult = api.fetch_public(request).await?.data_as()?;
    info!(%email, user_id = result.id, "signup succeeded");
    Ok(result)
}

/// # Errors
///
/// Returns the remote failure.
pub async fn verify_email(api: &ApiClient, target: &VerifyTarget) -> Result<MessageBody, ApiError> {
    let body = match target {
        VerifyTarget::Email(email) => {
            info!(%email, "requesting verification email");
            VerifyBody::Email(email)
        }
        VerifyTarget::Token(token) => VerifyBody::Token(token),
    };
    let envelope = api
        .fetch_public(RemoteRequest::post(AUTH_VERIFY_EMAIL).json(&body)?)
        .await?;
    Ok(envelope.data_opt().unwrap_or_default())
}

/// Ask the remote to send the verification mail again. Never fails.
pub async fn resend_verification(api: &ApiClient, email: &str) -> ActionOutcome {
    info!(%email, "resending verification email");
    let result = match RemoteRequest::post(AUTH_RESEND_VERIFICATION).json(&VerifyBody::Email(email)) {
        Ok(request) => api.fetch_public(request).await.map(|_| ()),
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => ActionOutcome { success: true, message: RESEND_OK_MESSAGE.to_owned() },
        Err(e) => {
            warn!(%email, error = %e, "resend verification failed");
            ActionOutcome { success: false, message: RESEND_FAILED_MESSAGE.to_owned() }
        }
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
