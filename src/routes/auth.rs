//! Session action endpoints and the `/api` auth proxies.
//!
//! DESIGN
//! ======
//! `/actions/*` handlers take urlencoded forms from the login and signup
//! pages and answer with redirects or small JSON results. `/api/*` handlers
//! take JSON and always answer with JSON, including on session loss, so
//! script callers never receive a login redirect.

use std::time::Duration;

use axum::extract::{Form, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use super::finish;
use crate::api::models::{SignupResult, UserData};
use crate::error::{AppError, ErrorCode, required};
use crate::guard::LOGIN_PATH;
use crate::services::auth::{self as auth_svc, VerifyTarget};
use crate::session::{self, Session};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyForm {
    pub email: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailForm {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub success: bool,
    pub user: SignupResult,
    pub verification_sent: bool,
}

/// Body returned by the login proxy.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyLoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserData,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

// =============================================================================
// FORM ACTIONS
// =============================================================================

/// `POST /actions/login`: issue cookies, then redirect to the role's
/// landing page.
pub async fn login(State(state): State<AppState>, jar: CookieJar, Form(form): Form<LoginForm>) -> Response {
    let session = Session::default();
    let result = async {
        let email = required("email", &form.email)?;
        let password = required("password", &form.password)?;
        let outcome = auth_svc::login(&state.api, &session, email, password, None).await?;
        Ok::<_, AppError>(Redirect::to(outcome.redirect_to))
    }
    .await;
    finish(&state, &session, jar, result)
}

/// `POST /actions/logout`.
pub async fn logout(State(state): State<AppState>, jar: CookieJar, session: Session) -> Response {
    auth_svc::logout(&state.api, &session).await;
    finish(&state, &session, jar, Ok::<_, AppError>(Redirect::to(LOGIN_PATH)))
}

/// `POST /actions/signup`: create the account and request the verification
/// mail. A failed mail request does not undo the signup.
pub async fn signup(State(state): State<AppState>, jar: CookieJar, Form(form): Form<SignupForm>) -> Response {
    let session = Session::default();
    let result = async {
        let email = required("email", &form.email)?;
        let password = required("password", &form.password)?;
        let name = required("name", &form.name)?;
        let user = auth_svc::signup(&state.api, email, password, name).await?;
        let verification_sent = match auth_svc::verify_email(&state.api, &VerifyTarget::Email(email.to_owned())).await {
            Ok(_) => true,
            Err(e) => {
                warn!(%email, error = %e, "verification email request failed after signup");
                false
            }
        };
        Ok::<_, AppError>((StatusCode::CREATED, Json(SignupResponse { success: true, user, verification_sent })))
    }
    .await;
    finish(&state, &session, jar, result)
}

/// `POST /actions/verify-email`: a token confirms, an email (re)requests.
pub async fn verify_email(State(state): State<AppState>, jar: CookieJar, Form(form): Form<VerifyForm>) -> Response {
    let session = Session::default();
    let result = async {
        let target = match (blank_to_none(form.token), blank_to_none(form.email)) {
            (Some(token), _) => VerifyTarget::Token(token),
            (None, Some(email)) => VerifyTarget::Email(email),
            (None, None) => return Err(AppError::required_field("token")),
        };
        let body = auth_svc::verify_email(&state.api, &target).await?;
        Ok::<_, AppError>(Json(json!({ "success": true, "message": body.message })))
    }
    .await;
    finish(&state, &session, jar, result)
}

/// `POST /actions/resend-verification`: always 200; the outcome says
/// whether the remote accepted it.
pub async fn resend_verification(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<EmailForm>,
) -> Response {
    let session = Session::default();
    let result = async {
        let email = required("email", &form.email)?;
        Ok::<_, AppError>(Json(auth_svc::resend_verification(&state.api, email).await))
    }
    .await;
    finish(&state, &session, jar, result)
}

/// `POST /actions/refresh`: rotate the access token cookie.
pub async fn refresh(State(state): State<AppState>, jar: CookieJar, session: Session) -> Response {
    let result = match auth_svc::refresh_token(&state.api, &session).await {
        Some(_) => Ok(Json(json!({ "success": true }))),
        None => Err(AppError::session_expired()),
    };
    finish(&state, &session, jar, result)
}

// =============================================================================
// API PROXIES
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ProxyCredentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// `POST /api/auth/login`: tokens in the body and as cookies.
pub async fn proxy_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<ProxyCredentials>,
) -> Response {
    let session = Session::default();
    let timeout = Duration::from_secs(state.config.timeouts.login_proxy_secs);
    let result = async {
        let email = required("email", &body.email)?;
        let password = required("password", &body.password)?;
        let outcome = auth_svc::login(&state.api, &session, email, password, Some(timeout)).await?;
        Ok::<_, AppError>(Json(ProxyLoginResponse {
            access_token: session.access_token().unwrap_or_default(),
            refresh_token: session.refresh_token().unwrap_or_default(),
            user: outcome.user,
        }))
    }
    .await
    .map_err(AppError::without_redirect);
    finish(&state, &session, jar, result)
}

/// `POST /api/auth/logout`.
pub async fn proxy_logout(State(state): State<AppState>, jar: CookieJar, session: Session) -> Response {
    auth_svc::logout(&state.api, &session).await;
    finish(&state, &session, jar, Ok::<_, AppError>(Json(json!({ "success": true }))))
}

/// `GET /api/auth/verify?token=`.
pub async fn proxy_verify(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<TokenQuery>,
) -> Response {
    let session = Session::default();
    let result = async {
        let token = blank_to_none(query.token).ok_or_else(|| AppError::required_field("token"))?;
        let body = auth_svc::verify_email(&state.api, &VerifyTarget::Token(token)).await?;
        Ok::<_, AppError>(Json(json!({ "success": true, "message": body.message })))
    }
    .await
    .map_err(AppError::without_redirect);
    finish(&state, &session, jar, result)
}

/// `GET /api/user/data`: requires `Authorization: Bearer`. There is no
/// refresh token on this path, so an expired token ends in a JSON 401.
pub async fn proxy_user_data(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(token) = session::bearer_token(&headers) else {
        return AppError::new(ErrorCode::AuthUnauthorized, "missing bearer token").into_response();
    };
    let session = Session::new(Some(token), None);
    match auth_svc::get_user_data(&state.api, &session).await {
        Ok(user) => Json(json!({ "success": true, "data": user })).into_response(),
        Err(e) => {
            let err = AppError::from(e).without_redirect();
            warn!(code = err.code.as_str(), detail = %err.detail, "user data proxy failed");
            err.into_response()
        }
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
