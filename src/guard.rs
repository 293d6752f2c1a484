//! Route guard: cookie presence check plus a live role check for admin pages.
//!
//! SYSTEM CONTEXT
//! ==============
//! Installed with `middleware::from_fn_with_state` in front of the page
//! router only; action endpoints and API proxies enforce auth through the
//! remote API itself. The role check is never cached, so every admin
//! navigation costs one `GET /user/data`.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, info, warn};

use crate::api::models::UserData;
use crate::api::{ApiClient, RemoteRequest, USER_DATA};
use crate::config::CookieSettings;
use crate::session::{ACCESS_TOKEN_COOKIE, clear_cookies};
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/auth/login";
pub const SIGNUP_PATH: &str = "/auth/signup";
pub const VERIFY_EMAIL_PATH: &str = "/auth/verify-email";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const USER_DASHBOARD_PATH: &str = "/dashboard/user";
pub const STAFF_DASHBOARD_PATH: &str = "/dashboard/admin";
pub const ADMIN_DASHBOARD_PATH: &str = "/admin/dashboard";
pub const RESERVATION_PATH: &str = "/reservation";

const ADMIN_PREFIX: &str = "/admin";
const GUARDED_PREFIXES: [&str; 4] = [DASHBOARD_PATH, ADMIN_PREFIX, "/auth", RESERVATION_PATH];
const PUBLIC_PATHS: [&str; 2] = [LOGIN_PATH, SIGNUP_PATH];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Pass,
    Login { clear_cookies: bool },
    Dashboard,
}

/// `path` equals `prefix` or lies below it.
#[must_use]
pub fn under_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[must_use]
pub fn required_access(path: &str) -> Access {
    if PUBLIC_PATHS.contains(&path) {
        return Access::Public;
    }
    if under_prefix(path, ADMIN_PREFIX) {
        return Access::Admin;
    }
    if GUARDED_PREFIXES.iter().any(|prefix| under_prefix(path, prefix)) {
        Access::Authenticated
    } else {
        Access::Public
    }
}

/// Decide what to do with a navigation to `path` carrying `token`.
pub async fn decide(api: &ApiClient, path: &str, token: Option<&str>) -> Decision {
    let access = required_access(path);
    if access == Access::Public {
        return Decision::Pass;
    }
    let Some(token) = token.filter(|t| !t.is_empty()) else {
        debug!(path, "no access token; redirecting to login");
        return Decision::Login { clear_cookies: false };
    };
    if access == Access::Authenticated {
        return Decision::Pass;
    }

    match api.send_once(&RemoteRequest::get(USER_DATA), Some(token)).await {
        Ok(envelope) => match envelope.data_opt::<UserData>() {
            Some(user) if user.grade.is_admin() => Decision::Pass,
            _ => {
                info!(path, "admin area denied; redirecting to dashboard");
                Decision::Dashboard
            }
        },
        Err(e) => {
            warn!(path, error = %e, "role check failed; clearing session");
            Decision::Login { clear_cookies: true }
        }
    }
}

/// Response for a non-passing decision; `None` lets the request through.
#[must_use]
pub fn redirect_for(decision: Decision, jar: CookieJar, cookies: &CookieSettings) -> Option<Response> {
    match decision {
        Decision::Pass => None,
        Decision::Login { clear_cookies: true } => {
            Some((clear_cookies(jar, cookies), Redirect::temporary(LOGIN_PATH)).into_response())
        }
        Decision::Login { clear_cookies: false } => Some(Redirect::temporary(LOGIN_PATH).into_response()),
        Decision::Dashboard => Some(Redirect::temporary(DASHBOARD_PATH).into_response()),
    }
}

pub async fn route_guard(State(state): State<AppState>, jar: CookieJar, request: Request, next: Next) -> Response {
    let path = request.uri().path().to_owned();
    let token = jar.get(ACCESS_TOKEN_COOKIE).map(|c| c.value().to_owned());

    let decision = decide(&state.api, &path, token.as_deref()).await;
    match redirect_for(decision, jar, &state.config.cookies) {
        Some(redirect) => redirect,
        None => next.run(request).await,
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
