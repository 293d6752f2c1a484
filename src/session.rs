//! Per-request token session.
//!
//! DESIGN
//! ======
//! The browser holds the remote API's token pair in two HTTP-only cookies.
//! A `Session` is built from those cookies at the start of each request,
//! mutated by server actions (login issues, refresh rotates, logout and a
//! failed refresh clear) and written back onto the response `CookieJar` by
//! the handler. Page loaders share one `&Session` across concurrent remote
//! calls, so the tokens sit behind a short-lived `Mutex` that is never held
//! across an await. A separate async gate makes token refresh single-flight:
//! concurrent calls that hit an expired token queue on it, and only the
//! first one talks to `/auth/refresh`.

use std::convert::Infallible;
use std::sync::{Mutex, MutexGuard, PoisonError};

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::config::CookieSettings;

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

#[derive(Debug, Default)]
struct Tokens {
    access: Option<String>,
    refresh: Option<String>,
    /// Tokens changed and must be written back.
    dirty: bool,
    /// Tokens were removed and both cookies must be deleted.
    cleared: bool,
}

#[derive(Debug, Default)]
pub struct Session {
    tokens: Mutex<Tokens>,
    refresh_gate: tokio::sync::Mutex<()>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Session {
    /// Empty values count as absent.
    #[must_use]
    pub fn new(access: Option<String>, refresh: Option<String>) -> Self {
        Self {
            tokens: Mutex::new(Tokens {
                access: non_empty(access),
                refresh: non_empty(refresh),
                ..Tokens::default()
            }),
            refresh_gate: tokio::sync::Mutex::new(()),
        }
    }

    #[must_use]
    pub fn from_jar(jar: &CookieJar) -> Self {
        let read = |name: &str| jar.get(name).map(|c| c.value().to_owned());
        Self::new(read(ACCESS_TOKEN_COOKIE), read(REFRESH_TOKEN_COOKIE))
    }

    fn lock(&self) -> MutexGuard<'_, Tokens> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.lock().access.clone()
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.lock().refresh.clone()
    }

    #[must_use]
    pub fn has_access_token(&self) -> bool {
        self.lock().access.is_some()
    }

    /// Store a freshly issued token pair (login).
    pub fn issue(&self, access: String, refresh: String) {
        let mut tokens = self.lock();
        tokens.access = non_empty(Some(access));
        tokens.refresh = non_empty(Some(refresh));
        tokens.dirty = true;
        tokens.cleared = false;
    }

    /// Store a refreshed access token, and the refresh token when rotated.
    pub fn rotate(&self, access: String, refresh: Option<String>) {
        let mut tokens = self.lock();
        tokens.access = non_empty(Some(access));
        if let Some(refresh) = non_empty(refresh) {
            tokens.refresh = Some(refresh);
        }
        tokens.dirty = true;
        tokens.cleared = false;
    }

    pub fn clear(&self) {
        let mut tokens = self.lock();
        tokens.access = None;
        tokens.refresh = None;
        tokens.dirty = true;
        tokens.cleared = true;
    }

    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.lock().cleared
    }

    /// Hold while refreshing; the guard may be kept across awaits.
    pub async fn refresh_gate(&self) -> tokio::sync::MutexGuard<'_, ()> {
        self.refresh_gate.lock().await
    }

    /// Apply this session's changes to `jar`. Untouched sessions leave the
    /// jar as it was.
    #[must_use]
    pub fn write_cookies(&self, jar: CookieJar, settings: &CookieSettings) -> CookieJar {
        let tokens = self.lock();
        if tokens.cleared {
            return clear_cookies(jar, settings);
        }
        if !tokens.dirty {
            return jar;
        }

        let mut jar = jar;
        if let Some(access) = &tokens.access {
            jar = jar.add(token_cookie(ACCESS_TOKEN_COOKIE, access.clone(), settings.secure, settings.access_max_age_secs));
        }
        if let Some(refresh) = &tokens.refresh {
            jar = jar.add(token_cookie(REFRESH_TOKEN_COOKIE, refresh.clone(), settings.secure, settings.refresh_max_age_secs));
        }
        jar
    }
}

fn token_cookie(name: &'static str, value: String, secure: bool, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::seconds(max_age_secs))
        .build()
}

/// Expire both token cookies.
#[must_use]
pub fn clear_cookies(jar: CookieJar, settings: &CookieSettings) -> CookieJar {
    jar.add(token_cookie(ACCESS_TOKEN_COOKIE, String::new(), settings.secure, 0))
        .add(token_cookie(REFRESH_TOKEN_COOKIE, String::new(), settings.secure, 0))
}

/// Bearer token from an `Authorization` header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
}

// =============================================================================
// EXTRACTOR
// =============================================================================

/// Cookies take precedence; an `Authorization: Bearer` header stands in for
/// the access token of non-browser callers.
impl<S> axum::extract::FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let session = Self::from_jar(&jar);
        if !session.has_access_token() {
            if let Some(token) = bearer_token(&parts.headers) {
                let refresh = session.refresh_token();
                return Ok(Self::new(Some(token), refresh));
            }
        }
        Ok(session)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
