//! Runtime configuration parsed from environment variables.
//!
//! SYSTEM CONTEXT
//! ==============
//! `main` loads this once at start-up (after `dotenvy`) and hands it to
//! `AppState`. Parsing goes through a lookup closure so tests can feed a
//! map instead of mutating the process environment.

use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_API_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_API_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_LOGIN_PROXY_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_ACCESS_TOKEN_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 7;
pub const DEFAULT_REFRESH_TOKEN_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Outbound HTTP timeouts for the remote reservation API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
    /// Applied only by the `/api/auth/login` proxy route.
    pub login_proxy_secs: u64,
}

/// Attributes shared by the `accessToken` / `refreshToken` cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieSettings {
    pub secure: bool,
    pub access_max_age_secs: i64,
    pub refresh_max_age_secs: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Remote API base URL, without a trailing slash.
    pub api_base_url: String,
    pub port: u16,
    pub timeouts: ApiTimeouts,
    pub cookies: CookieSettings,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `API_BASE_URL`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `COOKIE_SECURE`: bool; inferred from an `https://` `PUBLIC_URL` when absent
    /// - `API_REQUEST_TIMEOUT_SECS`: default 30
    /// - `API_CONNECT_TIMEOUT_SECS`: default 10
    /// - `LOGIN_PROXY_TIMEOUT_SECS`: default 5
    /// - `ACCESS_TOKEN_MAX_AGE_SECS`: default 7 days
    /// - `REFRESH_TOKEN_MAX_AGE_SECS`: default 30 days
    ///
    /// # Errors
    ///
    /// Returns an error if `API_BASE_URL` is missing or not an http(s) URL, or
    /// if a numeric variable is set but unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = lookup("API_BASE_URL")
            .map(|raw| raw.trim().trim_end_matches('/').to_owned())
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::Missing("API_BASE_URL"))?;
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid { key: "API_BASE_URL", value: api_base_url });
        }

        let secure = match lookup("COOKIE_SECURE") {
            Some(raw) => parse_bool(&raw).ok_or(ConfigError::Invalid { key: "COOKIE_SECURE", value: raw })?,
            None => lookup("PUBLIC_URL").is_some_and(|url| url.trim().starts_with("https://")),
        };

        let timeouts = ApiTimeouts {
            request_secs: parse_or(&lookup, "API_REQUEST_TIMEOUT_SECS", DEFAULT_API_REQUEST_TIMEOUT_SECS)?,
            connect_secs: parse_or(&lookup, "API_CONNECT_TIMEOUT_SECS", DEFAULT_API_CONNECT_TIMEOUT_SECS)?,
            login_proxy_secs: parse_or(&lookup, "LOGIN_PROXY_TIMEOUT_SECS", DEFAULT_LOGIN_PROXY_TIMEOUT_SECS)?,
        };
        let cookies = CookieSettings {
            secure,
            access_max_age_secs: parse_or(&lookup, "ACCESS_TOKEN_MAX_AGE_SECS", DEFAULT_ACCESS_TOKEN_MAX_AGE_SECS)?,
            refresh_max_age_secs: parse_or(&lookup, "REFRESH_TOKEN_MAX_AGE_SECS", DEFAULT_REFRESH_TOKEN_MAX_AGE_SECS)?,
        };

        Ok(Self { api_base_url, port: parse_or(&lookup, "PORT", DEFAULT_PORT)?, timeouts, cookies })
    }

    /// Config pointing at `api_base_url` with every other value defaulted.
    #[must_use]
    pub fn with_base_url(api_base_url: &str) -> Self {
        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_owned(),
            port: DEFAULT_PORT,
            timeouts: ApiTimeouts {
                request_secs: DEFAULT_API_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_API_CONNECT_TIMEOUT_SECS,
                login_proxy_secs: DEFAULT_LOGIN_PROXY_TIMEOUT_SECS,
            },
            cookies: CookieSettings {
                secure: false,
                access_max_age_secs: DEFAULT_ACCESS_TOKEN_MAX_AGE_SECS,
                refresh_max_age_secs: DEFAULT_REFRESH_TOKEN_MAX_AGE_SECS,
            },
        }
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
