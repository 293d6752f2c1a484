//! User-facing error taxonomy and its HTTP rendering.
//!
//! DESIGN
//! ======
//! Remote failures arrive as [`ApiError`]. Handlers convert them to
//! [`AppError`], which carries an HTTP status, one of a fixed set of machine
//! codes and the raw detail. The display message always comes from the code
//! table so users never see raw remote text. A session that could not be
//! refreshed renders as a redirect to the login page instead of a body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Redirect, Response};
use serde::Serialize;
use serde_json::json;

use crate::api::ApiError;
use crate::guard::LOGIN_PATH;

// =============================================================================
// CODES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    AuthInvalidCredentials,
    AuthTokenExpired,
    AuthUnauthorized,
    AuthEmailNotVerified,
    ReservationSlotUnavailable,
    ReservationInvalidTime,
    ReservationAlreadyReserved,
    ValidationInvalidInput,
    ValidationRequiredField,
    ServerInternalError,
    ServerServiceUnavailable,
}

impl ErrorCode {
    pub const ALL: [Self; 11] = [
        Self::AuthInvalidCredentials,
        Self::AuthTokenExpired,
        Self::AuthUnauthorized,
        Self::AuthEmailNotVerified,
        Self::ReservationSlotUnavailable,
        Self::ReservationInvalidTime,
        Self::ReservationAlreadyReserved,
        Self::ValidationInvalidInput,
        Self::ValidationRequiredField,
        Self::ServerInternalError,
        Self::ServerServiceUnavailable,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AuthInvalidCredentials => "AUTH_INVALID_CREDENTIALS",
            Self::AuthTokenExpired => "AUTH_TOKEN_EXPIRED",
            Self::AuthUnauthorized => "AUTH_UNAUTHORIZED",
            Self::AuthEmailNotVerified => "AUTH_EMAIL_NOT_VERIFIED",
            Self::ReservationSlotUnavailable => "RESERVATION_SLOT_UNAVAILABLE",
            Self::ReservationInvalidTime => "RESERVATION_INVALID_TIME",
            Self::ReservationAlreadyReserved => "RESERVATION_ALREADY_RESERVED",
            Self::ValidationInvalidInput => "VALIDATION_INVALID_INPUT",
            Self::ValidationRequiredField => "VALIDATION_REQUIRED_FIELD",
            Self::ServerInternalError => "SERVER_INTERNAL_ERROR",
            Self::ServerServiceUnavailable => "SERVER_SERVICE_UNAVAILABLE",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|code| code.as_str() == raw)
    }

    /// Display message shown to the user.
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::AuthInvalidCredentials => "Incorrect email or password.",
            Self::AuthTokenExpired => "Your session has expired. Please sign in again.",
            Self::AuthUnauthorized => "Sign-in required.",
            Self::AuthEmailNotVerified => "Email verification required.",
            Self::ReservationSlotUnavailable => "The selected time is already booked.",
            Self::ReservationInvalidTime => "Invalid reservation time.",
            Self::ReservationAlreadyReserved => "This item is already reserved.",
            Self::ValidationInvalidInput => "Invalid input.",
            Self::ValidationRequiredField => "A required field is missing.",
            Self::ServerInternalError => "A server error occurred. Please try again later.",
            Self::ServerServiceUnavailable => "The service is temporarily unavailable.",
        }
    }

    /// Status used when the remote did not supply a usable one.
    #[must_use]
    pub fn default_status(self) -> StatusCode {
        match self {
            Self::AuthInvalidCredentials | Self::AuthTokenExpired | Self::AuthUnauthorized => StatusCode::UNAUTHORIZED,
            Self::AuthEmailNotVerified => StatusCode::FORBIDDEN,
            Self::ReservationSlotUnavailable | Self::ReservationAlreadyReserved => StatusCode::CONFLICT,
            Self::ReservationInvalidTime | Self::ValidationInvalidInput | Self::ValidationRequiredField => {
                StatusCode::BAD_REQUEST
            }
            Self::ServerInternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServerServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

// =============================================================================
// APP ERROR
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code:?} ({status}): {detail}")]
pub struct AppError {
    pub status: StatusCode,
    pub code: ErrorCode,
    /// Raw message from the remote or the local check.
    pub detail: String,
    /// The session was cleared; render as a redirect to login.
    pub logout: bool,
}

impl AppError {
    #[must_use]
    pub fn new(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self { status: code.default_status(), code, detail: detail.into(), logout: false }
    }

    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    #[must_use]
    pub fn message(&self) -> &'static str {
        self.code.message()
    }

    #[must_use]
    pub fn session_expired() -> Self {
        Self { logout: true, ..Self::new(ErrorCode::AuthTokenExpired, "session expired") }
    }

    /// Render as a JSON body even when the session was cleared. Used by the
    /// `/api` proxy routes, whose callers are scripts rather than browsers.
    #[must_use]
    pub fn without_redirect(mut self) -> Self {
        self.logout = false;
        self
    }

    #[must_use]
    pub fn required_field(field: &str) -> Self {
        Self::new(ErrorCode::ValidationRequiredField, format!("{field} is required"))
    }
}

/// Reject a blank form value.
///
/// # Errors
///
/// Returns `VALIDATION_REQUIRED_FIELD` naming `field`.
pub fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() { Err(AppError::required_field(field)) } else { Ok(trimmed) }
}

fn error_status(status: u16) -> Option<StatusCode> {
    StatusCode::from_u16(status).ok().filter(|s| s.is_client_error() || s.is_server_error())
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, code, message } => {
                if let Some(known) = code.as_deref().and_then(ErrorCode::parse) {
                    let base = Self::new(known, message);
                    return match error_status(status) {
                        Some(status) => base.with_status(status),
                        None => base,
                    };
                }
                let mapped = match status {
                    401 | 403 => ErrorCode::AuthUnauthorized,
                    400 | 422 => ErrorCode::ValidationInvalidInput,
                    503 | 504 => ErrorCode::ServerServiceUnavailable,
                    _ => ErrorCode::ServerInternalError,
                };
                let status = error_status(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                Self::new(mapped, message).with_status(status)
            }
            ApiError::Request(detail) => Self::new(ErrorCode::ServerServiceUnavailable, detail),
            ApiError::Timeout => Self::new(ErrorCode::ServerServiceUnavailable, "remote API timed out")
                .with_status(StatusCode::GATEWAY_TIMEOUT),
            ApiError::SessionExpired | ApiError::MissingRefreshToken => Self::session_expired(),
            ApiError::Parse(detail) | ApiError::InvalidResponse(detail) => {
                Self::new(ErrorCode::ServerInternalError, detail).with_status(StatusCode::BAD_GATEWAY)
            }
            ApiError::HttpClientBuild(detail) => Self::new(ErrorCode::ServerInternalError, detail),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.logout {
            return Redirect::to(LOGIN_PATH).into_response();
        }
        let body = json!({
            "success": false,
            "code": self.code,
            "message": self.message(),
            "detail": self.detail,
        });
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
