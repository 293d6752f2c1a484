//! Remote API access: client wrapper, transport and wire models.
//!
//! DESIGN
//! ======
//! Every server action talks to the remote reservation API through
//! [`ApiClient`]. The client attaches the session's access token, turns
//! non-success statuses into [`ApiError`] and runs a single
//! refresh-and-replay cycle when the remote reports an expired token. The
//! actual HTTP call sits behind the [`Transport`] trait so tests script
//! remote answers without a network.

pub mod client;
pub mod envelope;
pub mod http;
pub mod models;
pub mod types;

pub use client::ApiClient;
pub use envelope::Envelope;
pub use types::{ApiError, Method, RemoteRequest, RemoteResponse, Transport};

// =============================================================================
// REMOTE ENDPOINTS
// =============================================================================

pub const AUTH_LOGIN: &str = "/auth/login";
pub const AUTH_LOGOUT: &str = "/auth/logout";
pub const AUTH_REFRESH: &str = "/auth/refresh";
pub const AUTH_SIGNUP: &str = "/auth/signup";
pub const AUTH_VERIFY_EMAIL: &str = "/auth/verify-email";
pub const AUTH_RESEND_VERIFICATION: &str = "/auth/resend-verification";
pub const USER_DATA: &str = "/user/data";
pub const MANAGE_CATEGORIES: &str = "/manage/categories";
pub const MANAGE_ITEMS: &str = "/manage/items";
pub const MANAGE_TIME_SLOTS: &str = "/manage/time-slots";
pub const OPER_RESERVES: &str = "/oper/reserves";
