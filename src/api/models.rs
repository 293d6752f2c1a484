//! Pass-through mirrors of the remote API's entities.
//!
//! This application owns none of these; it deserializes them leniently
//! (missing optional fields default) and hands them to the page layer.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::ApiError;

// =============================================================================
// AUTH
// =============================================================================

/// Caller role as reported by `/user/data` (`grade`). Anything other than
/// `ADMIN` is treated as a regular user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::User => "USER",
        }
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        if raw.trim().eq_ignore_ascii_case("ADMIN") { Self::Admin } else { Self::User }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_owned()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `GET /user/data` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, alias = "role")]
    pub grade: Role,
    #[serde(default, rename = "isEmailVerified", skip_serializing_if = "Option::is_none")]
    pub is_email_verified: Option<bool>,
}

impl UserData {
    /// Reject payloads missing `id`, `email` or `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidResponse`] naming the first missing field.
    pub fn validate(self) -> Result<Self, ApiError> {
        let missing = if self.id == 0 {
            Some("id")
        } else if self.email.trim().is_empty() {
            Some("email")
        } else if self.name.trim().is_empty() {
            Some("name")
        } else {
            None
        };
        match missing {
            Some(field) => Err(ApiError::InvalidResponse(format!("user data is missing {field}"))),
            None => Ok(self),
        }
    }
}

/// `POST /auth/login` payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginTokens {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
}

/// `POST /auth/refresh` payload. The remote may rotate the refresh token.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokens {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// `POST /auth/signup` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignupResult {
    pub id: i64,
    pub email: String,
    pub name: String,
}

/// Plain `{message}` payload used by the verification endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct Credentials<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SignupRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub name: &'a str,
}

// =============================================================================
// RESERVATION DOMAIN
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<i64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "categoryId")]
    pub category_id: i64,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl Item {
    /// Default a missing `item_id` to `id`.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.item_id.is_none() {
            self.item_id = Some(self.id);
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub id: i64,
    #[serde(default, alias = "start_time")]
    pub start_time: String,
    #[serde(default, alias = "end_time")]
    pub end_time: String,
    #[serde(default)]
    pub date: String,
    #[serde(default, alias = "is_available")]
    pub is_available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReservationStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Item>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<TimeSlot>,
    #[serde(default)]
    pub status: ReservationStatus,
}

// =============================================================================
// REQUEST BODIES
// =============================================================================

/// Create/update body for `/manage/items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemFields {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category_id: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Debug, Serialize)]
pub struct ItemUpdate<'a> {
    pub id: i64,
    #[serde(flatten)]
    pub fields: &'a ItemFields,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryFields {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlotFields {
    pub date: String,
    #[serde(alias = "start_time")]
    pub start_time: String,
    #[serde(alias = "end_time")]
    pub end_time: String,
    #[serde(default = "default_active", alias = "is_available")]
    pub is_available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReservation {
    #[serde(alias = "item_id")]
    pub item_id: i64,
    #[serde(alias = "slot_id")]
    pub slot_id: i64,
}

fn default_active() -> bool {
    true
}

#[cfg(test)]
#[path = "models_test.rs"]
mod tests;
