//! Response envelope normalization.
//!
//! DESIGN
//! ======
//! The remote API nominally answers `{status, data, error?}`, but observed
//! revisions also return bare arrays, `{items: [...]}`, `{data: [...]}` and
//! `{data: {items: [...]}}`. `Envelope` keeps the raw body and resolves
//! payloads lazily so each caller can accept every shape it has seen.
//! List unwrapping never fails: unknown shapes yield an empty list and
//! elements that do not deserialize are skipped.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use super::types::{ApiError, RemoteResponse};

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub status: u16,
    pub body: Value,
}

impl From<RemoteResponse> for Envelope {
    fn from(response: RemoteResponse) -> Self {
        Self { status: response.status, body: response.body }
    }
}

impl Envelope {
    /// The `error` string of the envelope, if the remote set one.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.body
            .get("error")
            .and_then(Value::as_str)
            .filter(|e| !e.trim().is_empty())
    }

    /// Fail when the envelope carries an `error`, even on a 2xx status.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Status`] with the envelope's own `status` field
    /// when numeric, else 400.
    pub fn checked(self) -> Result<Self, ApiError> {
        let Some(message) = self.error().map(str::to_owned) else {
            return Ok(self);
        };
        let status = self
            .body
            .get("status")
            .and_then(Value::as_u64)
            .and_then(|s| u16::try_from(s).ok())
            .filter(|s| *s >= 400)
            .unwrap_or(400);
        let code = self
            .body
            .get("code")
            .and_then(Value::as_str)
            .map(str::to_owned);
        Err(ApiError::Status { status, code, message })
    }

    /// Payload: `body.data` when present and non-null, else the whole body.
    #[must_use]
    pub fn data(&self) -> &Value {
        match self.body.get("data") {
            Some(data) if !data.is_null() => data,
            _ => &self.body,
        }
    }

    /// Deserialize the payload.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Parse`] if the payload does not match `T`.
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        T::deserialize(self.data()).map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Deserialize the payload, treating a missing or mismatched payload as
    /// absent.
    #[must_use]
    pub fn data_opt<T: DeserializeOwned>(&self) -> Option<T> {
        if self.data().is_null() {
            return None;
        }
        T::deserialize(self.data()).ok()
    }

    /// Unwrap a list payload stored under any of `keys`.
    #[must_use]
    pub fn list<T: DeserializeOwned>(&self, keys: &[&str]) -> Vec<T> {
        let Some(raw) = extract_list(&self.body, keys) else {
            warn!(keys = ?keys, "unrecognized list envelope; using empty list");
            return Vec::new();
        };
        raw.iter()
            .filter_map(|element| match T::deserialize(element) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(error = %e, "skipping malformed list element");
                    None
                }
            })
            .collect()
    }
}

/// Locate the array inside a list response.
///
/// Accepted, in order: bare array, `{data: {<key>: [...]}}`, `{data: [...]}`,
/// `{<key>: [...]}`.
#[must_use]
pub fn extract_list<'a>(body: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    if let Value::Array(items) = body {
        return Some(items);
    }

    match body.get("data") {
        Some(Value::Object(data)) => {
            if let Some(items) = keys
                .iter()
                .find_map(|key| data.get(*key).and_then(Value::as_array))
            {
                return Some(items);
            }
        }
        Some(Value::Array(items)) => return Some(items),
        _ => {}
    }

    keys.iter()
        .find_map(|key| body.get(*key).and_then(Value::as_array))
}

#[cfg(test)]
#[path = "envelope_test.rs"]
mod tests;
