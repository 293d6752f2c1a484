//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the remote API client and the parsed configuration. Nothing
//! mutable is shared across requests; per-request token state lives in
//! [`crate::session::Session`].

use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::AppConfig;

/// Clone is required by Axum; both fields are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub api: ApiClient,
    pub config: Arc<AppConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(api: ApiClient, config: AppConfig) -> Self {
        Self { api, config: Arc::new(config) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    use serde_json::{Value, json};

    use super::*;
    use crate::api::{ApiError, Method, RemoteRequest, RemoteResponse, Transport};
    use crate::session::Session;

    pub const TEST_BASE_URL: &str = "http://api.test";

    #[derive(Debug, Clone)]
    enum Scripted {
        Respond(RemoteResponse),
        Unreachable,
        Timeout,
    }

    /// One request seen by [`MockTransport`].
    #[derive(Debug, Clone)]
    pub struct RecordedCall {
        pub method: Method,
        pub path: String,
        pub bearer: Option<String>,
        pub body: Option<Value>,
        pub timeout: Option<Duration>,
    }

    /// Scripted stand-in for the remote API.
    ///
    /// Replies are queued per `(method, path)`; the last queued reply repeats.
    /// Unscripted requests get a 404. With [`MockTransport::yielding`] each
    /// call yields once before answering, so `try_join!` branches interleave.
    #[derive(Default)]
    pub struct MockTransport {
        replies: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
        calls: Mutex<Vec<RecordedCall>>,
        yielding: bool,
    }

    impl MockTransport {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        fn script(mut self, method: Method, path: &str, reply: Scripted) -> Self {
            self.replies
                .get_mut()
                .unwrap()
                .entry((method, path.to_owned()))
                .or_default()
                .push_back(reply);
            self
        }

        #[must_use]
        pub fn yielding(mut self) -> Self {
            self.yielding = true;
            self
        }

        #[must_use]
        pub fn reply(self, method: Method, path: &str, status: u16, body: Value) -> Self {
            self.script(method, path, Scripted::Respond(RemoteResponse::new(status, body)))
        }

        #[must_use]
        pub fn unreachable(self, method: Method, path: &str) -> Self {
            self.script(method, path, Scripted::Unreachable)
        }

        #[must_use]
        pub fn timeout(self, method: Method, path: &str) -> Self {
            self.script(method, path, Scripted::Timeout)
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn calls_to(&self, method: &Method, path: &str) -> Vec<RecordedCall> {
            self.calls()
                .into_iter()
                .filter(|c| &c.method == method && c.path == path)
                .collect()
        }
    }

    #[async_trait::async_trait]
    impl Transport for MockTransport {
        async fn send(&self, request: &RemoteRequest, bearer: Option<&str>) -> Result<RemoteResponse, ApiError> {
            self.calls.lock().unwrap().push(RecordedCall {
                method: request.method.clone(),
                path: request.path.clone(),
                bearer: bearer.map(str::to_owned),
                body: request.body.clone(),
                timeout: request.timeout,
            });
            if self.yielding {
                tokio::task::yield_now().await;
            }

            let scripted = {
                let mut replies = self.replies.lock().unwrap();
                match replies.get_mut(&(request.method.clone(), request.path.clone())) {
                    Some(queue) if queue.len() > 1 => queue.pop_front(),
                    Some(queue) => queue.front().cloned(),
                    None => None,
                }
            };
            match scripted {
                Some(Scripted::Respond(response)) => Ok(response),
                Some(Scripted::Unreachable) => Err(ApiError::Request("connection refused".into())),
                Some(Scripted::Timeout) => Err(ApiError::Timeout),
                None => Ok(RemoteResponse::new(404, json!({ "message": "not found" }))),
            }
        }
    }

    /// Create a test `AppState` backed by `transport`.
    #[must_use]
    pub fn test_app_state(transport: Arc<MockTransport>) -> AppState {
        AppState::new(ApiClient::new(transport), AppConfig::with_base_url(TEST_BASE_URL))
    }

    #[must_use]
    pub fn session_with(access: &str, refresh: &str) -> Session {
        Session::new(Some(access.to_owned()), Some(refresh.to_owned()))
    }

    /// `/user/data` body for a user with `grade`.
    #[must_use]
    pub fn user_body(grade: &str) -> Value {
        json!({
            "status": 200,
            "data": { "id": 1, "email": "ann@example.com", "name": "Ann", "grade": grade }
        })
    }

    /// 401 body the remote sends for an expired access token.
    #[must_use]
    pub fn expired_body() -> Value {
        json!({ "status": 401, "msg": "Token has expired" })
    }
}
