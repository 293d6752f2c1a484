use super::*;
use std::sync::Arc;

use axum::body::to_bytes;
use axum::http::header::{LOCATION, SET_COOKIE};
use axum::response::Json;
use serde_json::{Value, json};

use crate::error::ErrorCode;
use crate::state::test_helpers::{MockTransport, session_with, test_app_state};

fn state() -> AppState {
    test_app_state(Arc::new(MockTransport::new()))
}

fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_owned())
        .collect()
}

#[tokio::test]
async fn healthz_is_ok() {
    assert_eq!(healthz().await, StatusCode::OK);
}

#[test]
fn app_builds_with_state() {
    let _router = app(state());
}

#[test]
fn finish_leaves_untouched_session_alone() {
    let session = session_with("a1", "r1");

    let response = finish(&state(), &session, CookieJar::new(), Ok::<_, AppError>(Json(json!({ "ok": true }))));

    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response).is_empty());
}

#[test]
fn finish_writes_rotated_tokens_alongside_body() {
    let session = session_with("a1", "r1");
    session.rotate("a2".into(), Some("r2".into()));

    let response = finish(&state(), &session, CookieJar::new(), Ok::<_, AppError>(StatusCode::NO_CONTENT));

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("accessToken=a2")));
    assert!(cookies.iter().any(|c| c.starts_with("refreshToken=r2")));
}

#[tokio::test]
async fn finish_renders_error_body() {
    let session = Session::default();
    let err = AppError::new(ErrorCode::ReservationInvalidTime, "end before start");

    let response = finish(&state(), &session, CookieJar::new(), Err::<StatusCode, _>(err));

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "RESERVATION_INVALID_TIME");
    assert_eq!(body["detail"], "end before start");
}

#[test]
fn finish_clears_cookies_on_expired_session() {
    let session = session_with("a1", "r1");
    session.clear();

    let response = finish(&state(), &session, CookieJar::new(), Err::<StatusCode, _>(AppError::session_expired()));

    assert_eq!(response.headers().get(LOCATION).unwrap(), crate::guard::LOGIN_PATH);
    let cookies = set_cookies(&response);
    assert!(cookies.iter().any(|c| c.starts_with("accessToken=;")));
    assert!(cookies.iter().any(|c| c.starts_with("refreshToken=;")));
}
