use super::*;
use serde_json::json;

#[test]
fn from_response_prefers_message_then_msg_then_error() {
    let resp = RemoteResponse::new(400, json!({ "message": "bad name", "msg": "ignored", "error": "ignored" }));
    assert!(matches!(ApiError::from_response(&resp), ApiError::Status { message, .. } if message == "bad name"));

    let resp = RemoteResponse::new(400, json!({ "msg": "token expired" }));
    assert!(matches!(ApiError::from_response(&resp), ApiError::Status { message, .. } if message == "token expired"));

    let resp = RemoteResponse::new(409, json!({ "error": "conflict" }));
    assert!(matches!(ApiError::from_response(&resp), ApiError::Status { message, .. } if message == "conflict"));
}

#[test]
fn from_response_falls_back_to_generic_message() {
    let resp = RemoteResponse::new(500, serde_json::Value::Null);
    let err = ApiError::from_response(&resp);
    assert!(matches!(err, ApiError::Status { status: 500, code: None, ref message } if message == "API request failed"));
}

#[test]
fn from_response_uses_plain_text_body() {
    let resp = RemoteResponse::new(502, json!("Bad Gateway"));
    assert!(matches!(ApiError::from_response(&resp), ApiError::Status { message, .. } if message == "Bad Gateway"));
}

#[test]
fn from_response_carries_remote_code() {
    let resp = RemoteResponse::new(409, json!({ "code": "RESERVATION_SLOT_UNAVAILABLE", "message": "taken" }));
    let err = ApiError::from_response(&resp);
    assert!(
        matches!(err, ApiError::Status { status: 409, code: Some(ref c), .. } if c == "RESERVATION_SLOT_UNAVAILABLE")
    );
}

#[test]
fn retryable_only_for_transient_failures() {
    assert!(ApiError::Timeout.retryable());
    assert!(ApiError::Request("reset".into()).retryable());
    assert!(ApiError::Status { status: 503, code: None, message: String::new() }.retryable());
    assert!(ApiError::Status { status: 429, code: None, message: String::new() }.retryable());
    assert!(!ApiError::Status { status: 401, code: None, message: String::new() }.retryable());
    assert!(!ApiError::SessionExpired.retryable());
}

#[test]
fn error_codes_are_distinct() {
    let errors = [
        ApiError::Request(String::new()),
        ApiError::Timeout,
        ApiError::Status { status: 400, code: None, message: String::new() },
        ApiError::Parse(String::new()),
        ApiError::InvalidResponse(String::new()),
        ApiError::MissingRefreshToken,
        ApiError::SessionExpired,
        ApiError::HttpClientBuild(String::new()),
    ];
    let mut codes: Vec<&str> = errors.iter().map(ApiError::error_code).collect();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), errors.len());
}

#[test]
fn request_builders_set_method_and_body() {
    let req = RemoteRequest::patch("/manage/items/3/toggle-status")
        .json(&json!({ "is_active": false }))
        .unwrap()
        .timeout(Duration::from_secs(5));
    assert_eq!(req.method, Method::PATCH);
    assert_eq!(req.path, "/manage/items/3/toggle-status");
    assert_eq!(req.body, Some(json!({ "is_active": false })));
    assert_eq!(req.timeout, Some(Duration::from_secs(5)));
    assert!(RemoteRequest::get("/user/data").body.is_none());
}

#[test]
fn success_range_is_2xx() {
    assert!(RemoteResponse::new(200, json!({})).is_success());
    assert!(RemoteResponse::new(204, serde_json::Value::Null).is_success());
    assert!(!RemoteResponse::new(301, json!({})).is_success());
    assert!(!RemoteResponse::new(401, json!({})).is_success());
}
