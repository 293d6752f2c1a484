use super::*;
use std::sync::Arc;

use axum::http::header::{LOCATION, SET_COOKIE};
use serde_json::json;

use crate::api::Method;
use crate::state::test_helpers::{MockTransport, test_app_state, user_body};

fn api(mock: &Arc<MockTransport>) -> ApiClient {
    test_app_state(mock.clone()).api
}

// =============================================================================
// required_access
// =============================================================================

#[test]
fn public_paths_are_never_guarded() {
    assert_eq!(required_access(LOGIN_PATH), Access::Public);
    assert_eq!(required_access(SIGNUP_PATH), Access::Public);
    assert_eq!(required_access("/"), Access::Public);
    assert_eq!(required_access("/healthz"), Access::Public);
}

#[test]
fn guarded_prefixes_cover_sub_paths() {
    for path in ["/dashboard", "/dashboard/user", "/reservation", "/auth/verify-email", "/auth"] {
        assert_eq!(required_access(path), Access::Authenticated, "{path}");
    }
    for path in ["/admin", "/admin/dashboard", "/admin/items"] {
        assert_eq!(required_access(path), Access::Admin, "{path}");
    }
}

#[test]
fn prefix_match_respects_segment_boundary() {
    assert!(under_prefix("/admin", "/admin"));
    assert!(under_prefix("/admin/x", "/admin"));
    assert!(!under_prefix("/administrator", "/admin"));
    assert_eq!(required_access("/dashboards"), Access::Public);
}

// =============================================================================
// decide
// =============================================================================

#[tokio::test]
async fn missing_token_redirects_to_login() {
    let mock = Arc::new(MockTransport::new());
    let decision = decide(&api(&mock), "/dashboard", None).await;
    assert_eq!(decision, Decision::Login { clear_cookies: false });

    let decision = decide(&api(&mock), "/admin", Some("")).await;
    assert_eq!(decision, Decision::Login { clear_cookies: false });
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn public_path_passes_without_token() {
    let mock = Arc::new(MockTransport::new());
    assert_eq!(decide(&api(&mock), LOGIN_PATH, None).await, Decision::Pass);
}

#[tokio::test]
async fn token_passes_non_admin_path_without_remote_call() {
    let mock = Arc::new(MockTransport::new());
    assert_eq!(decide(&api(&mock), "/reservation", Some("a1")).await, Decision::Pass);
    assert!(mock.calls().is_empty());
}

#[tokio::test]
async fn admin_path_passes_for_admin() {
    let mock = Arc::new(MockTransport::new().reply(Method::GET, USER_DATA, 200, user_body("ADMIN")));
    assert_eq!(decide(&api(&mock), "/admin/items", Some("a1")).await, Decision::Pass);
    assert_eq!(mock.calls()[0].bearer.as_deref(), Some("a1"));
}

#[tokio::test]
async fn admin_path_redirects_regular_user_to_dashboard() {
    let mock = Arc::new(MockTransport::new().reply(Method::GET, USER_DATA, 200, user_body("USER")));
    assert_eq!(decide(&api(&mock), "/admin", Some("a1")).await, Decision::Dashboard);
}

#[tokio::test]
async fn admin_path_without_user_data_redirects_to_dashboard() {
    let mock = Arc::new(MockTransport::new().reply(Method::GET, USER_DATA, 200, json!({ "status": 200 })));
    assert_eq!(decide(&api(&mock), "/admin", Some("a1")).await, Decision::Dashboard);
}

#[tokio::test]
async fn admin_role_check_failure_clears_session() {
    let mock = Arc::new(MockTransport::new().reply(Method::GET, USER_DATA, 401, json!({ "msg": "Token has expired" })));
    assert_eq!(decide(&api(&mock), "/admin", Some("a1")).await, Decision::Login { clear_cookies: true });
    assert_eq!(mock.calls().len(), 1);
}

#[tokio::test]
async fn admin_role_check_network_failure_clears_session() {
    let mock = Arc::new(MockTransport::new().unreachable(Method::GET, USER_DATA));
    assert_eq!(decide(&api(&mock), "/admin", Some("a1")).await, Decision::Login { clear_cookies: true });
}

// =============================================================================
// redirect_for
// =============================================================================

fn cookies() -> CookieSettings {
    CookieSettings { secure: false, access_max_age_secs: 60, refresh_max_age_secs: 60 }
}

#[test]
fn pass_yields_no_response() {
    assert!(redirect_for(Decision::Pass, CookieJar::new(), &cookies()).is_none());
}

#[test]
fn login_with_clear_removes_both_cookies() {
    let response = redirect_for(Decision::Login { clear_cookies: true }, CookieJar::new(), &cookies()).unwrap();
    assert_eq!(response.headers().get(LOCATION).unwrap(), LOGIN_PATH);
    let set: Vec<_> = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_owned())
        .collect();
    assert_eq!(set.len(), 2);
    assert!(set.iter().any(|c| c.starts_with("accessToken=;")));
    assert!(set.iter().any(|c| c.starts_with("refreshToken=;")));
    assert!(set.iter().all(|c| c.contains("Max-Age=0")));
}

#[test]
fn plain_login_redirect_sets_no_cookies() {
    let response = redirect_for(Decision::Login { clear_cookies: false }, CookieJar::new(), &cookies()).unwrap();
    assert_eq!(response.headers().get(LOCATION).unwrap(), LOGIN_PATH);
    assert!(response.headers().get(SET_COOKIE).is_none());
}

#[test]
fn dashboard_redirect() {
    let response = redirect_for(Decision::Dashboard, CookieJar::new(), &cookies()).unwrap();
    assert_eq!(response.headers().get(LOCATION).unwrap(), DASHBOARD_PATH);
}
