//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Three route groups share one `AppState`:
//! - guarded page loaders (`pages`) that return JSON view models,
//! - form/JSON action endpoints under `/actions` that invoke server actions,
//! - CORS-open proxies under `/api` for non-browser callers.
//!
//! Every handler builds a [`Session`] from the request cookies and passes
//! its result through [`finish`], which writes token changes back as
//! cookies.

pub mod auth;
pub mod manage;
pub mod pages;
pub mod reservations;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum_extra::extract::cookie::CookieJar;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use crate::error::AppError;
use crate::guard;
use crate::session::Session;
use crate::state::AppState;

/// Full application router.
pub fn app(state: AppState) -> Router {
    let guarded_pages = page_routes().route_layer(middleware::from_fn_with_state(state.clone(), guard::route_guard));

    Router::new()
        .merge(guarded_pages)
        .merge(action_routes())
        .merge(proxy_routes())
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::root))
        .route(guard::LOGIN_PATH, get(pages::login_page))
        .route(guard::SIGNUP_PATH, get(pages::signup_page))
        .route(guard::VERIFY_EMAIL_PATH, get(pages::verify_email_page))
        .route(guard::DASHBOARD_PATH, get(pages::dashboard))
        .route(guard::USER_DASHBOARD_PATH, get(pages::user_dashboard))
        .route(guard::STAFF_DASHBOARD_PATH, get(pages::staff_dashboard))
        .route("/admin", get(pages::admin_items))
        .route("/admin/items", get(pages::admin_items))
        .route(guard::ADMIN_DASHBOARD_PATH, get(pages::admin_dashboard))
        .route(guard::RESERVATION_PATH, get(pages::reservation_page))
}

fn action_routes() -> Router<AppState> {
    Router::new()
        .route("/actions/login", post(auth::login))
        .route("/actions/logout", post(auth::logout))
        .route("/actions/signup", post(auth::signup))
        .route("/actions/verify-email", post(auth::verify_email))
        .route("/actions/resend-verification", post(auth::resend_verification))
        .route("/actions/refresh", post(auth::refresh))
        .route("/actions/items", post(manage::create_item))
        .route("/actions/items/{id}", put(manage::update_item).delete(manage::delete_item))
        .route("/actions/items/{id}/toggle-status", patch(manage::toggle_item_status))
        .route("/actions/categories", post(manage::create_category))
        .route("/actions/time-slots", post(manage::create_time_slot))
        .route("/actions/reservations", post(reservations::create))
        .route("/actions/reservations/{id}/cancel", post(reservations::cancel))
}

fn proxy_routes() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/auth/login", post(auth::proxy_login))
        .route("/api/auth/logout", post(auth::proxy_logout))
        .route("/api/auth/verify", get(auth::proxy_verify))
        .route("/api/user/data", get(auth::proxy_user_data))
        .layer(cors)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Write the session's cookie changes onto `jar` and render `result`.
pub(crate) fn finish<T: IntoResponse>(
    state: &AppState,
    session: &Session,
    jar: CookieJar,
    result: Result<T, AppError>,
) -> Response {
    if session.is_cleared() {
        debug!("session cleared; expiring token cookies");
    }
    let jar = session.write_cookies(jar, &state.config.cookies);
    match result {
        Ok(body) => (jar, body).into_response(),
        Err(err) => {
            if err.status.is_server_error() {
                error!(code = err.code.as_str(), status = err.status.as_u16(), detail = %err.detail, "request failed");
            } else {
                warn!(code = err.code.as_str(), status = err.status.as_u16(), detail = %err.detail, "request rejected");
            }
            (jar, err).into_response()
        }
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
