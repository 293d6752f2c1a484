//! Page loaders. Each returns the JSON view model the page renders; the
//! route guard has already run by the time these execute.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Json, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use super::finish;
use crate::api::models::{Category, Item, Reservation, TimeSlot, UserData};
use crate::error::AppError;
use crate::guard::{DASHBOARD_PATH, LOGIN_PATH, SIGNUP_PATH, STAFF_DASHBOARD_PATH, USER_DASHBOARD_PATH};
use crate::services::auth::{self as auth_svc, VerifyTarget};
use crate::services::catalog;
use crate::services::reservation::{self as reservation_svc, StatusSummary, available_slots};
use crate::session::Session;
use crate::state::AppState;

// =============================================================================
// VIEW MODELS
// =============================================================================

#[derive(Debug, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub kind: &'static str,
    pub required: bool,
}

#[derive(Debug, Serialize)]
pub struct FormPage {
    pub page: &'static str,
    pub action: &'static str,
    pub fields: &'static [FormField],
    /// Companion page (signup from login and back).
    pub alternate: &'static str,
}

const LOGIN_FORM: FormPage = FormPage {
    page: "login",
    action: "/actions/login",
    fields: &[
        FormField { name: "email", kind: "email", required: true },
        FormField { name: "password", kind: "password", required: true },
    ],
    alternate: SIGNUP_PATH,
};

const SIGNUP_FORM: FormPage = FormPage {
    page: "signup",
    action: "/actions/signup",
    fields: &[
        FormField { name: "email", kind: "email", required: true },
        FormField { name: "password", kind: "password", required: true },
        FormField { name: "name", kind: "text", required: true },
    ],
    alternate: LOGIN_PATH,
};

#[derive(Debug, Serialize)]
pub struct VerifyEmailView {
    pub verified: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub user: UserData,
    pub reservations: Vec<Reservation>,
    pub summary: StatusSummary,
}

#[derive(Debug, Serialize)]
pub struct ItemsView {
    pub categories: Vec<Category>,
    pub items: Vec<Item>,
    pub selected_category: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ReservationView {
    pub categories: Vec<Category>,
    pub items: Vec<Item>,
    pub reservations: Vec<Reservation>,
    pub selected_item: Option<i64>,
    pub date: Option<String>,
    /// Bookable slots; empty until an item is chosen.
    pub slots: Vec<TimeSlot>,
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ItemsQuery {
    pub category_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ReservationQuery {
    pub item_id: Option<i64>,
    pub date: Option<String>,
}

// =============================================================================
// AUTH PAGES
// =============================================================================

/// `GET /`: login without a token, the dashboard otherwise.
pub async fn root(session: Session) -> Redirect {
    if session.has_access_token() {
        Redirect::temporary(DASHBOARD_PATH)
    } else {
        Redirect::temporary(LOGIN_PATH)
    }
}

pub async fn login_page() -> Json<FormPage> {
    Json(LOGIN_FORM)
}

pub async fn signup_page() -> Json<FormPage> {
    Json(SIGNUP_FORM)
}

/// `GET /auth/verify-email?token=`: confirm the mailed token when present.
pub async fn verify_email_page(
    State(state): State<AppState>,
    jar: CookieJar,
    session: Session,
    Query(query): Query<VerifyQuery>,
) -> Response {
    let token = query.token.filter(|t| !t.trim().is_empty());
    let result = match token {
        Some(token) => auth_svc::verify_email(&state.api, &VerifyTarget::Token(token))
            .await
            .map(|body| Json(VerifyEmailView { verified: true, message: body.message }))
            .map_err(AppError::from),
        None => Ok(Json(VerifyEmailView {
            verified: false,
            message: "Open the link in your verification email to finish signing up.".to_owned(),
        })),
    };
    finish(&state, &session, jar, result)
}

// =============================================================================
// DASHBOARDS
// =============================================================================

async fn load_dashboard(state: &AppState, session: &Session) -> Result<DashboardView, AppError> {
    let (user, reservations) = futures::try_join!(
        auth_svc::get_user_data(&state.api, session),
        reservation_svc::get_user_reservations(&state.api, session),
    )?;
    let summary = StatusSummary::of(&reservations);
    Ok(DashboardView { user, reservations, summary })
}

/// `GET /dashboard`: forward to the role's dashboard. A failed role check
/// lands on the user dashboard, which reports the failure itself.
pub async fn dashboard(State(state): State<AppState>, jar: CookieJar, session: Session) -> Response {
    let target = if auth_svc::check_admin_access(&state.api, &session).await {
        STAFF_DASHBOARD_PATH
    } else {
        USER_DASHBOARD_PATH
    };
    finish(&state, &session, jar, Ok::<_, AppError>(Redirect::temporary(target)))
}

pub async fn user_dashboard(State(state): State<AppState>, jar: CookieJar, session: Session) -> Response {
    let result = load_dashboard(&state, &session).await.map(Json);
    finish(&state, &session, jar, result)
}

/// `GET /dashboard/admin`: non-admins land on the user dashboard.
pub async fn staff_dashboard(State(state): State<AppState>, jar: CookieJar, session: Session) -> Response {
    let result = load_dashboard(&state, &session).await.map(|view| {
        if view.user.grade.is_admin() {
            Json(view).into_response()
        } else {
            Redirect::temporary(USER_DASHBOARD_PATH).into_response()
        }
    });
    finish(&state, &session, jar, result)
}

/// `GET /admin/dashboard`: all reservations with per-status counts.
pub async fn admin_dashboard(State(state): State<AppState>, jar: CookieJar, session: Session) -> Response {
    let result = load_dashboard(&state, &session).await.map(Json);
    finish(&state, &session, jar, result)
}

// =============================================================================
// ADMIN / RESERVATION
// =============================================================================

/// `GET /admin` and `GET /admin/items?category_id=`.
pub async fn admin_items(
    State(state): State<AppState>,
    jar: CookieJar,
    session: Session,
    Query(query): Query<ItemsQuery>,
) -> Response {
    let result = async {
        let (items, categories) = futures::try_join!(
            catalog::get_items(&state.api, &session),
            catalog::get_categories(&state.api, &session),
        )?;
        Ok::<_, AppError>(Json(ItemsView {
            categories,
            items: catalog::filter_by_category(items, query.category_id),
            selected_category: query.category_id,
        }))
    }
    .await;
    finish(&state, &session, jar, result)
}

/// `GET /reservation?item_id=&date=`.
pub async fn reservation_page(
    State(state): State<AppState>,
    jar: CookieJar,
    session: Session,
    Query(query): Query<ReservationQuery>,
) -> Response {
    let result = async {
        let (categories, items, reservations) = futures::try_join!(
            catalog::get_categories(&state.api, &session),
            catalog::get_items(&state.api, &session),
            reservation_svc::get_user_reservations(&state.api, &session),
        )?;
        let slots = match query.item_id {
            Some(_) => {
                let all = catalog::get_time_slots(&state.api, &session).await?;
                available_slots(&all, query.date.as_deref())
            }
            None => Vec::new(),
        };
        Ok::<_, AppError>(Json(ReservationView {
            categories,
            items,
            reservations,
            selected_item: query.item_id,
            date: query.date,
            slots,
        }))
    }
    .await;
    finish(&state, &session, jar, result)
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
