//! Admin catalog endpoints under `/actions`. Bodies are JSON; required
//! fields are checked locally before any remote call.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::json;

use super::finish;
use crate::api::models::{CategoryFields, ItemFields, TimeSlotFields};
use crate::error::{AppError, required};
use crate::services::catalog;
use crate::session::Session;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ToggleBody {
    pub is_active: bool,
}

fn check_item(fields: &ItemFields) -> Result<(), AppError> {
    required("name", &fields.name)?;
    Ok(())
}

// =============================================================================
// ITEMS
// =============================================================================

pub async fn create_item(
    State(state): State<AppState>,
    jar: CookieJar,
    session: Session,
    Json(fields): Json<ItemFields>,
) -> Response {
    let result = async {
        check_item(&fields)?;
        let item = catalog::create_item(&state.api, &session, &fields).await?;
        Ok::<_, AppError>((StatusCode::CREATED, Json(item)))
    }
    .await;
    finish(&state, &session, jar, result)
}

pub async fn update_item(
    State(state): State<AppState>,
    jar: CookieJar,
    session: Session,
    Path(id): Path<i64>,
    Json(fields): Json<ItemFields>,
) -> Response {
    let result = async {
        check_item(&fields)?;
        let item = catalog::update_item(&state.api, &session, id, &fields).await?;
        Ok::<_, AppError>(Json(item))
    }
    .await;
    finish(&state, &session, jar, result)
}

pub async fn delete_item(
    State(state): State<AppState>,
    jar: CookieJar,
    session: Session,
    Path(id): Path<i64>,
) -> Response {
    let result = catalog::delete_item(&state.api, &session, id)
        .await
        .map(|()| StatusCode::NO_CONTENT)
        .map_err(AppError::from);
    finish(&state, &session, jar, result)
}

/// `PATCH /actions/items/{id}/toggle-status`. `item` is null when the
/// remote only acknowledged the change.
pub async fn toggle_item_status(
    State(state): State<AppState>,
    jar: CookieJar,
    session: Session,
    Path(id): Path<i64>,
    Json(body): Json<ToggleBody>,
) -> Response {
    let result = catalog::toggle_item_status(&state.api, &session, id, body.is_active)
        .await
        .map(|item| Json(json!({ "success": true, "item": item })))
        .map_err(AppError::from);
    finish(&state, &session, jar, result)
}

// =============================================================================
// CATEGORIES / TIME SLOTS
// =============================================================================

pub async fn create_category(
    State(state): State<AppState>,
    jar: CookieJar,
    session: Session,
    Json(fields): Json<CategoryFields>,
) -> Response {
    let result = async {
        required("name", &fields.name)?;
        let category = catalog::create_category(&state.api, &session, &fields).await?;
        Ok::<_, AppError>((StatusCode::CREATED, Json(category)))
    }
    .await;
    finish(&state, &session, jar, result)
}

pub async fn create_time_slot(
    State(state): State<AppState>,
    jar: CookieJar,
    session: Session,
    Json(fields): Json<TimeSlotFields>,
) -> Response {
    let result = async {
        required("date", &fields.date)?;
        required("startTime", &fields.start_time)?;
        required("endTime", &fields.end_time)?;
        let slot = catalog::create_time_slot(&state.api, &session, &fields).await?;
        Ok::<_, AppError>((StatusCode::CREATED, Json(slot)))
    }
    .await;
    finish(&state, &session, jar, result)
}

#[cfg(test)]
#[path = "manage_test.rs"]
mod tests;
