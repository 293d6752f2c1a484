//! Reservation endpoints under `/actions/reservations`.

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use super::finish;
use crate::api::models::{NewReservation, Reservation};
use crate::error::AppError;
use crate::services::reservation::{self as reservation_svc, StatusSummary};
use crate::session::Session;
use crate::state::AppState;

/// Reservation list after a change, ready for the dashboard to re-render.
#[derive(Debug, Serialize)]
pub struct ReservationsView {
    pub reservations: Vec<Reservation>,
    pub summary: StatusSummary,
}

pub async fn create(
    State(state): State<AppState>,
    jar: CookieJar,
    session: Session,
    Json(body): Json<NewReservation>,
) -> Response {
    let result = reservation_svc::create_reservation(&state.api, &session, body.item_id, body.slot_id)
        .await
        .map(|reservation| (StatusCode::CREATED, Json(reservation)))
        .map_err(AppError::from);
    finish(&state, &session, jar, result)
}

/// `POST /actions/reservations/{id}/cancel`: cancel, then answer with the
/// reloaded list where `id` shows as cancelled.
pub async fn cancel(
    State(state): State<AppState>,
    jar: CookieJar,
    session: Session,
    Path(id): Path<i64>,
) -> Response {
    let result = async {
        let returned = reservation_svc::cancel_reservation(&state.api, &session, id).await?;
        let current = reservation_svc::get_user_reservations(&state.api, &session).await?;
        let reservations = reservation_svc::apply_cancellation(current, id, returned);
        let summary = StatusSummary::of(&reservations);
        Ok::<_, AppError>(Json(ReservationsView { reservations, summary }))
    }
    .await;
    finish(&state, &session, jar, result)
}

#[cfg(test)]
#[path = "reservations_test.rs"]
mod tests;
