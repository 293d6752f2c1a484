//! Reservation actions under `/oper/reserves` plus the display-state helpers
//! used by the dashboards and the reservation page.

use serde::Serialize;
use tracing::{info, warn};

use crate::api::models::{NewReservation, Reservation, ReservationStatus, TimeSlot};
use crate::api::{ApiClient, ApiError, OPER_RESERVES, RemoteRequest};
use crate::session::Session;

const RESERVATION_KEYS: &[&str] = &["reservations"];

/// Per-status counts shown on the dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub total: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub cancelled: usize,
}

impl StatusSummary {
    #[must_use]
    pub fn of(reservations: &[Reservation]) -> Self {
        reservations.iter().fold(Self::default(), |mut summary, r| {
            summary.total += 1;
            match r.status {
                ReservationStatus::Pending => summary.pending += 1,
                ReservationStatus::Confirmed => summary.confirmed += 1,
                ReservationStatus::Cancelled => summary.cancelled += 1,
            }
            summary
        })
    }
}

// =============================================================================
// REMOTE ACTIONS
// =============================================================================

/// # Errors
///
/// Returns the remote failure. Unrecognized list shapes yield an empty list.
pub async fn get_user_reservations(api: &ApiClient, session: &Session) -> Result<Vec<Reservation>, ApiError> {
    let reservations = api
        .fetch(session, RemoteRequest::get(OPER_RESERVES))
        .await?
        .list(RESERVATION_KEYS);
    Ok(reservations)
}

/// # Errors
///
/// Returns the remote failure (slot conflicts are the remote's call) or a
/// parse error.
pub async fn create_reservation(
    api: &ApiClient,
    session: &Session,
    item_id: i64,
    slot_id: i64,
) -> Result<Reservation, ApiError> {
    info!(item_id, slot_id, "creating reservation");
    let request = RemoteRequest::post(OPER_RESERVES).json(&NewReservation { item_id, slot_id })?;
    api.fetch(session, request).await?.data_as()
}

/// Cancel reservation `id`. Returns the remote's updated record when it
/// sends one.
///
/// # Errors
///
/// Returns the remote failure.
pub async fn cancel_reservation(api: &ApiClient, session: &Session, id: i64) -> Result<Option<Reservation>, ApiError> {
    info!(id, "cancelling reservation");
    let envelope = api
        .fetch(session, RemoteRequest::post(format!("{OPER_RESERVES}/{id}/cancel")))
        .await?;
    Ok(envelope.data_opt())
}

// =============================================================================
// DISPLAY STATE
// =============================================================================

/// Mark reservation `id` as cancelled in `reservations`. The remote's
/// `returned` record replaces the entry when it has the same id; every
/// other entry is left untouched.
#[must_use]
pub fn apply_cancellation(reservations: Vec<Reservation>, id: i64, returned: Option<Reservation>) -> Vec<Reservation> {
    let returned = returned.filter(|r| {
        let same = r.id == id;
        if !same {
            warn!(id, returned_id = r.id, "cancel response is for a different reservation; ignoring it");
        }
        same
    });
    reservations
        .into_iter()
        .map(|reservation| {
            if reservation.id != id {
                return reservation;
            }
            let mut updated = returned.clone().unwrap_or(reservation);
            updated.status = ReservationStatus::Cancelled;
            updated
        })
        .collect()
}

/// Bookable slots, optionally restricted to `date` (`YYYY-MM-DD`).
#[must_use]
pub fn available_slots(slots: &[TimeSlot], date: Option<&str>) -> Vec<TimeSlot> {
    slots
        .iter()
        .filter(|slot| slot.is_available)
        .filter(|slot| date.is_none_or(|d| slot.date == d))
        .cloned()
        .collect()
}

#[cfg(test)]
#[path = "reservation_test.rs"]
mod tests;
