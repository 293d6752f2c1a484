//! Catalog actions: categories, items and time slots under `/manage`.

use serde::Serialize;
use tracing::{info, warn};

use crate::api::models::{Category, CategoryFields, Item, ItemFields, ItemUpdate, TimeSlot, TimeSlotFields};
use crate::api::{ApiClient, ApiError, MANAGE_CATEGORIES, MANAGE_ITEMS, MANAGE_TIME_SLOTS, RemoteRequest};
use crate::session::Session;

const CATEGORY_KEYS: &[&str] = &["categories"];
const ITEM_KEYS: &[&str] = &["items"];
const TIME_SLOT_KEYS: &[&str] = &["time_slots", "timeSlots"];

#[derive(Serialize)]
struct ToggleStatus {
    is_active: bool,
}

fn item_path(id: i64) -> String {
    format!("{MANAGE_ITEMS}/{id}")
}

// =============================================================================
// READS
// =============================================================================

/// # Errors
///
/// Returns the remote failure. Unrecognized list shapes yield an empty list.
pub async fn get_categories(api: &ApiClient, session: &Session) -> Result<Vec<Category>, ApiError> {
    let categories = api
        .fetch(session, RemoteRequest::get(MANAGE_CATEGORIES))
        .await?
        .list(CATEGORY_KEYS);
    info!(count = categories.len(), "categories loaded");
    Ok(categories)
}

/// Items with `item_id` defaulted to `id`.
///
/// # Errors
///
/// Returns the remote failure. Unrecognized list shapes yield an empty list.
pub async fn get_items(api: &ApiClient, session: &Session) -> Result<Vec<Item>, ApiError> {
    let items: Vec<Item> = api
        .fetch(session, RemoteRequest::get(MANAGE_ITEMS))
        .await?
        .list(ITEM_KEYS);
    info!(count = items.len(), "items loaded");
    Ok(items.into_iter().map(Item::normalized).collect())
}

/// # Errors
///
/// Returns the remote failure. Unrecognized list shapes yield an empty list.
pub async fn get_time_slots(api: &ApiClient, session: &Session) -> Result<Vec<TimeSlot>, ApiError> {
    let slots = api
        .fetch(session, RemoteRequest::get(MANAGE_TIME_SLOTS))
        .await?
        .list(TIME_SLOT_KEYS);
    Ok(slots)
}

/// Items belonging to `category_id`, or all items when `None`.
#[must_use]
pub fn filter_by_category(items: Vec<Item>, category_id: Option<i64>) -> Vec<Item> {
    match category_id {
        Some(id) => items.into_iter().filter(|item| item.category_id == id).collect(),
        None => items,
    }
}

// =============================================================================
// WRITES
// =============================================================================

/// # Errors
///
/// Returns the remote failure or a parse error.
pub async fn create_item(api: &ApiClient, session: &Session, fields: &ItemFields) -> Result<Item, ApiError> {
    info!(name = %fields.name, category_id = fields.category_id, "creating item");
    let request = RemoteRequest::post(MANAGE_ITEMS).json(fields)?;
    let item: Item = api.fetch(session, request).await?.data_as()?;
    Ok(item.normalized())
}

/// # Errors
///
/// Returns the remote failure or a parse error.
pub async fn update_item(api: &ApiClient, session: &Session, id: i64, fields: &ItemFields) -> Result<Item, ApiError> {
    info!(id, name = %fields.name, "updating item");
    let request = RemoteRequest::put(item_path(id)).json(&ItemUpdate { id, fields })?;
    let item: Item = api.fetch(session, request).await?.data_as()?;
    Ok(item.normalized())
}

/// # Errors
///
/// Returns the remote failure.
pub async fn delete_item(api: &ApiClient, session: &Session, id: i64) -> Result<(), ApiError> {
    info!(id, "deleting item");
    api.fetch(session, RemoteRequest::delete(item_path(id))).await?;
    Ok(())
}

/// Set the item's active flag. The remote may answer with the updated item
/// or with a bare acknowledgement.
///
/// # Errors
///
/// Returns the remote failure.
pub async fn toggle_item_status(
    api: &ApiClient,
    session: &Session,
    id: i64,
    is_active: bool,
) -> Result<Option<Item>, ApiError> {
    info!(id, is_active, "toggling item status");
    let request = RemoteRequest::patch(format!("{}/toggle-status", item_path(id))).json(&ToggleStatus { is_active })?;
    let envelope = api.fetch(session, request).await?;
    let item = envelope.data_opt::<Item>().map(Item::normalized);
    if item.is_none() {
        warn!(id, "toggle-status response carried no item");
    }
    Ok(item)
}

/// # Errors
///
/// Returns the remote failure or a parse error.
pub async fn create_category(api: &ApiClient, session: &Session, fields: &CategoryFields) -> Result<Category, ApiError> {
    info!(name = %fields.name, "creating category");
    let request = RemoteRequest::post(MANAGE_CATEGORIES).json(fields)?;
    api.fetch(session, request).await?.data_as()
}

/// # Errors
///
/// Returns the remote failure or a parse error.
pub async fn create_time_slot(api: &ApiClient, session: &Session, fields: &TimeSlotFields) -> Result<TimeSlot, ApiError> {
    info!(date = %fields.date, start = %fields.start_time, end = %fields.end_time, "creating time slot");
    let request = RemoteRequest::post(MANAGE_TIME_SLOTS).json(fields)?;
    api.fetch(session, request).await?.data_as()
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
