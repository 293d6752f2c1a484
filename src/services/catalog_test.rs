use super::*;
use std::sync::Arc;

use serde_json::{Value, json};

use crate::api::{AUTH_REFRESH, Method};
use crate::state::test_helpers::{MockTransport, expired_body, session_with};

fn api_with(mock: &Arc<MockTransport>) -> ApiClient {
    ApiClient::new(mock.clone())
}

fn raw_items() -> Value {
    json!([
        { "id": 1, "name": "Room A", "category_id": 10, "is_active": true },
        { "id": 2, "item_id": 20, "name": "Room B", "category_id": 11, "is_active": false }
    ])
}

fn item_fields() -> ItemFields {
    ItemFields { name: "Room C".into(), description: "quiet".into(), category_id: 10, is_active: true }
}

// =============================================================================
// get_items
// =============================================================================

#[tokio::test]
async fn get_items_same_result_for_every_envelope_shape() {
    let shapes = [
        raw_items(),
        json!({ "items": raw_items() }),
        json!({ "status": 200, "data": raw_items() }),
        json!({ "status": 200, "data": { "items": raw_items() } }),
    ];
    for body in shapes {
        let mock = Arc::new(MockTransport::new().reply(Method::GET, MANAGE_ITEMS, 200, body.clone()));
        let items = get_items(&api_with(&mock), &session_with("a1", "r1")).await.unwrap();

        assert_eq!(items.len(), 2, "shape {body}");
        assert_eq!(items[0].item_id, Some(1));
        assert_eq!(items[1].item_id, Some(20));
    }
}

#[tokio::test]
async fn get_items_unknown_shape_is_empty() {
    let mock = Arc::new(MockTransport::new().reply(Method::GET, MANAGE_ITEMS, 200, json!({ "data": { "rows": [] } })));
    let items = get_items(&api_with(&mock), &session_with("a1", "r1")).await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn get_items_propagates_remote_failure() {
    let mock = Arc::new(MockTransport::new().reply(Method::GET, MANAGE_ITEMS, 500, json!({ "message": "boom" })));
    let err = get_items(&api_with(&mock), &session_with("a1", "r1")).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, .. }));
}

#[tokio::test]
async fn get_items_refreshes_expired_token() {
    let mock = Arc::new(
        MockTransport::new()
            .reply(Method::GET, MANAGE_ITEMS, 401, expired_body())
            .reply(Method::GET, MANAGE_ITEMS, 200, raw_items())
            .reply(Method::POST, AUTH_REFRESH, 200, json!({ "access_token": "a2" })),
    );
    let items = get_items(&api_with(&mock), &session_with("a1", "r1")).await.unwrap();
    assert_eq!(items.len(), 2);
}

// =============================================================================
// other reads
// =============================================================================

#[tokio::test]
async fn get_categories_reads_nested_key() {
    let mock = Arc::new(MockTransport::new().reply(
        Method::GET,
        MANAGE_CATEGORIES,
        200,
        json!({ "data": { "categories": [{ "id": 10, "name": "Rooms", "is_active": true }] } }),
    ));
    let categories = get_categories(&api_with(&mock), &session_with("a1", "r1")).await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "Rooms");
}

#[tokio::test]
async fn get_time_slots_accepts_camel_case_key() {
    let mock = Arc::new(MockTransport::new().reply(
        Method::GET,
        MANAGE_TIME_SLOTS,
        200,
        json!({ "data": { "timeSlots": [
            { "id": 1, "startTime": "09:00", "endTime": "10:00", "date": "2024-05-01", "isAvailable": true }
        ] } }),
    ));
    let slots = get_time_slots(&api_with(&mock), &session_with("a1", "r1")).await.unwrap();
    assert_eq!(slots[0].start_time, "09:00");
}

#[test]
fn filter_by_category_keeps_matching_items() {
    let items: Vec<Item> = serde_json::from_value(raw_items()).unwrap();
    assert_eq!(filter_by_category(items.clone(), Some(11)).len(), 1);
    assert_eq!(filter_by_category(items.clone(), None).len(), 2);
    assert!(filter_by_category(items, Some(99)).is_empty());
}

// =============================================================================
// writes
// =============================================================================

#[tokio::test]
async fn create_item_posts_fields() {
    let mock = Arc::new(MockTransport::new().reply(
        Method::POST,
        MANAGE_ITEMS,
        201,
        json!({ "data": { "id": 5, "name": "Room C", "category_id": 10, "is_active": true } }),
    ));

    let item = create_item(&api_with(&mock), &session_with("a1", "r1"), &item_fields()).await.unwrap();

    assert_eq!(item.item_id, Some(5));
    let call = &mock.calls()[0];
    assert_eq!(call.bearer.as_deref(), Some("a1"));
    assert_eq!(
        call.body,
        Some(json!({ "name": "Room C", "description": "quiet", "category_id": 10, "is_active": true }))
    );
}

#[tokio::test]
async fn update_item_puts_to_id_path_with_id_in_body() {
    let mock = Arc::new(MockTransport::new().reply(
        Method::PUT,
        "/manage/items/5",
        200,
        json!({ "id": 5, "name": "Room C", "category_id": 10 }),
    ));

    update_item(&api_with(&mock), &session_with("a1", "r1"), 5, &item_fields()).await.unwrap();

    assert_eq!(mock.calls()[0].body.as_ref().unwrap()["id"], 5);
}

#[tokio::test]
async fn delete_item_accepts_empty_body() {
    let mock = Arc::new(MockTransport::new().reply(Method::DELETE, "/manage/items/5", 204, Value::Null));
    delete_item(&api_with(&mock), &session_with("a1", "r1"), 5).await.unwrap();
    assert_eq!(mock.calls_to(&Method::DELETE, "/manage/items/5").len(), 1);
}

#[tokio::test]
async fn delete_item_surfaces_envelope_error() {
    let mock = Arc::new(MockTransport::new().reply(
        Method::DELETE,
        "/manage/items/5",
        200,
        json!({ "status": 409, "error": "item has reservations" }),
    ));
    let err = delete_item(&api_with(&mock), &session_with("a1", "r1"), 5).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 409, .. }));
}

#[tokio::test]
async fn toggle_item_status_patches_flag() {
    let mock = Arc::new(MockTransport::new().reply(
        Method::PATCH,
        "/manage/items/5/toggle-status",
        200,
        json!({ "data": { "id": 5, "name": "Room C", "is_active": false } }),
    ));

    let item = toggle_item_status(&api_with(&mock), &session_with("a1", "r1"), 5, false).await.unwrap();

    assert_eq!(item.map(|i| i.is_active), Some(false));
    assert_eq!(mock.calls()[0].body, Some(json!({ "is_active": false })));
}

#[tokio::test]
async fn toggle_item_status_tolerates_bare_ack() {
    let mock = Arc::new(MockTransport::new().reply(Method::PATCH, "/manage/items/5/toggle-status", 200, json!({ "status": 200 })));
    let item = toggle_item_status(&api_with(&mock), &session_with("a1", "r1"), 5, true).await.unwrap();
    assert!(item.is_none());
}

#[tokio::test]
async fn create_category_and_time_slot() {
    let mock = Arc::new(
        MockTransport::new()
            .reply(Method::POST, MANAGE_CATEGORIES, 201, json!({ "data": { "id": 3, "name": "Desks" } }))
            .reply(
                Method::POST,
                MANAGE_TIME_SLOTS,
                201,
                json!({ "data": { "id": 9, "startTime": "09:00", "endTime": "10:00", "date": "2024-05-01" } }),
            ),
    );
    let api = api_with(&mock);
    let session = session_with("a1", "r1");

    let category = create_category(
        &api,
        &session,
        &CategoryFields { name: "Desks".into(), description: String::new(), is_active: true },
    )
    .await
    .unwrap();
    let slot = create_time_slot(
        &api,
        &session,
        &TimeSlotFields {
            date: "2024-05-01".into(),
            start_time: "09:00".into(),
            end_time: "10:00".into(),
            is_available: true,
        },
    )
    .await
    .unwrap();

    assert_eq!(category.id, 3);
    assert_eq!(slot.id, 9);
    let slot_call = &mock.calls_to(&Method::POST, MANAGE_TIME_SLOTS)[0];
    assert_eq!(slot_call.body.as_ref().unwrap()["startTime"], "09:00");
}
