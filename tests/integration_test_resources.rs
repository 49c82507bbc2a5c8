mod common;

use axum::http::StatusCode;
use common::{entry_body, series_ids, TestApp};
use serde_json::{json, Value};

fn path(id: &str, resource: &str) -> String {
    format!("/api/v1/schedule-entries/{}/{}", id, resource)
}

fn sorted(value: &Value) -> Vec<String> {
    let mut ids: Vec<String> = value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    ids.sort();
    ids
}

#[tokio::test]
async fn test_replace_rooms_on_single_entry() {
    let app = TestApp::new().await;
    let fx = app.seed(0).await;

    let mut body = entry_body(&fx, "2030-01-07T10:00:00Z", 60);
    body["room_ids"] = json!([fx.room]);
    let entry = app.create(body).await;
    let id = entry["id"].as_str().unwrap();

    let (status, updated) = app.put(&path(id, "rooms"), json!({ "room_ids": [fx.room_b, fx.room, fx.room_b] })).await;
    assert_eq!(status, StatusCode::OK, "{}", updated);
    let mut expected = vec![fx.room.clone(), fx.room_b.clone()];
    expected.sort();
    assert_eq!(sorted(&updated["room_ids"]), expected);

    let (status, updated) = app.put(&path(id, "rooms"), json!({ "room_ids": [] })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["room_ids"], json!([]));

    let (status, _) = app.put(&path(id, "rooms"), json!({ "room_ids": [fx.other_room] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.entry(id).await["room_ids"], json!([]));
}

#[tokio::test]
async fn test_replace_rooms_checks_room_conflicts() {
    let app = TestApp::new().await;
    let fx = app.seed(0).await;

    let entry = app.create(entry_body(&fx, "2030-01-07T10:00:00Z", 60)).await;
    let mut other = entry_body(&fx, "2030-01-07T10:30:00Z", 60);
    other["tutor_id"] = json!(fx.tutor_b);
    other["room_ids"] = json!([fx.room_b]);
    let other = app.create(other).await;

    let (status, body) = app
        .put(&path(entry["id"].as_str().unwrap(), "rooms"), json!({ "room_ids": [fx.room_b] }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["conflict_tags"], json!(["room", "overlap"]));
    assert_eq!(body["room_id"], fx.room_b.as_str());
    assert_eq!(body["conflicting_entry_id"], other["id"]);
}

#[tokio::test]
async fn test_replace_rooms_for_future_occurrences() {
    let app = TestApp::new().await;
    let fx = app.seed(0).await;

    let mut body = entry_body(&fx, "2030-01-07T10:00:00Z", 60);
    body["recurrence_type"] = json!("DAILY");
    body["occurrence_count"] = json!(3);
    let created = app.create(body).await;
    let series_id = created["series_id"].as_str().unwrap();
    let ids = series_ids(&app, &fx, series_id).await;

    let (status, body) = app
        .put(&path(&ids[1], "rooms"), json!({ "room_ids": [fx.room], "scope": "FUTURE" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated_count"], 2);

    assert_eq!(app.entry(&ids[0]).await["room_ids"], json!([]));
    assert_eq!(app.entry(&ids[1]).await["room_ids"], json!([fx.room]));
    assert_eq!(app.entry(&ids[2]).await["room_ids"], json!([fx.room]));
}

#[tokio::test]
async fn test_attendees_respect_capacity() {
    let app = TestApp::new().await;
    let fx = app.seed(0).await;

    let entry = app.create(entry_body(&fx, "2030-01-07T10:00:00Z", 60)).await;
    let id = entry["id"].as_str().unwrap();

    let (status, _) = app
        .put(&path(id, "attendees"), json!({ "attendee_student_ids": [fx.student, fx.student_b] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.put(&path(id, "capacity"), json!({ "capacity": 2 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["capacity"], 2);

    let (status, body) = app
        .put(&path(id, "attendees"), json!({ "attendee_student_ids": [fx.student, fx.student_b] }))
        .await;
    assert_eq!(status, StatusCode::OK);
    let mut expected = vec![fx.student.clone(), fx.student_b.clone()];
    expected.sort();
    assert_eq!(sorted(&body["attendee_student_ids"]), expected);

    let (status, _) = app.put(&path(id, "capacity"), json!({ "capacity": 1 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.put(&path(id, "capacity"), json!({ "capacity": 0 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.entry(id).await["capacity"], 2);

    let (status, _) = app
        .put(&path(id, "attendees"), json!({ "attendee_student_ids": [fx.archived_student] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_attendees_check_student_conflicts() {
    let app = TestApp::new().await;
    let fx = app.seed(0).await;

    let mut busy = entry_body(&fx, "2030-01-07T10:00:00Z", 60);
    busy["tutor_id"] = json!(fx.tutor_b);
    busy["attendee_student_ids"] = json!([fx.student_c]);
    app.create(busy).await;

    let entry = app.create(entry_body(&fx, "2030-01-07T10:45:00Z", 30)).await;
    let (status, body) = app
        .put(&path(entry["id"].as_str().unwrap(), "attendees"), json!({ "attendee_student_ids": [fx.student_c] }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["conflict_tags"], json!(["student", "overlap"]));
    assert_eq!(body["student_id"], fx.student_c.as_str());
}

#[tokio::test]
async fn test_service_change_takes_new_rate_snapshot() {
    let app = TestApp::new().await;
    let fx = app.seed(0).await;

    let mut body = entry_body(&fx, "2030-01-07T10:00:00Z", 60);
    body["recurrence_type"] = json!("WEEKLY");
    body["recurrence_days_of_week"] = json!([1, 4]);
    body["occurrence_count"] = json!(4);
    let created = app.create(body).await;
    let ids = series_ids(&app, &fx, created["series_id"].as_str().unwrap()).await;

    let (status, _) = app
        .put(&path(&ids[0], "service"), json!({ "service_offered_id": fx.other_service, "scope": "ALL" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .put(&path(&ids[2], "service"), json!({ "service_offered_id": fx.premium_service, "scope": "ALL" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated_count"], 4);

    for id in &ids {
        let entry = app.entry(id).await;
        assert_eq!(entry["service_offered_id"], fx.premium_service.as_str());
        assert_eq!(entry["hourly_rate_cents_snapshot"], 9000);
    }
}

#[tokio::test]
async fn test_capacity_across_series_checks_every_occurrence() {
    let app = TestApp::new().await;
    let fx = app.seed(0).await;

    let mut body = entry_body(&fx, "2030-01-07T10:00:00Z", 60);
    body["recurrence_type"] = json!("DAILY");
    body["occurrence_count"] = json!(2);
    body["capacity"] = json!(3);
    let created = app.create(body).await;
    let ids = series_ids(&app, &fx, created["series_id"].as_str().unwrap()).await;

    let (status, _) = app
        .put(&path(&ids[1], "attendees"), json!({ "attendee_student_ids": [fx.student, fx.student_b] }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.put(&path(&ids[0], "capacity"), json!({ "capacity": 1, "scope": "ALL" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.entry(&ids[0]).await["capacity"], 3);

    let (status, body) = app.put(&path(&ids[0], "capacity"), json!({ "capacity": 2, "scope": "ALL" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated_count"], 2);
    assert_eq!(app.entry(&ids[1]).await["capacity"], 2);
}
