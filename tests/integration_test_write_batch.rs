mod common;

use chrono::{DateTime, Utc};
use common::{entry_body, Fixture, TestApp};
use scheduling_backend::{
    domain::{
        models::{
            conflict::ConflictProbe,
            schedule_entry::{NewScheduleEntryParams, ScheduleEntry, SeriesFields},
        },
        ports::{ScheduleEntryRepository, ScheduleWrite, WriteBatch},
        services::recurrence::compute_window,
    },
    error::AppError,
    infra::repositories::sqlite_schedule_repo::SqliteScheduleRepo,
};

fn ad_hoc_entry(fx: &Fixture, start_at: &str, duration_minutes: i32) -> ScheduleEntry {
    let start: DateTime<Utc> = start_at.parse().unwrap();
    ScheduleEntry::new(NewScheduleEntryParams {
        organization_id: fx.org.clone(),
        location_id: fx.location.clone(),
        service_offered_id: fx.service.clone(),
        tutor_id: fx.tutor.clone(),
        product_id: None,
        subject_id: None,
        topic_id: None,
        resources_text: None,
        window: compute_window(start, duration_minutes, false, 0),
        capacity: 1,
        hourly_rate_cents_snapshot: Some(6000),
        series: SeriesFields::default(),
    })
}

/// Queues an insert guarded by its own tutor check, the way the service builds batches.
fn guarded_insert(batch: &mut WriteBatch, entry: ScheduleEntry) {
    let probe = ConflictProbe::tutor(&entry.tutor_id, entry.window(), &[entry.id.clone()]);
    batch.push(ScheduleWrite::InsertEntry(entry));
    batch.guard([probe]);
}

async fn persisted(app: &TestApp, id: &str) -> bool {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM schedule_entries WHERE id = ?")
        .bind(id)
        .fetch_one(&app.pool)
        .await
        .unwrap()
        > 0
}

#[tokio::test]
async fn test_guard_rejects_booking_committed_after_precheck() {
    let app = TestApp::new().await;
    let fx = app.seed(0).await;
    let repo = SqliteScheduleRepo::new(app.pool.clone());

    // Stands in for a booking that another request committed after this batch was checked.
    let existing = app.create(entry_body(&fx, "2030-01-07T10:00:00Z", 60)).await;

    let late = ad_hoc_entry(&fx, "2030-01-07T10:30:00Z", 60);
    let late_id = late.id.clone();
    let mut batch = WriteBatch::new();
    guarded_insert(&mut batch, late);

    match repo.apply(&batch).await {
        Err(AppError::ScheduleConflict(conflict)) => {
            assert_eq!(conflict.conflict_tags, vec!["tutor", "overlap"]);
            assert_eq!(conflict.conflicting_entry_id, existing["id"].as_str().unwrap());
            assert_eq!(conflict.tutor_id.as_deref(), Some(fx.tutor.as_str()));
        }
        other => panic!("expected a schedule conflict, got {:?}", other),
    }
    assert!(!persisted(&app, &late_id).await);
}

#[tokio::test]
async fn test_guard_failure_rolls_back_every_write_in_batch() {
    let app = TestApp::new().await;
    let fx = app.seed(0).await;
    let repo = SqliteScheduleRepo::new(app.pool.clone());

    app.create(entry_body(&fx, "2030-01-14T10:00:00Z", 60)).await;

    let free = ad_hoc_entry(&fx, "2030-01-07T10:00:00Z", 60);
    let clashing = ad_hoc_entry(&fx, "2030-01-14T10:15:00Z", 30);
    let (free_id, clashing_id) = (free.id.clone(), clashing.id.clone());

    let mut batch = WriteBatch::new();
    guarded_insert(&mut batch, free);
    guarded_insert(&mut batch, clashing);
    batch.push(ScheduleWrite::ReplaceRooms { entry_id: free_id.clone(), room_ids: vec![fx.room.clone()] });

    let result = repo.apply(&batch).await;
    assert!(matches!(result, Err(AppError::ScheduleConflict(_))), "{:?}", result);

    assert!(!persisted(&app, &free_id).await);
    assert!(!persisted(&app, &clashing_id).await);
    let rooms: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM schedule_entry_rooms WHERE schedule_entry_id = ?")
        .bind(&free_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(rooms, 0);
}

#[tokio::test]
async fn test_guarded_batch_commits_when_slot_is_free() {
    let app = TestApp::new().await;
    let fx = app.seed(0).await;
    let repo = SqliteScheduleRepo::new(app.pool.clone());

    app.create(entry_body(&fx, "2030-01-07T10:00:00Z", 60)).await;

    // Back to back with the existing booking; guards exclude the batch's own row.
    let next = ad_hoc_entry(&fx, "2030-01-07T11:00:00Z", 60);
    let next_id = next.id.clone();
    let mut batch = WriteBatch::new();
    guarded_insert(&mut batch, next);

    repo.apply(&batch).await.unwrap();
    assert!(persisted(&app, &next_id).await);
    assert_eq!(app.entry(&next_id).await["start_at"], "2030-01-07T11:00:00Z");
}
