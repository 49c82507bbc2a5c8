use std::collections::HashMap;

use crate::domain::{
    models::{
        conflict::{Collision, ConflictProbe},
        schedule_entry::{
            ArchivedFilter, EntryListFilter, ScheduleEntry, ScheduleEntryAttendee, ScheduleEntryDetails,
            ScheduleEntryRoom,
        },
    },
    ports::{ScheduleEntryRepository, ScheduleWrite, WriteBatch},
    services::conflict::conflict_error,
};
use crate::error::AppError;
use crate::infra::repositories::{assemble_details, collision_select, collision_source};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Row, Sqlite, SqliteConnection, SqlitePool};
use tracing::warn;

pub struct SqliteScheduleRepo {
    pool: SqlitePool,
}

impl SqliteScheduleRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn join_rows(&self, entry_ids: &[String]) -> Result<(Vec<ScheduleEntryRoom>, Vec<ScheduleEntryAttendee>), AppError> {
        if entry_ids.is_empty() {
            return Ok((vec![], vec![]));
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT schedule_entry_id, room_id FROM schedule_entry_rooms WHERE schedule_entry_id IN (",
        );
        push_id_list(&mut qb, entry_ids);
        qb.push(" ORDER BY room_id");
        let rooms = qb.build_query_as::<ScheduleEntryRoom>().fetch_all(&self.pool).await.map_err(AppError::Database)?;

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT schedule_entry_id, student_id FROM schedule_entry_attendees WHERE schedule_entry_id IN (",
        );
        push_id_list(&mut qb, entry_ids);
        qb.push(" ORDER BY student_id");
        let attendees = qb.build_query_as::<ScheduleEntryAttendee>().fetch_all(&self.pool).await.map_err(AppError::Database)?;

        Ok((rooms, attendees))
    }
}

/// Pushes `id1, id2, ...)` as bound parameters.
fn push_id_list(qb: &mut QueryBuilder<'_, Sqlite>, ids: &[String]) {
    let mut list = qb.separated(", ");
    for id in ids {
        list.push_bind(id.clone());
    }
    list.push_unseparated(")");
}

async fn collision_on(conn: &mut SqliteConnection, probe: &ConflictProbe) -> Result<Option<Collision>, AppError> {
    if probe.is_empty() {
        return Ok(None);
    }
    let (_, column) = collision_source(probe.kind);

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(collision_select(probe.kind));
    qb.push(format!(" AND e.{} > ", probe.kind.existing_end_column()));
    qb.push_bind(probe.query_start());
    qb.push(" AND e.start_at < ");
    qb.push_bind(probe.query_end());
    qb.push(format!(" AND {} IN (", column));
    push_id_list(&mut qb, &probe.resource_ids);
    if !probe.exclude_ids.is_empty() {
        qb.push(" AND e.id NOT IN (");
        push_id_list(&mut qb, &probe.exclude_ids);
    }
    qb.push(" ORDER BY e.start_at, e.id LIMIT 1");

    qb.build_query_as::<Collision>().fetch_optional(&mut *conn).await.map_err(AppError::Database)
}

async fn replace_joins(
    conn: &mut SqliteConnection,
    table: &str,
    column: &str,
    entry_id: &str,
    ids: &[String],
) -> Result<(), AppError> {
    sqlx::query(&format!("DELETE FROM {} WHERE schedule_entry_id = ?", table))
        .bind(entry_id)
        .execute(&mut *conn).await.map_err(AppError::Database)?;

    if ids.is_empty() {
        return Ok(());
    }
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!("INSERT INTO {} (schedule_entry_id, {}) ", table, column));
    qb.push_values(ids.iter(), |mut b, id| {
        b.push_bind(entry_id.to_string()).push_bind(id.clone());
    });
    qb.build().execute(&mut *conn).await.map_err(AppError::Database)?;
    Ok(())
}

async fn apply_write(conn: &mut SqliteConnection, write: &ScheduleWrite, now: DateTime<Utc>) -> Result<(), AppError> {
    match write {
        ScheduleWrite::InsertEntry(e) => {
            sqlx::query(
                "INSERT INTO schedule_entries (id, organization_id, location_id, service_offered_id, tutor_id, product_id, subject_id, topic_id, resources_text,
                    start_at, duration_minutes, include_buffer, end_at, blocked_end_at, capacity, recurrence_type, series_id, recurrence_interval,
                    recurrence_days_of_week, series_end_date, occurrence_count, hourly_rate_cents_snapshot, archived_at, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
            )
                .bind(&e.id).bind(&e.organization_id).bind(&e.location_id).bind(&e.service_offered_id).bind(&e.tutor_id)
                .bind(&e.product_id).bind(&e.subject_id).bind(&e.topic_id).bind(&e.resources_text)
                .bind(e.start_at).bind(e.duration_minutes).bind(e.include_buffer).bind(e.end_at).bind(e.blocked_end_at)
                .bind(e.capacity).bind(&e.recurrence_type).bind(&e.series_id).bind(e.recurrence_interval)
                .bind(&e.recurrence_days_of_week).bind(e.series_end_date).bind(e.occurrence_count)
                .bind(e.hourly_rate_cents_snapshot).bind(e.archived_at).bind(e.created_at).bind(e.updated_at)
                .execute(&mut *conn).await.map_err(AppError::Database)?;
        }
        ScheduleWrite::UpdateWindow { entry_id, window } => {
            sqlx::query(
                "UPDATE schedule_entries SET start_at = ?, duration_minutes = ?, include_buffer = ?, end_at = ?, blocked_end_at = ?, updated_at = ?
                 WHERE id = ?"
            )
                .bind(window.start_at).bind(window.duration_minutes).bind(window.include_buffer)
                .bind(window.end_at).bind(window.blocked_end_at).bind(now).bind(entry_id)
                .execute(&mut *conn).await.map_err(AppError::Database)?;
        }
        ScheduleWrite::SetArchived { entry_id, archived_at } => {
            sqlx::query("UPDATE schedule_entries SET archived_at = ?, updated_at = ? WHERE id = ?")
                .bind(archived_at).bind(now).bind(entry_id)
                .execute(&mut *conn).await.map_err(AppError::Database)?;
        }
        ScheduleWrite::ReplaceRooms { entry_id, room_ids } => {
            replace_joins(conn, "schedule_entry_rooms", "room_id", entry_id, room_ids).await?;
        }
        ScheduleWrite::ReplaceAttendees { entry_id, student_ids } => {
            replace_joins(conn, "schedule_entry_attendees", "student_id", entry_id, student_ids).await?;
        }
        ScheduleWrite::UpdateService { entry_id, service_offered_id, hourly_rate_cents_snapshot } => {
            sqlx::query("UPDATE schedule_entries SET service_offered_id = ?, hourly_rate_cents_snapshot = ?, updated_at = ? WHERE id = ?")
                .bind(service_offered_id).bind(hourly_rate_cents_snapshot).bind(now).bind(entry_id)
                .execute(&mut *conn).await.map_err(AppError::Database)?;
        }
        ScheduleWrite::UpdateCapacity { entry_id, capacity } => {
            sqlx::query("UPDATE schedule_entries SET capacity = ?, updated_at = ? WHERE id = ?")
                .bind(capacity).bind(now).bind(entry_id)
                .execute(&mut *conn).await.map_err(AppError::Database)?;
        }
    }
    Ok(())
}

#[async_trait]
impl ScheduleEntryRepository for SqliteScheduleRepo {
    async fn find_by_id(&self, id: &str) -> Result<Option<ScheduleEntry>, AppError> {
        sqlx::query_as::<_, ScheduleEntry>("SELECT * FROM schedule_entries WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_details(&self, id: &str) -> Result<Option<ScheduleEntryDetails>, AppError> {
        let Some(entry) = self.find_by_id(id).await? else {
            return Ok(None);
        };
        let (rooms, attendees) = self.join_rows(&[entry.id.clone()]).await?;
        Ok(assemble_details(vec![entry], rooms, attendees).pop())
    }

    async fn list_by_location(&self, location_id: &str, filter: &EntryListFilter) -> Result<Vec<ScheduleEntryDetails>, AppError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM schedule_entries WHERE location_id = ");
        qb.push_bind(location_id.to_string());
        if let Some(series_id) = &filter.series_id {
            qb.push(" AND series_id = ");
            qb.push_bind(series_id.clone());
        }
        match filter.archived {
            ArchivedFilter::Active => { qb.push(" AND archived_at IS NULL"); }
            ArchivedFilter::Archived => { qb.push(" AND archived_at IS NOT NULL"); }
            ArchivedFilter::All => {}
        }
        qb.push(" ORDER BY start_at ASC, id ASC");

        let entries = qb.build_query_as::<ScheduleEntry>().fetch_all(&self.pool).await.map_err(AppError::Database)?;
        let ids: Vec<String> = entries.iter().map(|e| e.id.clone()).collect();
        let (rooms, attendees) = self.join_rows(&ids).await?;
        Ok(assemble_details(entries, rooms, attendees))
    }

    async fn list_by_series(&self, series_id: &str) -> Result<Vec<ScheduleEntry>, AppError> {
        sqlx::query_as::<_, ScheduleEntry>("SELECT * FROM schedule_entries WHERE series_id = ? ORDER BY start_at ASC, id ASC").bind(series_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn room_ids(&self, entry_id: &str) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar::<_, String>("SELECT room_id FROM schedule_entry_rooms WHERE schedule_entry_id = ? ORDER BY room_id").bind(entry_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn attendee_ids(&self, entry_id: &str) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar::<_, String>("SELECT student_id FROM schedule_entry_attendees WHERE schedule_entry_id = ? ORDER BY student_id").bind(entry_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn attendee_counts(&self, entry_ids: &[String]) -> Result<HashMap<String, i64>, AppError> {
        if entry_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT schedule_entry_id, COUNT(*) AS count FROM schedule_entry_attendees WHERE schedule_entry_id IN (",
        );
        push_id_list(&mut qb, entry_ids);
        qb.push(" GROUP BY schedule_entry_id");

        let rows = qb.build().fetch_all(&self.pool).await.map_err(AppError::Database)?;
        Ok(rows
            .into_iter()
            .map(|row| (row.get::<String, _>("schedule_entry_id"), row.get::<i64, _>("count")))
            .collect())
    }

    async fn find_collision(&self, probe: &ConflictProbe) -> Result<Option<Collision>, AppError> {
        let mut conn = self.pool.acquire().await.map_err(AppError::Database)?;
        collision_on(&mut conn, probe).await
    }

    async fn apply(&self, batch: &WriteBatch) -> Result<(), AppError> {
        if batch.is_empty() {
            return Ok(());
        }
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        for write in &batch.writes {
            apply_write(&mut tx, write, now).await?;
        }

        // The first write holds the database write lock, so these checks see every committed booking.
        for probe in &batch.guards {
            if let Some(collision) = collision_on(&mut tx, probe).await? {
                tx.rollback().await.map_err(AppError::Database)?;
                warn!("Write batch rolled back: {} {} collides with entry {} at commit", probe.kind.as_str(), probe.window.start_at.to_rfc3339(), collision.entry_id);
                return Err(conflict_error(probe, &collision).into());
            }
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}
