use crate::domain::models::{
    conflict::{Collision, ConflictProbe},
    directory::{Location, Organization, Room, ServiceOffered, Student, Tutor},
    schedule_entry::{EntryListFilter, ScheduleEntry, ScheduleEntryDetails},
};
use crate::domain::services::recurrence::EntryWindow;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A single row-level change inside an atomic write batch.
#[derive(Debug, Clone)]
pub enum ScheduleWrite {
    InsertEntry(ScheduleEntry),
    UpdateWindow { entry_id: String, window: EntryWindow },
    SetArchived { entry_id: String, archived_at: Option<DateTime<Utc>> },
    ReplaceRooms { entry_id: String, room_ids: Vec<String> },
    ReplaceAttendees { entry_id: String, student_ids: Vec<String> },
    UpdateService { entry_id: String, service_offered_id: String, hourly_rate_cents_snapshot: Option<i64> },
    UpdateCapacity { entry_id: String, capacity: i32 },
}

/// Writes that commit together or not at all.
///
/// `guards` are re-evaluated inside the commit transaction after the writes
/// are applied; any collision aborts the whole batch.
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    pub writes: Vec<ScheduleWrite>,
    pub guards: Vec<ConflictProbe>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, write: ScheduleWrite) {
        self.writes.push(write);
    }

    pub fn guard(&mut self, probes: impl IntoIterator<Item = ConflictProbe>) {
        self.guards.extend(probes.into_iter().filter(|p| !p.is_empty()));
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }
}

#[async_trait]
pub trait ScheduleEntryRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<ScheduleEntry>, AppError>;
    async fn find_details(&self, id: &str) -> Result<Option<ScheduleEntryDetails>, AppError>;
    async fn list_by_location(&self, location_id: &str, filter: &EntryListFilter) -> Result<Vec<ScheduleEntryDetails>, AppError>;
    async fn list_by_series(&self, series_id: &str) -> Result<Vec<ScheduleEntry>, AppError>;
    async fn room_ids(&self, entry_id: &str) -> Result<Vec<String>, AppError>;
    async fn attendee_ids(&self, entry_id: &str) -> Result<Vec<String>, AppError>;
    async fn attendee_counts(&self, entry_ids: &[String]) -> Result<HashMap<String, i64>, AppError>;
    async fn find_collision(&self, probe: &ConflictProbe) -> Result<Option<Collision>, AppError>;
    async fn apply(&self, batch: &WriteBatch) -> Result<(), AppError>;
}

#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    async fn find_organization(&self, id: &str) -> Result<Option<Organization>, AppError>;
    async fn find_location(&self, id: &str) -> Result<Option<Location>, AppError>;
    async fn find_service(&self, id: &str) -> Result<Option<ServiceOffered>, AppError>;
    async fn find_tutor(&self, id: &str) -> Result<Option<Tutor>, AppError>;
    async fn tutor_serves_location(&self, tutor_id: &str, location_id: &str) -> Result<bool, AppError>;
    async fn find_rooms(&self, ids: &[String]) -> Result<Vec<Room>, AppError>;
    async fn find_students(&self, ids: &[String]) -> Result<Vec<Student>, AppError>;
}
