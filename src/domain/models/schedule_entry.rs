use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::services::recurrence::EntryWindow;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecurrenceType {
    #[default]
    AdHoc,
    Weekly,
    Daily,
}

impl RecurrenceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceType::AdHoc => "AD_HOC",
            RecurrenceType::Weekly => "WEEKLY",
            RecurrenceType::Daily => "DAILY",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "AD_HOC" => Some(RecurrenceType::AdHoc),
            "WEEKLY" => Some(RecurrenceType::Weekly),
            "DAILY" => Some(RecurrenceType::Daily),
            _ => None,
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, RecurrenceType::AdHoc)
    }
}

/// Which members of a series an operation applies to, relative to the anchor entry.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditScope {
    #[default]
    This,
    Future,
    All,
}

impl EditScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditScope::This => "THIS",
            EditScope::Future => "FUTURE",
            EditScope::All => "ALL",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ScheduleEntry {
    pub id: String,
    pub organization_id: String,
    pub location_id: String,
    pub service_offered_id: String,
    pub tutor_id: String,
    pub product_id: Option<String>,
    pub subject_id: Option<String>,
    pub topic_id: Option<String>,
    pub resources_text: Option<String>,
    pub start_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub include_buffer: bool,
    pub end_at: DateTime<Utc>,
    pub blocked_end_at: DateTime<Utc>,
    pub capacity: i32,
    pub recurrence_type: String,
    pub series_id: Option<String>,
    pub recurrence_interval: Option<i32>,
    pub recurrence_days_of_week: Option<Json<Vec<u32>>>,
    pub series_end_date: Option<NaiveDate>,
    pub occurrence_count: Option<i32>,
    pub hourly_rate_cents_snapshot: Option<i64>,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Recurrence columns shared by every occurrence of a generated series.
#[derive(Debug, Clone, Default)]
pub struct SeriesFields {
    pub series_id: Option<String>,
    pub recurrence_type: RecurrenceType,
    pub recurrence_interval: Option<i32>,
    pub recurrence_days_of_week: Option<Vec<u32>>,
    pub series_end_date: Option<NaiveDate>,
    pub occurrence_count: Option<i32>,
}

pub struct NewScheduleEntryParams {
    pub organization_id: String,
    pub location_id: String,
    pub service_offered_id: String,
    pub tutor_id: String,
    pub product_id: Option<String>,
    pub subject_id: Option<String>,
    pub topic_id: Option<String>,
    pub resources_text: Option<String>,
    pub window: EntryWindow,
    pub capacity: i32,
    pub hourly_rate_cents_snapshot: Option<i64>,
    pub series: SeriesFields,
}

impl ScheduleEntry {
    pub fn new(params: NewScheduleEntryParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            organization_id: params.organization_id,
            location_id: params.location_id,
            service_offered_id: params.service_offered_id,
            tutor_id: params.tutor_id,
            product_id: params.product_id,
            subject_id: params.subject_id,
            topic_id: params.topic_id,
            resources_text: params.resources_text,
            start_at: params.window.start_at,
            duration_minutes: params.window.duration_minutes,
            include_buffer: params.window.include_buffer,
            end_at: params.window.end_at,
            blocked_end_at: params.window.blocked_end_at,
            capacity: params.capacity,
            recurrence_type: params.series.recurrence_type.as_str().to_string(),
            series_id: params.series.series_id,
            recurrence_interval: params.series.recurrence_interval,
            recurrence_days_of_week: params.series.recurrence_days_of_week.map(Json),
            series_end_date: params.series.series_end_date,
            occurrence_count: params.series.occurrence_count,
            hourly_rate_cents_snapshot: params.hourly_rate_cents_snapshot,
            archived_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn recurrence(&self) -> RecurrenceType {
        RecurrenceType::parse(&self.recurrence_type).unwrap_or_default()
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    pub fn window(&self) -> EntryWindow {
        EntryWindow {
            start_at: self.start_at,
            duration_minutes: self.duration_minutes,
            include_buffer: self.include_buffer,
            end_at: self.end_at,
            blocked_end_at: self.blocked_end_at,
        }
    }
}

/// An entry together with its room and attendee join rows.
#[derive(Debug, Serialize, Clone)]
pub struct ScheduleEntryDetails {
    #[serde(flatten)]
    pub entry: ScheduleEntry,
    pub room_ids: Vec<String>,
    pub attendee_student_ids: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ScheduleEntryRoom {
    pub schedule_entry_id: String,
    pub room_id: String,
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ScheduleEntryAttendee {
    pub schedule_entry_id: String,
    pub student_id: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArchivedFilter {
    #[default]
    Active,
    Archived,
    All,
}

#[derive(Debug, Clone, Default)]
pub struct EntryListFilter {
    pub series_id: Option<String>,
    pub archived: ArchivedFilter,
}
