use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::models::schedule_entry::{EditScope, RecurrenceType, ScheduleEntryDetails};

/// Distinguishes an omitted field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn default_capacity() -> i32 {
    1
}

#[derive(Debug, Deserialize, Clone)]
pub struct CreateEntryCommand {
    pub organization_id: String,
    pub location_id: String,
    pub service_offered_id: String,
    pub tutor_id: String,
    pub start_at: DateTime<Utc>,
    pub duration_minutes: i32,
    #[serde(default)]
    pub include_buffer: bool,
    #[serde(default = "default_capacity")]
    pub capacity: i32,
    #[serde(default)]
    pub recurrence_type: RecurrenceType,
    pub recurrence_interval: Option<i32>,
    pub recurrence_days_of_week: Option<Vec<u32>>,
    pub series_end_date: Option<NaiveDate>,
    pub occurrence_count: Option<i32>,
    #[serde(default)]
    pub room_ids: Vec<String>,
    #[serde(default)]
    pub attendee_student_ids: Vec<String>,
    pub product_id: Option<String>,
    pub subject_id: Option<String>,
    pub topic_id: Option<String>,
    pub resources_text: Option<String>,
}

/// Omitted `duration_minutes` / `include_buffer` keep the anchor's values.
#[derive(Debug, Deserialize, Clone)]
pub struct RescheduleCommand {
    pub start_at: DateTime<Utc>,
    pub duration_minutes: Option<i32>,
    pub include_buffer: Option<bool>,
    #[serde(default)]
    pub scope: EditScope,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ScopeCommand {
    #[serde(default)]
    pub scope: EditScope,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpdateRoomsCommand {
    pub room_ids: Vec<String>,
    #[serde(default)]
    pub scope: EditScope,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpdateAttendeesCommand {
    pub attendee_student_ids: Vec<String>,
    #[serde(default)]
    pub scope: EditScope,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpdateServiceCommand {
    pub service_offered_id: String,
    #[serde(default)]
    pub scope: EditScope,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpdateCapacityCommand {
    pub capacity: i32,
    #[serde(default)]
    pub scope: EditScope,
}

/// Sparse overrides for a single series occurrence. Omitted fields keep the
/// occurrence's current value; `null` clears the nullable ones.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ExceptionEditCommand {
    pub start_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub include_buffer: Option<bool>,
    pub tutor_id: Option<String>,
    pub service_offered_id: Option<String>,
    pub capacity: Option<i32>,
    pub room_ids: Option<Vec<String>>,
    pub attendee_student_ids: Option<Vec<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub product_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub subject_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub topic_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub resources_text: Option<Option<String>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RestoreExceptionCommand {
    pub archived_series_entry_id: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct SeriesCreated {
    pub series_id: String,
    pub created_count: usize,
    pub entry_ids: Vec<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct SeriesUpdated {
    pub series_id: String,
    pub scope: EditScope,
    pub updated_count: usize,
    pub entry_ids: Vec<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct ExceptionCreated {
    pub series_id: String,
    pub archived_entry_id: String,
    pub exception_entry_id: String,
    pub exception: ScheduleEntryDetails,
}

#[derive(Debug, Serialize, Clone)]
#[serde(untagged)]
pub enum CreateOutcome {
    Entry(Box<ScheduleEntryDetails>),
    Series(SeriesCreated),
}

/// A THIS-scoped mutation returns the updated entry; FUTURE/ALL return a series summary.
#[derive(Debug, Serialize, Clone)]
#[serde(untagged)]
pub enum MutationOutcome {
    Entry(Box<ScheduleEntryDetails>),
    Series(SeriesUpdated),
}
