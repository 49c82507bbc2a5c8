use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::domain::services::recurrence::EntryWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Tutor,
    Room,
    Student,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Tutor => "tutor",
            ResourceKind::Room => "room",
            ResourceKind::Student => "student",
        }
    }

    /// Tutors and rooms stay blocked through the buffer; students only for the session itself.
    pub fn honours_buffer(&self) -> bool {
        !matches!(self, ResourceKind::Student)
    }

    /// Column of an existing entry that bounds how long it holds this kind of resource.
    pub fn existing_end_column(&self) -> &'static str {
        if self.honours_buffer() { "blocked_end_at" } else { "end_at" }
    }
}

/// One conflict question: does any active entry, other than `exclude_ids`,
/// hold one of `resource_ids` during `window`?
#[derive(Debug, Clone)]
pub struct ConflictProbe {
    pub kind: ResourceKind,
    pub resource_ids: Vec<String>,
    pub window: EntryWindow,
    pub exclude_ids: Vec<String>,
    pub series_id: Option<String>,
}

impl ConflictProbe {
    pub fn tutor(tutor_id: &str, window: EntryWindow, exclude_ids: &[String]) -> Self {
        Self::new(ResourceKind::Tutor, vec![tutor_id.to_string()], window, exclude_ids)
    }

    pub fn rooms(room_ids: &[String], window: EntryWindow, exclude_ids: &[String]) -> Self {
        Self::new(ResourceKind::Room, room_ids.to_vec(), window, exclude_ids)
    }

    pub fn students(student_ids: &[String], window: EntryWindow, exclude_ids: &[String]) -> Self {
        Self::new(ResourceKind::Student, student_ids.to_vec(), window, exclude_ids)
    }

    fn new(kind: ResourceKind, resource_ids: Vec<String>, window: EntryWindow, exclude_ids: &[String]) -> Self {
        Self {
            kind,
            resource_ids,
            window,
            exclude_ids: exclude_ids.to_vec(),
            series_id: None,
        }
    }

    pub fn in_series(mut self, series_id: Option<&str>) -> Self {
        self.series_id = series_id.map(str::to_string);
        self
    }

    /// Start of the candidate interval compared against existing entries.
    pub fn query_start(&self) -> DateTime<Utc> {
        self.window.start_at
    }

    /// End of the candidate interval compared against existing entries.
    pub fn query_end(&self) -> DateTime<Utc> {
        if self.kind.honours_buffer() {
            self.window.blocked_end_at
        } else {
            self.window.end_at
        }
    }

    pub fn is_empty(&self) -> bool {
        self.resource_ids.is_empty()
    }
}

/// An existing entry found to collide with a probe, and the resource it holds.
#[derive(Debug, Clone, FromRow)]
pub struct Collision {
    pub entry_id: String,
    pub resource_id: String,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub blocked_end_at: DateTime<Utc>,
}
