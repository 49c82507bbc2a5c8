pub mod sqlite_directory_repo;
pub mod sqlite_schedule_repo;

pub mod postgres_directory_repo;
pub mod postgres_schedule_repo;

use std::collections::HashMap;

use crate::domain::models::{
    conflict::ResourceKind,
    schedule_entry::{ScheduleEntry, ScheduleEntryAttendee, ScheduleEntryDetails, ScheduleEntryRoom},
};

/// FROM clause and resource column a collision query reads for `kind`.
/// The schedule entry table is always aliased `e`.
pub(crate) fn collision_source(kind: ResourceKind) -> (&'static str, &'static str) {
    match kind {
        ResourceKind::Tutor => ("schedule_entries e", "e.tutor_id"),
        ResourceKind::Room => (
            "schedule_entries e JOIN schedule_entry_rooms j ON j.schedule_entry_id = e.id",
            "j.room_id",
        ),
        ResourceKind::Student => (
            "schedule_entries e JOIN schedule_entry_attendees j ON j.schedule_entry_id = e.id",
            "j.student_id",
        ),
    }
}

pub(crate) fn collision_select(kind: ResourceKind) -> String {
    let (source, column) = collision_source(kind);
    format!(
        "SELECT e.id AS entry_id, {column} AS resource_id, e.start_at, e.end_at, e.blocked_end_at \
         FROM {source} \
         WHERE e.archived_at IS NULL",
        column = column,
        source = source,
    )
}

/// Joins room and attendee rows onto their entries, keeping entry order.
pub(crate) fn assemble_details(
    entries: Vec<ScheduleEntry>,
    rooms: Vec<ScheduleEntryRoom>,
    attendees: Vec<ScheduleEntryAttendee>,
) -> Vec<ScheduleEntryDetails> {
    let mut rooms_by_entry: HashMap<String, Vec<String>> = HashMap::new();
    for row in rooms {
        rooms_by_entry.entry(row.schedule_entry_id).or_default().push(row.room_id);
    }
    let mut attendees_by_entry: HashMap<String, Vec<String>> = HashMap::new();
    for row in attendees {
        attendees_by_entry.entry(row.schedule_entry_id).or_default().push(row.student_id);
    }

    entries
        .into_iter()
        .map(|entry| ScheduleEntryDetails {
            room_ids: rooms_by_entry.remove(&entry.id).unwrap_or_default(),
            attendee_student_ids: attendees_by_entry.remove(&entry.id).unwrap_or_default(),
            entry,
        })
        .collect()
}
