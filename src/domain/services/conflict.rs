use std::sync::Arc;
use crate::domain::{
    models::conflict::{Collision, ConflictProbe, ResourceKind},
    ports::ScheduleEntryRepository,
};
use crate::domain::services::recurrence::EntryWindow;
use crate::error::{AppError, ConflictError};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictTag {
    Overlap,
    Buffer,
}

impl ConflictTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictTag::Overlap => "overlap",
            ConflictTag::Buffer => "buffer",
        }
    }
}

/// `Overlap` when the real sessions intersect, `Buffer` when only a buffer does.
/// Student collisions are always real-window collisions.
pub fn classify(kind: ResourceKind, window: &EntryWindow, collision: &Collision) -> ConflictTag {
    if !kind.honours_buffer() {
        return ConflictTag::Overlap;
    }
    if window.start_at < collision.end_at && window.end_at > collision.start_at {
        ConflictTag::Overlap
    } else {
        ConflictTag::Buffer
    }
}

pub fn conflict_error(probe: &ConflictProbe, collision: &Collision) -> ConflictError {
    let tag = classify(probe.kind, &probe.window, collision);

    let subject = match probe.kind {
        ResourceKind::Tutor => "Tutor",
        ResourceKind::Room => "Room",
        ResourceKind::Student => "Student",
    };
    let mut message = match tag {
        ConflictTag::Overlap => format!("{} is already booked during this time", subject),
        ConflictTag::Buffer => format!("{} buffer time collides with another booking", subject),
    };
    if probe.series_id.is_some() {
        message.push_str(&format!(" (occurrence starting {})", probe.window.start_at.to_rfc3339()));
    }

    let resource_id = Some(collision.resource_id.clone());
    ConflictError {
        message,
        conflict_tags: vec![probe.kind.as_str().to_string(), tag.as_str().to_string()],
        conflicting_entry_id: collision.entry_id.clone(),
        tutor_id: if probe.kind == ResourceKind::Tutor { resource_id.clone() } else { None },
        room_id: if probe.kind == ResourceKind::Room { resource_id.clone() } else { None },
        student_id: if probe.kind == ResourceKind::Student { resource_id } else { None },
        series_id: probe.series_id.clone(),
        occurrence_start_at: probe.series_id.as_ref().map(|_| probe.window.start_at),
    }
}

/// Tutor, room and student probes for one occurrence.
pub fn probes_for(
    tutor_id: &str,
    room_ids: &[String],
    student_ids: &[String],
    window: EntryWindow,
    exclude_ids: &[String],
    series_id: Option<&str>,
) -> Vec<ConflictProbe> {
    [
        ConflictProbe::tutor(tutor_id, window, exclude_ids),
        ConflictProbe::rooms(room_ids, window, exclude_ids),
        ConflictProbe::students(student_ids, window, exclude_ids),
    ]
        .into_iter()
        .filter(|p| !p.is_empty())
        .map(|p| p.in_series(series_id))
        .collect()
}

pub struct ConflictDetector {
    repo: Arc<dyn ScheduleEntryRepository>,
}

impl ConflictDetector {
    pub fn new(repo: Arc<dyn ScheduleEntryRepository>) -> Self {
        Self { repo }
    }

    pub async fn check(&self, probe: &ConflictProbe) -> Result<(), AppError> {
        if probe.is_empty() {
            return Ok(());
        }
        if let Some(collision) = self.repo.find_collision(probe).await? {
            let conflict = conflict_error(probe, &collision);
            warn!(
                "Rejected {} booking at {}: collides with entry {} ({:?})",
                probe.kind.as_str(),
                probe.window.start_at.to_rfc3339(),
                collision.entry_id,
                conflict.conflict_tags
            );
            return Err(conflict.into());
        }
        Ok(())
    }

    /// Stops at the first colliding probe.
    pub async fn check_all(&self, probes: &[ConflictProbe]) -> Result<(), AppError> {
        for probe in probes {
            self.check(probe).await?;
        }
        Ok(())
    }
}
