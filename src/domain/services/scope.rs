use crate::domain::{
    models::schedule_entry::{EditScope, ScheduleEntry},
    ports::ScheduleEntryRepository,
};
use crate::error::AppError;

/// Which lifecycle state the entries of a scoped operation must be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeTarget {
    Active,
    Archived,
}

impl ScopeTarget {
    fn matches(&self, entry: &ScheduleEntry) -> bool {
        match self {
            ScopeTarget::Active => !entry.is_archived(),
            ScopeTarget::Archived => entry.is_archived(),
        }
    }
}

fn check_anchor(anchor: &ScheduleEntry, target: ScopeTarget) -> Result<(), AppError> {
    match target {
        ScopeTarget::Active if anchor.is_archived() => {
            Err(AppError::Validation("Cannot modify an archived schedule entry".into()))
        }
        ScopeTarget::Archived if !anchor.is_archived() => {
            Err(AppError::Validation("Schedule entry is not archived".into()))
        }
        _ => Ok(()),
    }
}

/// Picks the members of `siblings` an operation anchored at `anchor` applies to, ordered by start.
pub fn select_scope(
    anchor: &ScheduleEntry,
    siblings: Vec<ScheduleEntry>,
    scope: EditScope,
    target: ScopeTarget,
) -> Vec<ScheduleEntry> {
    let mut selected: Vec<ScheduleEntry> = match scope {
        EditScope::This => vec![anchor.clone()],
        EditScope::Future => siblings.into_iter().filter(|e| e.start_at >= anchor.start_at).collect(),
        EditScope::All => siblings,
    };
    selected.retain(|e| target.matches(e));
    selected.sort_by(|a, b| a.start_at.cmp(&b.start_at).then_with(|| a.id.cmp(&b.id)));
    selected
}

pub async fn resolve_scope(
    repo: &dyn ScheduleEntryRepository,
    anchor: &ScheduleEntry,
    scope: EditScope,
    target: ScopeTarget,
) -> Result<Vec<ScheduleEntry>, AppError> {
    check_anchor(anchor, target)?;

    if scope == EditScope::This {
        return Ok(vec![anchor.clone()]);
    }

    let series_id = anchor.series_id.as_deref().ok_or_else(|| {
        AppError::Validation(format!("Scope {} requires an entry that belongs to a series", scope.as_str()))
    })?;

    let siblings = repo.list_by_series(series_id).await?;
    Ok(select_scope(anchor, siblings, scope, target))
}
