use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{
    models::{
        conflict::ConflictProbe,
        operations::{
            CreateEntryCommand, CreateOutcome, ExceptionCreated, ExceptionEditCommand, MutationOutcome,
            RescheduleCommand, RestoreExceptionCommand, ScopeCommand, SeriesCreated, SeriesUpdated,
            UpdateAttendeesCommand, UpdateCapacityCommand, UpdateRoomsCommand, UpdateServiceCommand,
        },
        directory::Organization,
        schedule_entry::{
            EditScope, EntryListFilter, NewScheduleEntryParams, RecurrenceType, ScheduleEntry,
            ScheduleEntryDetails, SeriesFields,
        },
    },
    ports::{DirectoryRepository, ScheduleEntryRepository, ScheduleWrite, WriteBatch},
    services::{
        conflict::{probes_for, ConflictDetector},
        recurrence::{
            assert_no_self_overlap, build_daily_occurrences, build_weekly_occurrences, compute_window,
            normalize_instant, EntryWindow,
        },
        scope::{resolve_scope, ScopeTarget},
        validation::{
            attendees_within_capacity, dedup_days, dedup_ids, location_in_organization, require_positive,
            rooms_at_location, service_at_location, students_at_location, tutor_at_location,
        },
    },
};
use crate::error::AppError;

/// Fields shared by every entry a create request produces.
struct EntryTemplate {
    organization_id: String,
    location_id: String,
    service_offered_id: String,
    tutor_id: String,
    product_id: Option<String>,
    subject_id: Option<String>,
    topic_id: Option<String>,
    resources_text: Option<String>,
    capacity: i32,
    hourly_rate_cents_snapshot: Option<i64>,
}

impl EntryTemplate {
    fn instantiate(&self, window: EntryWindow, series: SeriesFields) -> ScheduleEntry {
        ScheduleEntry::new(NewScheduleEntryParams {
            organization_id: self.organization_id.clone(),
            location_id: self.location_id.clone(),
            service_offered_id: self.service_offered_id.clone(),
            tutor_id: self.tutor_id.clone(),
            product_id: self.product_id.clone(),
            subject_id: self.subject_id.clone(),
            topic_id: self.topic_id.clone(),
            resources_text: self.resources_text.clone(),
            window,
            capacity: self.capacity,
            hourly_rate_cents_snapshot: self.hourly_rate_cents_snapshot,
            series,
        })
    }
}

fn push_entry_with_joins(batch: &mut WriteBatch, entry: ScheduleEntry, room_ids: &[String], student_ids: &[String]) {
    let entry_id = entry.id.clone();
    batch.push(ScheduleWrite::InsertEntry(entry));
    if !room_ids.is_empty() {
        batch.push(ScheduleWrite::ReplaceRooms { entry_id: entry_id.clone(), room_ids: room_ids.to_vec() });
    }
    if !student_ids.is_empty() {
        batch.push(ScheduleWrite::ReplaceAttendees { entry_id, student_ids: student_ids.to_vec() });
    }
}

fn ids_of(entries: &[ScheduleEntry]) -> Vec<String> {
    entries.iter().map(|e| e.id.clone()).collect()
}

/// Series context is attached to conflicts only when the operation spans a series.
fn series_context(scope: EditScope, entry: &ScheduleEntry) -> Option<&str> {
    match scope {
        EditScope::This => None,
        EditScope::Future | EditScope::All => entry.series_id.as_deref(),
    }
}

pub struct ScheduleService {
    entries: Arc<dyn ScheduleEntryRepository>,
    directory: Arc<dyn DirectoryRepository>,
    detector: ConflictDetector,
}

impl ScheduleService {
    pub fn new(entries: Arc<dyn ScheduleEntryRepository>, directory: Arc<dyn DirectoryRepository>) -> Self {
        let detector = ConflictDetector::new(entries.clone());
        Self { entries, directory, detector }
    }

    pub async fn get_by_id(&self, id: &str) -> Result<ScheduleEntryDetails, AppError> {
        self.entries.find_details(id).await?
            .ok_or_else(|| AppError::NotFound("Schedule entry not found".into()))
    }

    pub async fn list_by_location(
        &self,
        location_id: &str,
        filter: &EntryListFilter,
    ) -> Result<Vec<ScheduleEntryDetails>, AppError> {
        self.directory.find_location(location_id).await?
            .ok_or_else(|| AppError::NotFound("Location not found".into()))?;

        self.entries.list_by_location(location_id, filter).await
    }

    pub async fn create(&self, cmd: CreateEntryCommand) -> Result<CreateOutcome, AppError> {
        let directory = self.directory.as_ref();

        let org = self.organization(&cmd.organization_id).await?;

        require_positive("duration_minutes", cmd.duration_minutes)?;
        require_positive("capacity", cmd.capacity)?;

        location_in_organization(directory, &cmd.location_id, &org.id).await?;
        let service = service_at_location(directory, &cmd.service_offered_id, &cmd.location_id).await?;
        tutor_at_location(directory, &cmd.tutor_id, &org.id, &cmd.location_id).await?;

        let room_ids = dedup_ids(cmd.room_ids);
        let student_ids = dedup_ids(cmd.attendee_student_ids);
        rooms_at_location(directory, &room_ids, &cmd.location_id).await?;
        students_at_location(directory, &student_ids, &cmd.location_id).await?;
        attendees_within_capacity(student_ids.len(), cmd.capacity)?;

        let template = EntryTemplate {
            organization_id: org.id.clone(),
            location_id: cmd.location_id,
            service_offered_id: service.id,
            tutor_id: cmd.tutor_id,
            product_id: cmd.product_id,
            subject_id: cmd.subject_id,
            topic_id: cmd.topic_id,
            resources_text: cmd.resources_text,
            capacity: cmd.capacity,
            hourly_rate_cents_snapshot: service.hourly_rate_cents,
        };

        if !cmd.recurrence_type.is_recurring() {
            let window = compute_window(cmd.start_at, cmd.duration_minutes, cmd.include_buffer, org.default_buffer_minutes);
            let entry = template.instantiate(window, SeriesFields::default());
            let exclude = vec![entry.id.clone()];

            let probes = probes_for(&template.tutor_id, &room_ids, &student_ids, window, &exclude, None);
            self.detector.check_all(&probes).await?;

            let entry_id = entry.id.clone();
            let mut batch = WriteBatch::new();
            push_entry_with_joins(&mut batch, entry, &room_ids, &student_ids);
            batch.guard(probes);
            self.entries.apply(&batch).await?;

            info!("Schedule entry created: {} (tutor {})", entry_id, template.tutor_id);
            return Ok(CreateOutcome::Entry(Box::new(self.get_by_id(&entry_id).await?)));
        }

        let interval = cmd.recurrence_interval.unwrap_or(1);
        require_positive("recurrence_interval", interval)?;

        match (cmd.occurrence_count, cmd.series_end_date) {
            (Some(_), Some(_)) | (None, None) => {
                return Err(AppError::Validation(
                    "Exactly one of occurrence_count or series_end_date is required".into(),
                ));
            }
            (Some(count), None) => require_positive("occurrence_count", count)?,
            (None, Some(end_date)) => {
                if end_date < cmd.start_at.date_naive() {
                    return Err(AppError::Validation("series_end_date must not be before start_at".into()));
                }
            }
        }

        let days = match cmd.recurrence_type {
            RecurrenceType::Weekly => Some(dedup_days(cmd.recurrence_days_of_week.unwrap_or_default())),
            _ => None,
        };

        let starts = match &days {
            Some(days) => build_weekly_occurrences(cmd.start_at, interval, days, cmd.series_end_date, cmd.occurrence_count)?,
            None => build_daily_occurrences(cmd.start_at, interval, cmd.series_end_date, cmd.occurrence_count)?,
        };
        if starts.is_empty() {
            return Err(AppError::Validation("Recurrence produced no occurrences".into()));
        }

        let windows: Vec<EntryWindow> = starts
            .into_iter()
            .map(|start| compute_window(start, cmd.duration_minutes, cmd.include_buffer, org.default_buffer_minutes))
            .collect();
        assert_no_self_overlap(&windows)?;

        let series_id = Uuid::new_v4().to_string();
        let series = SeriesFields {
            series_id: Some(series_id.clone()),
            recurrence_type: cmd.recurrence_type,
            recurrence_interval: Some(interval),
            recurrence_days_of_week: days,
            series_end_date: cmd.series_end_date,
            occurrence_count: cmd.occurrence_count,
        };

        let occurrences: Vec<ScheduleEntry> = windows
            .iter()
            .map(|window| template.instantiate(*window, series.clone()))
            .collect();
        let entry_ids = ids_of(&occurrences);

        let mut batch = WriteBatch::new();
        for occurrence in &occurrences {
            let probes = probes_for(
                &template.tutor_id,
                &room_ids,
                &student_ids,
                occurrence.window(),
                &entry_ids,
                Some(&series_id),
            );
            self.detector.check_all(&probes).await?;
            batch.guard(probes);
        }
        for occurrence in occurrences {
            push_entry_with_joins(&mut batch, occurrence, &room_ids, &student_ids);
        }
        self.entries.apply(&batch).await?;

        info!(
            "Schedule series created: {} with {} occurrences (tutor {})",
            series_id,
            entry_ids.len(),
            template.tutor_id
        );
        Ok(CreateOutcome::Series(SeriesCreated {
            series_id,
            created_count: entry_ids.len(),
            entry_ids,
        }))
    }

    pub async fn reschedule(&self, id: &str, cmd: RescheduleCommand) -> Result<MutationOutcome, AppError> {
        let anchor = self.load(id).await?;
        let org = self.organization(&anchor.organization_id).await?;

        let duration = cmd.duration_minutes.unwrap_or(anchor.duration_minutes);
        let include_buffer = cmd.include_buffer.unwrap_or(anchor.include_buffer);
        require_positive("duration_minutes", duration)?;

        let targets = resolve_scope(self.entries.as_ref(), &anchor, cmd.scope, ScopeTarget::Active).await?;
        let delta = normalize_instant(cmd.start_at) - anchor.start_at;

        let windows: Vec<EntryWindow> = targets
            .iter()
            .map(|t| compute_window(t.start_at + delta, duration, include_buffer, org.default_buffer_minutes))
            .collect();
        assert_no_self_overlap(&windows)?;

        let exclude = ids_of(&targets);
        let mut batch = WriteBatch::new();
        for (target, window) in targets.iter().zip(windows) {
            let probes = self.probes_for_entry(target, window, &exclude, series_context(cmd.scope, target)).await?;
            self.detector.check_all(&probes).await?;
            batch.guard(probes);
            batch.push(ScheduleWrite::UpdateWindow { entry_id: target.id.clone(), window });
        }
        self.entries.apply(&batch).await?;

        info!("Rescheduled {} entries from {} ({})", exclude.len(), anchor.id, cmd.scope.as_str());
        self.outcome(&anchor, cmd.scope, exclude).await
    }

    pub async fn archive(&self, id: &str, cmd: ScopeCommand) -> Result<MutationOutcome, AppError> {
        let anchor = self.load(id).await?;
        let targets = resolve_scope(self.entries.as_ref(), &anchor, cmd.scope, ScopeTarget::Active).await?;

        let now = Utc::now();
        let mut batch = WriteBatch::new();
        for target in &targets {
            batch.push(ScheduleWrite::SetArchived { entry_id: target.id.clone(), archived_at: Some(now) });
        }
        self.entries.apply(&batch).await?;

        info!("Archived {} entries from {} ({})", targets.len(), anchor.id, cmd.scope.as_str());
        self.outcome(&anchor, cmd.scope, ids_of(&targets)).await
    }

    pub async fn unarchive(&self, id: &str, cmd: ScopeCommand) -> Result<MutationOutcome, AppError> {
        let anchor = self.load(id).await?;
        let targets = resolve_scope(self.entries.as_ref(), &anchor, cmd.scope, ScopeTarget::Archived).await?;
        let exclude = ids_of(&targets);

        let mut batch = WriteBatch::new();
        for target in &targets {
            let probes = self
                .probes_for_entry(target, target.window(), &exclude, series_context(cmd.scope, target))
                .await?;
            self.detector.check_all(&probes).await?;
            batch.guard(probes);
            batch.push(ScheduleWrite::SetArchived { entry_id: target.id.clone(), archived_at: None });
        }
        self.entries.apply(&batch).await?;

        info!("Unarchived {} entries from {} ({})", exclude.len(), anchor.id, cmd.scope.as_str());
        self.outcome(&anchor, cmd.scope, exclude).await
    }

    /// Archives a single occurrence of a series.
    pub async fn skip_occurrence(&self, id: &str) -> Result<ScheduleEntryDetails, AppError> {
        let anchor = self.load(id).await?;
        if anchor.series_id.is_none() {
            return Err(AppError::Validation("Only occurrences of a series can be skipped".into()));
        }
        resolve_scope(self.entries.as_ref(), &anchor, EditScope::This, ScopeTarget::Active).await?;

        let mut batch = WriteBatch::new();
        batch.push(ScheduleWrite::SetArchived { entry_id: anchor.id.clone(), archived_at: Some(Utc::now()) });
        self.entries.apply(&batch).await?;

        info!("Skipped occurrence {} of series {:?}", anchor.id, anchor.series_id);
        self.get_by_id(&anchor.id).await
    }

    pub async fn update_rooms(&self, id: &str, cmd: UpdateRoomsCommand) -> Result<MutationOutcome, AppError> {
        let anchor = self.load(id).await?;
        let room_ids = dedup_ids(cmd.room_ids);
        rooms_at_location(self.directory.as_ref(), &room_ids, &anchor.location_id).await?;

        let targets = resolve_scope(self.entries.as_ref(), &anchor, cmd.scope, ScopeTarget::Active).await?;
        let exclude = ids_of(&targets);

        let mut batch = WriteBatch::new();
        for target in &targets {
            let probe = ConflictProbe::rooms(&room_ids, target.window(), &exclude)
                .in_series(series_context(cmd.scope, target));
            self.detector.check(&probe).await?;
            batch.guard([probe]);
            batch.push(ScheduleWrite::ReplaceRooms { entry_id: target.id.clone(), room_ids: room_ids.clone() });
        }
        self.entries.apply(&batch).await?;

        info!("Replaced rooms on {} entries from {} ({})", exclude.len(), anchor.id, cmd.scope.as_str());
        self.outcome(&anchor, cmd.scope, exclude).await
    }

    pub async fn update_attendees(&self, id: &str, cmd: UpdateAttendeesCommand) -> Result<MutationOutcome, AppError> {
        let anchor = self.load(id).await?;
        let student_ids = dedup_ids(cmd.attendee_student_ids);
        students_at_location(self.directory.as_ref(), &student_ids, &anchor.location_id).await?;

        let targets = resolve_scope(self.entries.as_ref(), &anchor, cmd.scope, ScopeTarget::Active).await?;
        for target in &targets {
            attendees_within_capacity(student_ids.len(), target.capacity)?;
        }
        let exclude = ids_of(&targets);

        let mut batch = WriteBatch::new();
        for target in &targets {
            let probe = ConflictProbe::students(&student_ids, target.window(), &exclude)
                .in_series(series_context(cmd.scope, target));
            self.detector.check(&probe).await?;
            batch.guard([probe]);
            batch.push(ScheduleWrite::ReplaceAttendees {
                entry_id: target.id.clone(),
                student_ids: student_ids.clone(),
            });
        }
        self.entries.apply(&batch).await?;

        info!("Replaced attendees on {} entries from {} ({})", exclude.len(), anchor.id, cmd.scope.as_str());
        self.outcome(&anchor, cmd.scope, exclude).await
    }

    pub async fn update_service_offered(&self, id: &str, cmd: UpdateServiceCommand) -> Result<MutationOutcome, AppError> {
        let anchor = self.load(id).await?;
        let service = service_at_location(self.directory.as_ref(), &cmd.service_offered_id, &anchor.location_id).await?;
        let targets = resolve_scope(self.entries.as_ref(), &anchor, cmd.scope, ScopeTarget::Active).await?;

        let mut batch = WriteBatch::new();
        for target in &targets {
            batch.push(ScheduleWrite::UpdateService {
                entry_id: target.id.clone(),
                service_offered_id: service.id.clone(),
                hourly_rate_cents_snapshot: service.hourly_rate_cents,
            });
        }
        self.entries.apply(&batch).await?;

        info!("Service {} applied to {} entries from {} ({})", service.id, targets.len(), anchor.id, cmd.scope.as_str());
        self.outcome(&anchor, cmd.scope, ids_of(&targets)).await
    }

    pub async fn update_capacity(&self, id: &str, cmd: UpdateCapacityCommand) -> Result<MutationOutcome, AppError> {
        let anchor = self.load(id).await?;
        require_positive("capacity", cmd.capacity)?;

        let targets = resolve_scope(self.entries.as_ref(), &anchor, cmd.scope, ScopeTarget::Active).await?;
        let entry_ids = ids_of(&targets);
        let counts = self.entries.attendee_counts(&entry_ids).await?;

        let mut batch = WriteBatch::new();
        for target in &targets {
            let booked = counts.get(&target.id).copied().unwrap_or(0);
            if booked > cmd.capacity as i64 {
                return Err(AppError::Validation(format!(
                    "Capacity {} is below the {} attendees already booked on entry {}",
                    cmd.capacity, booked, target.id
                )));
            }
            batch.push(ScheduleWrite::UpdateCapacity { entry_id: target.id.clone(), capacity: cmd.capacity });
        }
        self.entries.apply(&batch).await?;

        info!("Capacity set to {} on {} entries from {} ({})", cmd.capacity, entry_ids.len(), anchor.id, cmd.scope.as_str());
        self.outcome(&anchor, cmd.scope, entry_ids).await
    }

    /// Detaches one occurrence from its series: the occurrence is archived and
    /// replaced by a standalone entry carrying the overrides.
    pub async fn exception_edit(&self, id: &str, cmd: ExceptionEditCommand) -> Result<ExceptionCreated, AppError> {
        let anchor = self.load(id).await?;
        let series_id = anchor.series_id.clone()
            .ok_or_else(|| AppError::Validation("Only occurrences of a series can be edited as exceptions".into()))?;
        resolve_scope(self.entries.as_ref(), &anchor, EditScope::This, ScopeTarget::Active).await?;

        let org = self.organization(&anchor.organization_id).await?;
        let directory = self.directory.as_ref();

        let tutor_id = cmd.tutor_id.unwrap_or_else(|| anchor.tutor_id.clone());
        if tutor_id != anchor.tutor_id {
            tutor_at_location(directory, &tutor_id, &anchor.organization_id, &anchor.location_id).await?;
        }

        let (service_offered_id, rate) = match cmd.service_offered_id {
            Some(service_id) if service_id != anchor.service_offered_id => {
                let service = service_at_location(directory, &service_id, &anchor.location_id).await?;
                (service.id, service.hourly_rate_cents)
            }
            _ => (anchor.service_offered_id.clone(), anchor.hourly_rate_cents_snapshot),
        };

        let duration = cmd.duration_minutes.unwrap_or(anchor.duration_minutes);
        let capacity = cmd.capacity.unwrap_or(anchor.capacity);
        require_positive("duration_minutes", duration)?;
        require_positive("capacity", capacity)?;

        let room_ids = match cmd.room_ids {
            Some(ids) => {
                let ids = dedup_ids(ids);
                rooms_at_location(directory, &ids, &anchor.location_id).await?;
                ids
            }
            None => self.entries.room_ids(&anchor.id).await?,
        };
        let student_ids = match cmd.attendee_student_ids {
            Some(ids) => {
                let ids = dedup_ids(ids);
                students_at_location(directory, &ids, &anchor.location_id).await?;
                ids
            }
            None => self.entries.attendee_ids(&anchor.id).await?,
        };
        attendees_within_capacity(student_ids.len(), capacity)?;

        let window = compute_window(
            cmd.start_at.unwrap_or(anchor.start_at),
            duration,
            cmd.include_buffer.unwrap_or(anchor.include_buffer),
            org.default_buffer_minutes,
        );

        let template = EntryTemplate {
            organization_id: anchor.organization_id.clone(),
            location_id: anchor.location_id.clone(),
            service_offered_id,
            tutor_id,
            product_id: cmd.product_id.unwrap_or_else(|| anchor.product_id.clone()),
            subject_id: cmd.subject_id.unwrap_or_else(|| anchor.subject_id.clone()),
            topic_id: cmd.topic_id.unwrap_or_else(|| anchor.topic_id.clone()),
            resources_text: cmd.resources_text.unwrap_or_else(|| anchor.resources_text.clone()),
            capacity,
            hourly_rate_cents_snapshot: rate,
        };
        let exception = template.instantiate(window, SeriesFields::default());
        let exception_id = exception.id.clone();
        let exclude = vec![anchor.id.clone(), exception_id.clone()];

        let probes = probes_for(&template.tutor_id, &room_ids, &student_ids, window, &exclude, Some(&series_id));
        self.detector.check_all(&probes).await?;

        let mut batch = WriteBatch::new();
        batch.push(ScheduleWrite::SetArchived { entry_id: anchor.id.clone(), archived_at: Some(Utc::now()) });
        push_entry_with_joins(&mut batch, exception, &room_ids, &student_ids);
        batch.guard(probes);
        self.entries.apply(&batch).await?;

        info!("Exception {} replaces occurrence {} of series {}", exception_id, anchor.id, series_id);
        Ok(ExceptionCreated {
            series_id,
            archived_entry_id: anchor.id,
            exception: self.get_by_id(&exception_id).await?,
            exception_entry_id: exception_id,
        })
    }

    /// Archives an exception entry and brings back the series occurrence it replaced.
    pub async fn restore_exception(
        &self,
        exception_id: &str,
        cmd: RestoreExceptionCommand,
    ) -> Result<ScheduleEntryDetails, AppError> {
        let exception = self.load(exception_id).await?;
        if exception.recurrence() != RecurrenceType::AdHoc || exception.series_id.is_some() {
            return Err(AppError::Validation("Entry is not a standalone exception entry".into()));
        }
        if exception.is_archived() {
            return Err(AppError::Validation("Exception entry is already archived".into()));
        }

        let occurrence = self.load(&cmd.archived_series_entry_id).await?;
        if occurrence.series_id.is_none() {
            return Err(AppError::Validation("Target entry does not belong to a series".into()));
        }
        if !occurrence.is_archived() {
            return Err(AppError::Validation("Target series entry is not archived".into()));
        }
        if occurrence.organization_id != exception.organization_id
            || occurrence.location_id != exception.location_id
            || occurrence.tutor_id != exception.tutor_id
        {
            return Err(AppError::Validation(
                "Exception and series entry must share organization, location and tutor".into(),
            ));
        }

        let exclude = vec![occurrence.id.clone(), exception.id.clone()];
        let probes = self
            .probes_for_entry(&occurrence, occurrence.window(), &exclude, occurrence.series_id.as_deref())
            .await?;
        self.detector.check_all(&probes).await?;

        let mut batch = WriteBatch::new();
        batch.push(ScheduleWrite::SetArchived { entry_id: exception.id.clone(), archived_at: Some(Utc::now()) });
        batch.push(ScheduleWrite::SetArchived { entry_id: occurrence.id.clone(), archived_at: None });
        batch.guard(probes);
        self.entries.apply(&batch).await?;

        info!("Exception {} discarded, occurrence {} restored", exception.id, occurrence.id);
        self.get_by_id(&occurrence.id).await
    }

    async fn load(&self, id: &str) -> Result<ScheduleEntry, AppError> {
        self.entries.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Schedule entry not found".into()))
    }

    /// A missing organization is a broken reference, like any other directory id.
    async fn organization(&self, id: &str) -> Result<Organization, AppError> {
        self.directory.find_organization(id).await?
            .ok_or_else(|| AppError::Validation("Organization not found".into()))
    }

    /// Probes for an existing entry's tutor and current joins at `window`.
    async fn probes_for_entry(
        &self,
        entry: &ScheduleEntry,
        window: EntryWindow,
        exclude: &[String],
        series_id: Option<&str>,
    ) -> Result<Vec<ConflictProbe>, AppError> {
        let room_ids = self.entries.room_ids(&entry.id).await?;
        let student_ids = self.entries.attendee_ids(&entry.id).await?;
        Ok(probes_for(&entry.tutor_id, &room_ids, &student_ids, window, exclude, series_id))
    }

    async fn outcome(
        &self,
        anchor: &ScheduleEntry,
        scope: EditScope,
        entry_ids: Vec<String>,
    ) -> Result<MutationOutcome, AppError> {
        match (scope, &anchor.series_id) {
            (EditScope::Future | EditScope::All, Some(series_id)) => Ok(MutationOutcome::Series(SeriesUpdated {
                series_id: series_id.clone(),
                scope,
                updated_count: entry_ids.len(),
                entry_ids,
            })),
            _ => Ok(MutationOutcome::Entry(Box::new(self.get_by_id(&anchor.id).await?))),
        }
    }
}
