use chrono::{DateTime, Datelike, Duration, NaiveDate, SubsecRound, Utc};
use serde::Serialize;

use crate::error::AppError;

/// Upper bound on the number of occurrences a single series may generate.
pub const MAX_SERIES_OCCURRENCES: usize = 500;

/// The stored time fields of one entry.
///
/// `end_at` is the real end of the session; `blocked_end_at` additionally
/// covers the organization's buffer when `include_buffer` is set. Tutors and
/// rooms are blocked until `blocked_end_at`, students only until `end_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntryWindow {
    pub start_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub include_buffer: bool,
    pub end_at: DateTime<Utc>,
    pub blocked_end_at: DateTime<Utc>,
}

/// Instants are stored at whole-second precision.
pub fn normalize_instant(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.trunc_subsecs(0)
}

pub fn compute_window(
    start_at: DateTime<Utc>,
    duration_minutes: i32,
    include_buffer: bool,
    org_buffer_minutes: i32,
) -> EntryWindow {
    let start_at = normalize_instant(start_at);
    let end_at = start_at + Duration::minutes(duration_minutes as i64);
    let blocked_end_at = if include_buffer {
        end_at + Duration::minutes(org_buffer_minutes.max(0) as i64)
    } else {
        end_at
    };

    EntryWindow {
        start_at,
        duration_minutes,
        include_buffer,
        end_at,
        blocked_end_at,
    }
}

fn past_end_date(instant: DateTime<Utc>, end_date: Option<NaiveDate>) -> bool {
    end_date.is_some_and(|end| instant.date_naive() > end)
}

fn count_reached(produced: usize, count: Option<i32>) -> bool {
    count.is_some_and(|c| produced >= c.max(0) as usize)
}

fn check_bounds(end_date: Option<NaiveDate>, count: Option<i32>) -> Result<(), AppError> {
    if end_date.is_none() && count.is_none() {
        return Err(AppError::Validation("Either occurrence_count or series_end_date is required".into()));
    }
    Ok(())
}

fn too_many_occurrences() -> AppError {
    AppError::Validation(format!(
        "Recurrence would generate more than {} occurrences",
        MAX_SERIES_OCCURRENCES
    ))
}

/// The next occurrence would fall past the last representable instant.
/// An end date is necessarily behind us; a count must already be met.
fn end_of_calendar(
    occurrences: Vec<DateTime<Utc>>,
    end_date: Option<NaiveDate>,
    count: Option<i32>,
) -> Result<Vec<DateTime<Utc>>, AppError> {
    if end_date.is_some() || count_reached(occurrences.len(), count) {
        return Ok(occurrences);
    }
    Err(AppError::Validation(
        "recurrence_interval is too large to produce the requested occurrences".into(),
    ))
}

pub fn build_daily_occurrences(
    start_at: DateTime<Utc>,
    interval_days: i32,
    end_date: Option<NaiveDate>,
    count: Option<i32>,
) -> Result<Vec<DateTime<Utc>>, AppError> {
    if interval_days < 1 {
        return Err(AppError::Validation("recurrence_interval must be at least 1".into()));
    }
    check_bounds(end_date, count)?;

    let step = Duration::days(interval_days as i64);
    let mut occurrences = Vec::new();
    let mut current = normalize_instant(start_at);

    while !past_end_date(current, end_date) && !count_reached(occurrences.len(), count) {
        if occurrences.len() == MAX_SERIES_OCCURRENCES {
            return Err(too_many_occurrences());
        }
        occurrences.push(current);
        current = match current.checked_add_signed(step) {
            Some(next) => next,
            None => return end_of_calendar(occurrences, end_date, count),
        };
    }

    Ok(occurrences)
}

pub fn build_weekly_occurrences(
    start_at: DateTime<Utc>,
    interval_weeks: i32,
    days_of_week: &[u32],
    end_date: Option<NaiveDate>,
    count: Option<i32>,
) -> Result<Vec<DateTime<Utc>>, AppError> {
    if interval_weeks < 1 {
        return Err(AppError::Validation("recurrence_interval must be at least 1".into()));
    }
    if days_of_week.is_empty() {
        return Err(AppError::Validation("recurrence_days_of_week is required for WEEKLY series".into()));
    }
    if days_of_week.iter().any(|d| *d > 6) {
        return Err(AppError::Validation("recurrence_days_of_week values must be between 0 and 6".into()));
    }
    check_bounds(end_date, count)?;

    // Weeks are 7-day blocks counted from the start; only every `interval_weeks`-th block is walked.
    let step = Duration::weeks(interval_weeks as i64);
    let mut occurrences = Vec::new();
    let mut block_start = Some(normalize_instant(start_at));

    while let Some(block) = block_start {
        for offset in 0..7 {
            let Some(day) = block.checked_add_signed(Duration::days(offset)) else {
                return end_of_calendar(occurrences, end_date, count);
            };
            if past_end_date(day, end_date) || count_reached(occurrences.len(), count) {
                return Ok(occurrences);
            }
            if days_of_week.contains(&day.weekday().num_days_from_sunday()) {
                if occurrences.len() == MAX_SERIES_OCCURRENCES {
                    return Err(too_many_occurrences());
                }
                occurrences.push(day);
            }
        }
        block_start = block.checked_add_signed(step);
    }

    end_of_calendar(occurrences, end_date, count)
}

/// Rejects a set of windows in which any window starts before the previous one's blocked end.
pub fn assert_no_self_overlap(windows: &[EntryWindow]) -> Result<(), AppError> {
    let mut sorted: Vec<&EntryWindow> = windows.iter().collect();
    sorted.sort_by_key(|w| w.start_at);

    for pair in sorted.windows(2) {
        let (previous, next) = (pair[0], pair[1]);
        if next.start_at < previous.blocked_end_at {
            return Err(AppError::Validation(format!(
                "Recurring occurrences overlap each other: occurrence at {} starts before the previous one ends at {}",
                next.start_at.to_rfc3339(),
                previous.blocked_end_at.to_rfc3339()
            )));
        }
    }
    Ok(())
}
