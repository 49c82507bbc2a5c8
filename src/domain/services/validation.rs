use std::collections::HashSet;

use crate::domain::{
    models::directory::{Location, ServiceOffered, Tutor},
    ports::DirectoryRepository,
};
use crate::error::AppError;

/// Removes repeated ids, keeping the first occurrence of each.
pub fn dedup_ids(ids: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

pub fn dedup_days(days: Vec<u32>) -> Vec<u32> {
    let mut seen = HashSet::new();
    days.into_iter().filter(|d| seen.insert(*d)).collect()
}

pub fn require_positive(field: &str, value: i32) -> Result<(), AppError> {
    if value < 1 {
        return Err(AppError::Validation(format!("{} must be at least 1", field)));
    }
    Ok(())
}

pub fn attendees_within_capacity(attendees: usize, capacity: i32) -> Result<(), AppError> {
    if attendees as i64 > capacity as i64 {
        return Err(AppError::Validation(format!(
            "{} attendees exceed the capacity of {}",
            attendees, capacity
        )));
    }
    Ok(())
}

pub async fn location_in_organization(
    directory: &dyn DirectoryRepository,
    location_id: &str,
    organization_id: &str,
) -> Result<Location, AppError> {
    let location = directory.find_location(location_id).await?
        .ok_or_else(|| AppError::Validation("Location not found".into()))?;

    if location.organization_id != organization_id {
        return Err(AppError::Validation("Location does not belong to this organization".into()));
    }
    Ok(location)
}

pub async fn service_at_location(
    directory: &dyn DirectoryRepository,
    service_offered_id: &str,
    location_id: &str,
) -> Result<ServiceOffered, AppError> {
    let service = directory.find_service(service_offered_id).await?
        .ok_or_else(|| AppError::Validation("Service offering not found".into()))?;

    if service.location_id != location_id {
        return Err(AppError::Validation("Service offering does not belong to this location".into()));
    }
    Ok(service)
}

pub async fn tutor_at_location(
    directory: &dyn DirectoryRepository,
    tutor_id: &str,
    organization_id: &str,
    location_id: &str,
) -> Result<Tutor, AppError> {
    let tutor = directory.find_tutor(tutor_id).await?
        .ok_or_else(|| AppError::Validation("Tutor not found".into()))?;

    if tutor.organization_id != organization_id {
        return Err(AppError::Validation("Tutor does not belong to this organization".into()));
    }
    if !directory.tutor_serves_location(tutor_id, location_id).await? {
        return Err(AppError::Validation("Tutor is not assigned to this location".into()));
    }
    Ok(tutor)
}

/// Every id must name a room of `location_id`.
pub async fn rooms_at_location(
    directory: &dyn DirectoryRepository,
    room_ids: &[String],
    location_id: &str,
) -> Result<(), AppError> {
    if room_ids.is_empty() {
        return Ok(());
    }
    let rooms = directory.find_rooms(room_ids).await?;

    for id in room_ids {
        match rooms.iter().find(|r| &r.id == id) {
            None => return Err(AppError::Validation(format!("Room {} not found", id))),
            Some(room) if room.location_id != location_id => {
                return Err(AppError::Validation(format!("Room {} does not belong to this location", id)));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Every id must name an active student of `location_id`.
pub async fn students_at_location(
    directory: &dyn DirectoryRepository,
    student_ids: &[String],
    location_id: &str,
) -> Result<(), AppError> {
    if student_ids.is_empty() {
        return Ok(());
    }
    let students = directory.find_students(student_ids).await?;

    for id in student_ids {
        let student = students.iter().find(|s| &s.id == id)
            .ok_or_else(|| AppError::Validation(format!("Student {} not found", id)))?;

        if student.location_id != location_id {
            return Err(AppError::Validation(format!("Student {} does not belong to this location", id)));
        }
        if !student.is_active() {
            return Err(AppError::Validation(format!("Student {} is archived", id)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_keeps_first_occurrence_order() {
        let ids = vec!["b".to_string(), "a".to_string(), "b".to_string(), "c".to_string(), "a".to_string()];
        assert_eq!(dedup_ids(ids), vec!["b", "a", "c"]);
        assert_eq!(dedup_days(vec![3, 1, 3, 1]), vec![3, 1]);
    }

    #[test]
    fn test_require_positive() {
        assert!(require_positive("capacity", 1).is_ok());
        assert!(matches!(require_positive("capacity", 0), Err(AppError::Validation(_))));
        assert!(require_positive("duration_minutes", -5).is_err());
    }

    #[test]
    fn test_attendees_within_capacity() {
        assert!(attendees_within_capacity(0, 1).is_ok());
        assert!(attendees_within_capacity(2, 2).is_ok());
        assert!(attendees_within_capacity(3, 2).is_err());
    }
}
