pub mod conflict;
pub mod recurrence;
pub mod schedule_service;
pub mod scope;
pub mod validation;
