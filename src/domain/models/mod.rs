pub mod conflict;
pub mod directory;
pub mod operations;
pub mod schedule_entry;
