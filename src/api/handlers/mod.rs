pub mod health;
pub mod schedule_entry;
