pub mod recommend;
pub mod reminders;
pub mod tracker;
