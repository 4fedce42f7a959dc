//! Spaced Repetition
//!
//! Tracked vocabulary items and the fixed-ladder review state machine.

mod item;
mod scheduler;

pub use item::{HistoryAction, HistoryEntry, Outcome, TrackedItem, normalize_key};
pub use scheduler::{MigrationReport, RescheduleReport, ReviewScheduler, SchedulerStats};
