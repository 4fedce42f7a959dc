//! # Mukhosto Core
//!
//! Spaced-repetition scheduling for the Mukhosto vocabulary trainer.
//!
//! - **Fixed-ladder scheduling**: a configurable list of stage intervals, then a
//!   rolling interval once the last stage is reached
//! - **Binary ratings**: `good` climbs one stage, `again` starts over
//! - **Injected storage**: everything lives in a [`KeyValueStore`] as JSON
//!   records, so the same core runs over SQLite or in memory
//! - **Injected time**: a [`Clock`] decides "now", so due times are exact in tests
//! - **Review sessions**: due words joined with content rows into flip cards
//!
//! Storage failures never escape the scheduling components. Reads of missing
//! or damaged records fall back to defaults; failed writes are logged and
//! reported as `false`, `None` or an empty report.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use mukhosto_core::{MemoryStore, Outcome, ReviewScheduler};
//!
//! let scheduler = ReviewScheduler::new(Arc::new(MemoryStore::new()));
//!
//! // Track a word, then rate it
//! scheduler.init_for_word("Apple");
//! let item = scheduler.mark_reviewed("apple", Outcome::Good).unwrap();
//! assert_eq!(item.stage, 1);
//!
//! // Stage intervals are in minutes
//! assert!(scheduler.config().set_stage_intervals([60, 1440, 10080]));
//! assert_eq!(scheduler.config().describe(), "1h → 1d → 7d → every 30d");
//! ```
//!
//! ## Feature Flags
//!
//! - `bundled-sqlite` (default): build SQLite from source for [`SqliteStore`]

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

// ============================================================================
// MODULES
// ============================================================================

pub mod clock;
pub mod records;
pub mod review;
pub mod schedule;
pub mod srs;
pub mod storage;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Time
pub use clock::{Clock, ManualClock, SystemClock};

// Schedule configuration
pub use schedule::{
    DEFAULT_ROLLING_MINUTES, DEFAULT_STAGE_DAYS, DEFAULT_STAGE_MINUTES, IntervalUnit,
    ParseIntervalError, ScheduleConfig, best_unit, describe_schedule, format_duration,
    parse_interval_token, parse_schedule,
};

// Scheduler
pub use srs::{
    HistoryAction, HistoryEntry, MigrationReport, Outcome, RescheduleReport, ReviewScheduler,
    SchedulerStats, TrackedItem, normalize_key,
};

// Review sessions
pub use review::{
    ContentRow, PracticeDefaults, ReviewCard, ReviewQueue, ReviewSession, SessionSummary,
};

// Storage layer
pub use storage::{KeyValueStore, MemoryStore, Result, SqliteStore, StorageError};

// ============================================================================
// VERSION INFO
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// PRELUDE
// ============================================================================

/// Convenient imports for common usage
pub mod prelude {
    pub use crate::{
        Clock, ContentRow, KeyValueStore, MemoryStore, Outcome, ReviewQueue, ReviewScheduler,
        ReviewSession, ScheduleConfig, SqliteStore, StorageError, TrackedItem,
    };
}
