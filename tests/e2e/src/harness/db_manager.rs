//! Test Store Manager
//!
//! Provides isolated scheduler instances for testing:
//! - Temporary SQLite databases that are automatically cleaned up
//! - A manual clock shared by every scheduler opened on the same directory
//! - Reopening the same database to check what survived on disk

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use mukhosto_core::{Clock, KeyValueStore, ManualClock, ReviewScheduler, SqliteStore};
use tempfile::TempDir;

/// Fixed start time for every test clock
pub const T0_MILLIS: i64 = 1_700_000_000_000;

/// Manager for test databases
///
/// Creates an isolated data directory for each test. The directory is
/// deleted when the manager is dropped.
///
/// # Example
///
/// ```rust,ignore
/// let db = TestStoreManager::new_temp();
/// db.scheduler.init_for_word("apple");
/// db.advance_days(3);
/// assert_eq!(db.scheduler.count_due(), 1);
/// ```
pub struct TestStoreManager {
    pub scheduler: ReviewScheduler,
    pub store: Arc<SqliteStore>,
    pub clock: Arc<ManualClock>,
    _temp_dir: Option<TempDir>,
    data_dir: PathBuf,
}

impl TestStoreManager {
    /// Create a scheduler over a fresh temporary database
    pub fn new_temp() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let data_dir = temp_dir.path().to_path_buf();
        let clock = Arc::new(ManualClock::at_millis(T0_MILLIS));
        let mut manager = Self::open(&data_dir, clock);
        manager._temp_dir = Some(temp_dir);
        manager
    }

    /// Open a second scheduler on the same database and clock
    pub fn reopen(&self) -> Self {
        Self::open(&self.data_dir, self.clock.clone())
    }

    fn open(data_dir: &Path, clock: Arc<ManualClock>) -> Self {
        let store = Arc::new(
            SqliteStore::new(Some(data_dir.to_path_buf())).expect("Failed to create test store"),
        );
        let scheduler = ReviewScheduler::with_clock(store.clone(), clock.clone());
        Self {
            scheduler,
            store,
            clock,
            _temp_dir: None,
            data_dir: data_dir.to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path to the database file
    pub fn db_path(&self) -> &Path {
        self.store.path()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn advance_minutes(&self, minutes: i64) {
        self.clock.advance_minutes(minutes);
    }

    pub fn advance_days(&self, days: i64) {
        self.clock.advance(Duration::days(days));
    }

    /// Raw JSON of one stored record
    pub fn raw_record(&self, key: &str) -> Option<serde_json::Value> {
        let bytes = self.store.get(key).expect("Failed to read record")?;
        Some(serde_json::from_slice(&bytes).expect("Record is not JSON"))
    }

    /// Overwrite one stored record with raw bytes
    pub fn write_raw(&self, key: &str, value: &[u8]) {
        self.store.set(key, value).expect("Failed to write record");
    }

    pub fn is_empty(&self) -> bool {
        self.scheduler.tracked_count() == 0
    }
}
