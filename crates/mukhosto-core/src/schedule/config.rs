//! Schedule configuration persisted in the key-value store

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use super::duration::{self, MAX_INTERVAL_MINUTES, MIN_PER_DAY};
use crate::records::{
    CONFIG_KEY, ConfigRecord, LEGACY_CONFIG_KEY, RawConfigRecord, RawLegacyConfigRecord,
    coerce_int, exact_int,
};
use crate::storage::KeyValueStore;

/// Default stages in days
pub const DEFAULT_STAGE_DAYS: [u32; 5] = [3, 7, 14, 21, 30];

/// Default stages in minutes: 3d, 7d, 14d, 21d, 30d
pub const DEFAULT_STAGE_MINUTES: [u32; 5] = [
    3 * MIN_PER_DAY,
    7 * MIN_PER_DAY,
    14 * MIN_PER_DAY,
    21 * MIN_PER_DAY,
    30 * MIN_PER_DAY,
];

/// Default rolling interval: 30 days
pub const DEFAULT_ROLLING_MINUTES: u32 = 30 * MIN_PER_DAY;

fn is_valid_interval(minutes: i64) -> bool {
    minutes > 0 && minutes < i64::from(MAX_INTERVAL_MINUTES)
}

/// Keep valid intervals, sort ascending, drop duplicates.
///
/// Never returns an empty list: with nothing valid left the default stages
/// are substituted.
pub fn normalize_stage_minutes<I>(values: I) -> Vec<u32>
where
    I: IntoIterator<Item = i64>,
{
    let mut out: Vec<u32> = values
        .into_iter()
        .filter(|&m| is_valid_interval(m))
        .map(|m| m as u32)
        .collect();
    out.sort_unstable();
    out.dedup();
    if out.is_empty() {
        DEFAULT_STAGE_MINUTES.to_vec()
    } else {
        out
    }
}

fn days_to_minutes(days: i64) -> i64 {
    days.saturating_mul(i64::from(MIN_PER_DAY))
}

fn minutes_to_rounded_days(minutes: u32) -> u32 {
    (minutes + MIN_PER_DAY / 2) / MIN_PER_DAY
}

impl Default for ConfigRecord {
    fn default() -> Self {
        Self {
            stage_minutes: DEFAULT_STAGE_MINUTES.to_vec(),
            rolling_minutes: DEFAULT_ROLLING_MINUTES,
        }
    }
}

impl From<RawConfigRecord> for ConfigRecord {
    fn from(raw: RawConfigRecord) -> Self {
        let stage_minutes = normalize_stage_minutes(
            raw.stage_minutes
                .unwrap_or_default()
                .iter()
                .filter_map(coerce_int),
        );
        let rolling_minutes = raw
            .rolling_minutes
            .as_ref()
            .and_then(exact_int)
            .filter(|&m| is_valid_interval(m))
            .map(|m| m as u32)
            .unwrap_or(DEFAULT_ROLLING_MINUTES);
        Self {
            stage_minutes,
            rolling_minutes,
        }
    }
}

impl From<RawLegacyConfigRecord> for ConfigRecord {
    fn from(raw: RawLegacyConfigRecord) -> Self {
        let stage_minutes = normalize_stage_minutes(
            raw.stage_days
                .unwrap_or_default()
                .iter()
                .filter_map(coerce_int)
                .map(days_to_minutes),
        );
        let rolling_minutes = raw
            .rolling_days
            .as_ref()
            .and_then(exact_int)
            .map(days_to_minutes)
            .filter(|&m| is_valid_interval(m))
            .map(|m| m as u32)
            .unwrap_or(DEFAULT_ROLLING_MINUTES);
        Self {
            stage_minutes,
            rolling_minutes,
        }
    }
}

/// Stage and rolling intervals, read through to the store on every call.
///
/// Nothing is cached: another handle writing the same store is seen
/// immediately. Setters hold a lock across their read-modify-write cycle.
/// That lock is per instance: it orders writers that share this handle, not
/// writers holding separate handles on one store.
pub struct ScheduleConfig {
    store: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl ScheduleConfig {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Current record, defaults substituted for anything absent or malformed
    pub fn record(&self) -> ConfigRecord {
        match self.store.get(CONFIG_KEY) {
            Ok(Some(bytes)) => match serde_json::from_slice::<RawConfigRecord>(&bytes) {
                Ok(raw) => raw.into(),
                Err(e) => {
                    tracing::warn!(key = CONFIG_KEY, error = %e, "Malformed schedule config, using defaults");
                    ConfigRecord::default()
                }
            },
            Ok(None) => self.legacy_record().unwrap_or_default(),
            Err(e) => {
                tracing::warn!(key = CONFIG_KEY, error = %e, "Schedule config unreadable, using defaults");
                ConfigRecord::default()
            }
        }
    }

    fn legacy_record(&self) -> Option<ConfigRecord> {
        let bytes = self.store.get(LEGACY_CONFIG_KEY).ok().flatten()?;
        match serde_json::from_slice::<RawLegacyConfigRecord>(&bytes) {
            Ok(raw) => {
                tracing::debug!(key = LEGACY_CONFIG_KEY, "Reading day-granularity schedule config");
                Some(raw.into())
            }
            Err(e) => {
                tracing::warn!(key = LEGACY_CONFIG_KEY, error = %e, "Malformed legacy schedule config");
                None
            }
        }
    }

    fn write_record(&self, record: &ConfigRecord) -> bool {
        let bytes = match serde_json::to_vec(record) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode schedule config");
                return false;
            }
        };
        match self.store.set(CONFIG_KEY, &bytes) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = CONFIG_KEY, error = %e, "Failed to persist schedule config");
                false
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ==================== Minutes ====================

    /// Stage intervals in minutes, ascending, never empty
    pub fn stage_intervals(&self) -> Vec<u32> {
        self.record().stage_minutes
    }

    /// First stage interval, used for new and failed items
    pub fn first_interval(&self) -> u32 {
        self.stage_intervals()
            .first()
            .copied()
            .unwrap_or(DEFAULT_STAGE_MINUTES[0])
    }

    /// Replace the stage list.
    ///
    /// Invalid entries are dropped and the rest sorted and deduplicated; an
    /// empty result stores the defaults. Returns `false` only when the write
    /// fails, in which case the previous list stays in effect.
    pub fn set_stage_intervals<I>(&self, values: I) -> bool
    where
        I: IntoIterator<Item = i64>,
    {
        let stage_minutes = normalize_stage_minutes(values);
        let _guard = self.lock();
        let mut record = self.record();
        record.stage_minutes = stage_minutes;
        let ok = self.write_record(&record);
        if ok {
            tracing::info!(stages = ?record.stage_minutes, "Stage intervals updated");
        }
        ok
    }

    /// Rolling interval in minutes
    pub fn rolling_interval(&self) -> u32 {
        self.record().rolling_minutes
    }

    /// Replace the rolling interval; rejects values outside `1..10_000_000`.
    pub fn set_rolling_interval(&self, minutes: i64) -> bool {
        if !is_valid_interval(minutes) {
            tracing::debug!(minutes, "Rejected rolling interval");
            return false;
        }
        let _guard = self.lock();
        let mut record = self.record();
        record.rolling_minutes = minutes as u32;
        let ok = self.write_record(&record);
        if ok {
            tracing::info!(minutes, "Rolling interval updated");
        }
        ok
    }

    /// Store the built-in schedule
    pub fn reset_to_defaults(&self) -> bool {
        let _guard = self.lock();
        self.write_record(&ConfigRecord::default())
    }

    /// Human-readable duration, see [`duration::format_duration`]
    pub fn format_duration(minutes: u32) -> String {
        duration::format_duration(minutes)
    }

    /// Preview string for the current schedule
    pub fn describe(&self) -> String {
        let record = self.record();
        duration::describe_schedule(&record.stage_minutes, record.rolling_minutes)
    }

    // ==================== Legacy days ====================

    /// Stage intervals rounded to whole days
    pub fn stage_days(&self) -> Vec<u32> {
        self.stage_intervals()
            .into_iter()
            .map(minutes_to_rounded_days)
            .collect()
    }

    /// Replace the stage list from whole days
    pub fn set_stage_days<I>(&self, days: I) -> bool
    where
        I: IntoIterator<Item = i64>,
    {
        self.set_stage_intervals(days.into_iter().map(days_to_minutes))
    }

    /// Rolling interval rounded to whole days
    pub fn rolling_days(&self) -> u32 {
        minutes_to_rounded_days(self.rolling_interval())
    }

    /// Replace the rolling interval from whole days
    pub fn set_rolling_days(&self, days: i64) -> bool {
        self.set_rolling_interval(days_to_minutes(days))
    }

    /// JSON value of the current record, for diagnostics
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self.record()).unwrap_or(Value::Null)
    }
}

// ============================================================================
// TESTS
// ============================================================================
