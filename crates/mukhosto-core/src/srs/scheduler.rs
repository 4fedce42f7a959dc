//! Review Scheduler
//!
//! Fixed-ladder spaced repetition over the tracked items record:
//! - `good` climbs one stage, holding at the last stage on the rolling interval
//! - `again` drops back to stage 0
//!
//! Every public operation is total. Storage failures are logged and show up
//! only as `None`, `false` or an empty report.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::item::{HistoryAction, HistoryEntry, Outcome, TrackedItem, decode_items, normalize_key};
use crate::clock::{Clock, SystemClock, truncate_to_millis};
use crate::records::{ITEMS_KEY, KNOWN_WORDS_KEY, SESSION_KEY};
use crate::schedule::{DEFAULT_STAGE_MINUTES, ScheduleConfig};
use crate::storage::KeyValueStore;

/// Result of a legacy import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    /// Items created; already-tracked words are not counted
    pub added: usize,
}

/// Result of re-applying the first stage interval
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleReport {
    /// Stage-0 items whose due time was recomputed
    pub changed: usize,
    /// Interval applied, 0 when nothing was written
    pub first_minutes: u32,
}

/// Snapshot counts over the tracked items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStats {
    pub tracked: usize,
    pub due: usize,
    /// Items per stage index
    pub by_stage: BTreeMap<usize, usize>,
    pub next_due: Option<DateTime<Utc>>,
}

/// Owner of the tracked items and their review state machine.
///
/// Each mutating call is one read-modify-write of the whole items record,
/// performed under `write_lock`.
///
/// The lock belongs to this instance. Threads writing the same store must
/// share one scheduler (behind an `Arc`); two schedulers built over the same
/// store do not exclude each other and can lose updates.
pub struct ReviewScheduler {
    store: Arc<dyn KeyValueStore>,
    config: ScheduleConfig,
    clock: Arc<dyn Clock>,
    write_lock: Mutex<()>,
}

impl ReviewScheduler {
    /// Scheduler on the wall clock
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            config: ScheduleConfig::new(store.clone()),
            store,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    /// Schedule config over the same store
    pub fn config(&self) -> &ScheduleConfig {
        &self.config
    }

    fn now(&self) -> DateTime<Utc> {
        truncate_to_millis(self.clock.now())
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn stage_intervals(&self) -> Vec<u32> {
        let stages = self.config.stage_intervals();
        if stages.is_empty() {
            DEFAULT_STAGE_MINUTES.to_vec()
        } else {
            stages
        }
    }

    /// Read the items record; the flag is set when any entry was damaged.
    fn load_checked(
        &self,
        now: DateTime<Utc>,
        first_minutes: u32,
    ) -> (BTreeMap<String, TrackedItem>, bool) {
        match self.store.get(ITEMS_KEY) {
            Ok(Some(bytes)) => {
                let decoded = decode_items(&bytes, now, first_minutes);
                let damaged = decoded.repaired > 0 || decoded.dropped > 0;
                if damaged {
                    tracing::warn!(
                        repaired = decoded.repaired,
                        dropped = decoded.dropped,
                        "Items record contained damaged entries"
                    );
                }
                (decoded.items, damaged)
            }
            Ok(None) => (BTreeMap::new(), false),
            Err(e) => {
                tracing::warn!(key = ITEMS_KEY, error = %e, "Items record unreadable, treating as empty");
                (BTreeMap::new(), false)
            }
        }
    }

    fn load(&self, now: DateTime<Utc>, first_minutes: u32) -> BTreeMap<String, TrackedItem> {
        self.load_checked(now, first_minutes).0
    }

    fn load_current(&self) -> BTreeMap<String, TrackedItem> {
        let first = self.stage_intervals()[0];
        self.load(self.now(), first)
    }

    fn persist(&self, items: &BTreeMap<String, TrackedItem>) -> bool {
        let bytes = match serde_json::to_vec(items) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode items record");
                return false;
            }
        };
        match self.store.set(ITEMS_KEY, &bytes) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = ITEMS_KEY, error = %e, "Failed to persist items record");
                false
            }
        }
    }

    // ==================== Review flow ====================

    /// Start tracking `text`.
    ///
    /// A new item lands on stage 0, due after the first interval. An existing
    /// item keeps its progress; only damaged fields are filled in. Returns the
    /// stored item, or `None` for blank text or a failed write.
    pub fn init_for_word(&self, text: &str) -> Option<TrackedItem> {
        let key = normalize_key(text);
        if key.is_empty() {
            return None;
        }

        let _guard = self.lock();
        let now = self.now();
        let first = self.stage_intervals()[0];
        let (mut items, repaired) = self.load_checked(now, first);

        if let Some(existing) = items.get(&key) {
            let existing = existing.clone();
            if repaired && !self.persist(&items) {
                return None;
            }
            return Some(existing);
        }

        let item = TrackedItem::new(text, now, first, HistoryAction::Init);
        items.insert(key.clone(), item.clone());
        if !self.persist(&items) {
            return None;
        }
        tracing::debug!(key = %key, due_at = %item.due_at, "Item initialized");
        Some(item)
    }

    /// Apply a rating to `text`, tracking it first if needed.
    ///
    /// `good` below the last stage advances exactly one stage; at the last
    /// stage the item stays there and recurs after the rolling interval.
    /// `again` always returns to stage 0. Returns the updated item, or `None`
    /// for blank text or a failed write (stored state is then unchanged).
    pub fn mark_reviewed(&self, text: &str, outcome: Outcome) -> Option<TrackedItem> {
        let key = normalize_key(text);
        if key.is_empty() {
            return None;
        }

        let _guard = self.lock();
        let now = self.now();
        let stages = self.stage_intervals();
        let last_index = stages.len() - 1;
        let rolling = self.config.rolling_interval();
        let mut items = self.load(now, stages[0]);

        let item = items
            .entry(key.clone())
            .or_insert_with(|| TrackedItem::new(text, now, stages[0], HistoryAction::Init));
        item.display = text.to_string();

        let previous_stage = item.stage;
        match outcome {
            Outcome::Again => {
                item.stage = 0;
                item.due_at = now + minutes(stages[0]);
            }
            Outcome::Good => {
                if item.stage < last_index {
                    item.stage += 1;
                    item.due_at = now + minutes(stages[item.stage]);
                } else {
                    item.stage = last_index;
                    item.due_at = now + minutes(rolling);
                }
            }
        }
        item.history.push(HistoryEntry::new(now, outcome.into()));
        let updated = item.clone();

        if !self.persist(&items) {
            return None;
        }
        tracing::debug!(
            key = %key,
            outcome = %outcome,
            from_stage = previous_stage,
            to_stage = updated.stage,
            due_at = %updated.due_at,
            "Review recorded"
        );
        Some(updated)
    }

    // ==================== Queries ====================

    /// Items due at `at` (inclusive), earliest first
    pub fn due_items_at(&self, at: DateTime<Utc>) -> Vec<TrackedItem> {
        let mut due: Vec<TrackedItem> = self
            .load_current()
            .into_values()
            .filter(|item| item.is_due_at(at))
            .collect();
        due.sort_by(|a, b| a.due_at.cmp(&b.due_at).then_with(|| a.key.cmp(&b.key)));
        due
    }

    /// Display text of every item due at `at` (inclusive).
    ///
    /// Ordered by due time then key; callers should not rely on the order.
    pub fn due_keys_at(&self, at: DateTime<Utc>) -> Vec<String> {
        self.due_items_at(at)
            .into_iter()
            .map(|item| item.display)
            .collect()
    }

    /// [`Self::due_keys_at`] for now
    pub fn due_keys(&self) -> Vec<String> {
        self.due_keys_at(self.now())
    }

    pub fn count_due_at(&self, at: DateTime<Utc>) -> usize {
        self.due_keys_at(at).len()
    }

    pub fn count_due(&self) -> usize {
        self.count_due_at(self.now())
    }

    /// Snapshot of one item; never creates it
    pub fn peek(&self, text: &str) -> Option<TrackedItem> {
        let key = normalize_key(text);
        if key.is_empty() {
            return None;
        }
        self.load_current().remove(&key)
    }

    /// Every tracked item, ordered by key
    pub fn items(&self) -> Vec<TrackedItem> {
        self.load_current().into_values().collect()
    }

    pub fn tracked_count(&self) -> usize {
        self.load_current().len()
    }

    pub fn stats(&self) -> SchedulerStats {
        let now = self.now();
        let items = self.load_current();
        let mut stats = SchedulerStats {
            tracked: items.len(),
            ..Default::default()
        };
        for item in items.values() {
            *stats.by_stage.entry(item.stage).or_default() += 1;
            if item.is_due_at(now) {
                stats.due += 1;
            }
            stats.next_due = match stats.next_due {
                Some(next) if next <= item.due_at => Some(next),
                _ => Some(item.due_at),
            };
        }
        stats
    }

    // ==================== Administration ====================

    /// Discard every tracked item
    pub fn clear_all(&self) -> bool {
        let _guard = self.lock();
        let ok = self.persist(&BTreeMap::new());
        if ok {
            tracing::info!("All tracked items cleared");
        }
        ok
    }

    /// Track previously known words that carry no scheduling data.
    ///
    /// Untracked words start at stage 0 with a `migrated` event; tracked
    /// words are left alone.
    pub fn migrate_from_legacy_set<I, S>(&self, words: I) -> MigrationReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let _guard = self.lock();
        let now = self.now();
        let first = self.stage_intervals()[0];
        let mut items = self.load(now, first);

        let mut added = 0;
        for word in words {
            let word = word.as_ref();
            let key = normalize_key(word);
            if key.is_empty() || items.contains_key(&key) {
                continue;
            }
            items.insert(key, TrackedItem::new(word, now, first, HistoryAction::Migrated));
            added += 1;
        }

        if added == 0 {
            return MigrationReport::default();
        }
        if !self.persist(&items) {
            return MigrationReport::default();
        }
        tracing::info!(added, "Migrated legacy known words");
        MigrationReport { added }
    }

    /// [`Self::migrate_from_legacy_set`] over the stored known-words list
    pub fn migrate_from_known_words(&self) -> MigrationReport {
        let words = match self.store.get(KNOWN_WORDS_KEY) {
            Ok(Some(bytes)) => match serde_json::from_slice::<Vec<Value>>(&bytes) {
                Ok(values) => values
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s),
                        Value::Number(n) => Some(n.to_string()),
                        _ => None,
                    })
                    .collect::<Vec<_>>(),
                Err(e) => {
                    tracing::warn!(key = KNOWN_WORDS_KEY, error = %e, "Malformed known-words list");
                    return MigrationReport::default();
                }
            },
            Ok(None) => return MigrationReport::default(),
            Err(e) => {
                tracing::warn!(key = KNOWN_WORDS_KEY, error = %e, "Known-words list unreadable");
                return MigrationReport::default();
            }
        };
        self.migrate_from_legacy_set(words)
    }

    /// Re-apply the current first interval to every stage-0 item.
    ///
    /// Items past stage 0 are untouched. On failure nothing is written and
    /// the report is all zeros.
    pub fn reschedule_stage0(&self) -> RescheduleReport {
        let _guard = self.lock();
        let now = self.now();
        let first = self.stage_intervals()[0];
        let mut items = self.load(now, first);

        let mut changed = 0;
        for item in items.values_mut().filter(|item| item.stage == 0) {
            item.due_at = now + minutes(first);
            item.history.push(HistoryEntry::new(now, HistoryAction::RescheduleStage0));
            changed += 1;
        }

        if changed > 0 && !self.persist(&items) {
            return RescheduleReport::default();
        }
        tracing::info!(changed, first_minutes = first, "Rescheduled stage-0 items");
        RescheduleReport {
            changed,
            first_minutes: first,
        }
    }

    /// Forget all learning progress: tracked items, the known-words list and
    /// the last session summary.
    pub fn reset_progress(&self) -> bool {
        let _guard = self.lock();
        let mut ok = true;
        for key in [ITEMS_KEY, KNOWN_WORDS_KEY, SESSION_KEY] {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!(key, error = %e, "Failed to remove record during reset");
                ok = false;
            }
        }
        if ok {
            tracing::info!("Learning progress reset");
        }
        ok
    }

    pub(crate) fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub(crate) fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

fn minutes(m: u32) -> Duration {
    Duration::minutes(i64::from(m))
}

// ============================================================================
// TESTS
// ============================================================================
