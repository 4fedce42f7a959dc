//! Tracked Item - one vocabulary entry under review
//!
//! Each item carries:
//! - A normalized identity key and the display text last seen
//! - Its stage in the interval schedule and the next due time
//! - An append-only history of review events

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::records::{RawHistoryRecord, RawItemRecord, exact_int};

/// Identity key for a piece of text: trimmed and case-folded.
pub fn normalize_key(text: &str) -> String {
    text.trim().to_lowercase()
}

// ============================================================================
// OUTCOME
// ============================================================================

/// Learner's rating of a due item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Recalled; advance one stage
    Good,
    /// Forgotten; back to the first stage
    Again,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Good => "good",
            Outcome::Again => "again",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "good" => Ok(Outcome::Good),
            "again" => Ok(Outcome::Again),
            _ => Err(format!("Unknown outcome: {}", s)),
        }
    }
}

// ============================================================================
// HISTORY
// ============================================================================

/// Kind of a history event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HistoryAction {
    Init,
    Good,
    Again,
    Migrated,
    RescheduleStage0,
    /// Action written by another release; kept verbatim
    Other(String),
}

impl HistoryAction {
    pub fn as_str(&self) -> &str {
        match self {
            HistoryAction::Init => "init",
            HistoryAction::Good => "good",
            HistoryAction::Again => "again",
            HistoryAction::Migrated => "migrated",
            HistoryAction::RescheduleStage0 => "reschedule_stage0",
            HistoryAction::Other(s) => s,
        }
    }
}

impl From<String> for HistoryAction {
    fn from(s: String) -> Self {
        match s.as_str() {
            "init" => HistoryAction::Init,
            "good" => HistoryAction::Good,
            "again" => HistoryAction::Again,
            "migrated" => HistoryAction::Migrated,
            "reschedule_stage0" => HistoryAction::RescheduleStage0,
            _ => HistoryAction::Other(s),
        }
    }
}

impl From<HistoryAction> for String {
    fn from(action: HistoryAction) -> Self {
        action.as_str().to_string()
    }
}

impl From<Outcome> for HistoryAction {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Good => HistoryAction::Good,
            Outcome::Again => HistoryAction::Again,
        }
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One history event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub ts: DateTime<Utc>,
    pub action: HistoryAction,
}

impl HistoryEntry {
    pub fn new(ts: DateTime<Utc>, action: HistoryAction) -> Self {
        Self { ts, action }
    }
}

// ============================================================================
// TRACKED ITEM
// ============================================================================

/// Scheduling state of one vocabulary item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedItem {
    /// Normalized identity
    pub key: String,
    /// Text as last passed in by the caller
    pub display: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub added_at: DateTime<Utc>,
    /// Index into the stage intervals
    pub stage: usize,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub due_at: DateTime<Utc>,
    pub history: Vec<HistoryEntry>,
}

impl TrackedItem {
    /// Fresh item at stage 0, due `first_minutes` from `now`
    pub fn new(text: &str, now: DateTime<Utc>, first_minutes: u32, action: HistoryAction) -> Self {
        Self {
            key: normalize_key(text),
            display: text.to_string(),
            added_at: now,
            stage: 0,
            due_at: now + Duration::minutes(i64::from(first_minutes)),
            history: vec![HistoryEntry::new(now, action)],
        }
    }

    /// Due at `at` (inclusive)
    pub fn is_due_at(&self, at: DateTime<Utc>) -> bool {
        self.due_at <= at
    }

    pub fn last_action(&self) -> Option<&HistoryAction> {
        self.history.last().map(|h| &h.action)
    }

    /// Number of reviews recorded as `outcome`
    pub fn count_outcomes(&self, outcome: Outcome) -> usize {
        let action = HistoryAction::from(outcome);
        self.history.iter().filter(|h| h.action == action).count()
    }

    /// Rebuild an item from a stored entry, filling damaged fields.
    ///
    /// Returns the item and whether anything had to be repaired. Progress
    /// that did decode (stage, due time, history) is kept as is.
    pub(crate) fn from_raw(
        key: &str,
        raw: RawItemRecord,
        now: DateTime<Utc>,
        first_minutes: u32,
    ) -> (Self, bool) {
        let mut repaired = false;

        let display = match raw.display {
            Some(display) if !display.trim().is_empty() => display,
            _ => {
                repaired = true;
                raw.key
                    .filter(|k| !k.trim().is_empty())
                    .unwrap_or_else(|| key.to_string())
            }
        };

        let added_at = raw.added_at.as_ref().and_then(millis_to_datetime).unwrap_or_else(|| {
            repaired = true;
            now
        });

        let stage = raw
            .stage
            .as_ref()
            .and_then(exact_int)
            .and_then(|s| usize::try_from(s).ok())
            .unwrap_or_else(|| {
                repaired = true;
                0
            });

        let due_at = raw.due_at.as_ref().and_then(millis_to_datetime).unwrap_or_else(|| {
            repaired = true;
            now + Duration::minutes(i64::from(first_minutes))
        });

        let history = match raw.history {
            Some(entries) => {
                let total = entries.len();
                let kept: Vec<HistoryEntry> = entries.into_iter().filter_map(decode_history).collect();
                if kept.len() != total {
                    repaired = true;
                }
                kept
            }
            None => {
                repaired = true;
                Vec::new()
            }
        };

        let item = Self {
            key: key.to_string(),
            display,
            added_at,
            stage,
            due_at,
            history,
        };
        (item, repaired)
    }
}

fn millis_to_datetime(value: &Value) -> Option<DateTime<Utc>> {
    exact_int(value).and_then(DateTime::from_timestamp_millis)
}

fn decode_history(value: Value) -> Option<HistoryEntry> {
    let raw: RawHistoryRecord = serde_json::from_value(value).ok()?;
    let ts = raw.ts.as_ref().and_then(millis_to_datetime)?;
    let action = HistoryAction::from(raw.action?);
    Some(HistoryEntry { ts, action })
}

/// Decoded items record
#[derive(Debug, Default)]
pub(crate) struct DecodedItems {
    pub items: BTreeMap<String, TrackedItem>,
    /// Entries that needed a field filled in
    pub repaired: usize,
    /// Entries that were not objects and were skipped
    pub dropped: usize,
}

/// Decode the items record.
///
/// Anything that is not a JSON object decodes as an empty collection.
pub(crate) fn decode_items(bytes: &[u8], now: DateTime<Utc>, first_minutes: u32) -> DecodedItems {
    let map = match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            tracing::warn!("Items record is not an object, treating as empty");
            return DecodedItems::default();
        }
        Err(e) => {
            tracing::warn!(error = %e, "Items record is not valid JSON, treating as empty");
            return DecodedItems::default();
        }
    };

    let mut decoded = DecodedItems::default();
    for (key, value) in map {
        if !value.is_object() {
            tracing::warn!(key = %key, "Skipping non-object item entry");
            decoded.dropped += 1;
            continue;
        }
        let raw: RawItemRecord = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Skipping undecodable item entry");
                decoded.dropped += 1;
                continue;
            }
        };
        let (item, repaired) = TrackedItem::from_raw(&key, raw, now, first_minutes);
        if repaired {
            tracing::debug!(key = %key, "Repaired item entry");
            decoded.repaired += 1;
        }
        decoded.items.insert(key, item);
    }
    decoded
}
