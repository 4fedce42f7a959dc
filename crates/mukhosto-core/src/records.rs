//! Persisted record schemas
//!
//! Every record lives under a fixed key as one JSON document. Reads are
//! field-level fallible: a field with the wrong shape decodes as `None` and
//! the owning component substitutes its default, so damaged data never
//! surfaces as an error.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Tracked items, normalized key -> item
pub const ITEMS_KEY: &str = "muk_srs_v1";
/// Schedule config in minutes
pub const CONFIG_KEY: &str = "muk_srs_config_v2";
/// Day-granularity schedule config written by older releases
pub const LEGACY_CONFIG_KEY: &str = "muk_srs_config_v1";
/// Flat list of words marked known before scheduling existed
pub const KNOWN_WORDS_KEY: &str = "knownWords";
/// Summary of the last finished review session
pub const SESSION_KEY: &str = "srs_session_complete";
/// Practice default: show the meaning first (`1`/`0`)
pub const REVERSE_PRACTICE_KEY: &str = "reversePractice";
/// Practice default: show extra columns on the back (`1`/`0`)
pub const SHOW_EXTRA_DEFAULT_KEY: &str = "showExtraDefault";

/// Decode a field, yielding `None` instead of an error on type mismatch.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Integer coercion for loosely typed list entries.
///
/// Accepts JSON integers, integral floats and strings with a leading integer
/// (`"30"`, `" 45min"`).
pub(crate) fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => leading_int(s),
        _ => None,
    }
}

/// Exact integer only: JSON integers and floats with no fractional part.
pub(crate) fn exact_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0)
                .map(|f| f as i64)
        }),
        _ => None,
    }
}

fn leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

// ============================================================================
// CONFIG RECORDS
// ============================================================================

/// Config record as written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRecord {
    pub stage_minutes: Vec<u32>,
    pub rolling_minutes: u32,
}

/// Config record as read back
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawConfigRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub stage_minutes: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub rolling_minutes: Option<Value>,
}

/// Day-granularity config from older releases
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawLegacyConfigRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub stage_days: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient")]
    pub rolling_days: Option<Value>,
}

// ============================================================================
// ITEM RECORDS
// ============================================================================

/// One entry of the items record as read back. Written entries use
/// `TrackedItem`'s own serde shape.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawItemRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub display: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub added_at: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub stage: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub due_at: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub history: Option<Vec<Value>>,
}

/// History event as read back
#[derive(Debug, Deserialize)]
pub(crate) struct RawHistoryRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub ts: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub action: Option<String>,
}
