//! Content rows
//!
//! Vocabulary rows as they come out of a content sheet: a front word, its
//! meaning, an optional sub-definition and any number of extra columns.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::srs::normalize_key;

/// Column holding the tracked word
pub const FRONT_COLUMN: &str = "FrontData";
pub const BACK_COLUMN: &str = "BackData";
pub const SUB_COLUMN: &str = "SubBack";
/// Prefix shared by every extra column (`ExtraData1`, `ExtraData2`, ...)
pub const EXTRA_COLUMN_PREFIX: &str = "ExtraData";

/// One vocabulary row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRow {
    pub front_text: String,
    #[serde(default)]
    pub back_text: String,
    #[serde(default)]
    pub sub_text: String,
    #[serde(default)]
    pub extra_texts: Vec<String>,
}

impl ContentRow {
    pub fn new(front_text: impl Into<String>, back_text: impl Into<String>) -> Self {
        Self {
            front_text: front_text.into(),
            back_text: back_text.into(),
            ..Default::default()
        }
    }

    pub fn with_sub(mut self, sub_text: impl Into<String>) -> Self {
        self.sub_text = sub_text.into();
        self
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra_texts.push(extra.into());
        self
    }

    /// Text the scheduler tracks this row under: the front, or the back
    /// when the front is blank
    pub fn tracking_text(&self) -> &str {
        if self.front_text.trim().is_empty() {
            &self.back_text
        } else {
            &self.front_text
        }
    }

    /// Normalized lookup key, empty when the row has no front text
    pub fn lookup_key(&self) -> String {
        normalize_key(&self.front_text)
    }

    /// Build a row from a sheet record keyed by column name.
    ///
    /// Missing columns read as empty. Extra columns are ordered by their
    /// numeric suffix (`ExtraData2` before `ExtraData10`); columns without
    /// one come last. Numbers are rendered as text; other non-string cells
    /// are ignored.
    pub fn from_columns(columns: &Map<String, Value>) -> Self {
        let cell = |name: &str| columns.get(name).and_then(cell_text).unwrap_or_default();

        let mut extra_columns: Vec<(&String, &Value)> = columns
            .iter()
            .filter(|(name, _)| name.starts_with(EXTRA_COLUMN_PREFIX))
            .collect();
        extra_columns.sort_by(|(a, _), (b, _)| {
            extra_column_index(a)
                .cmp(&extra_column_index(b))
                .then_with(|| a.cmp(b))
        });
        let extra_texts = extra_columns
            .into_iter()
            .filter_map(|(_, value)| cell_text(value))
            .collect();

        Self {
            front_text: cell(FRONT_COLUMN),
            back_text: cell(BACK_COLUMN),
            sub_text: cell(SUB_COLUMN),
            extra_texts,
        }
    }
}

fn extra_column_index(name: &str) -> u64 {
    match &name[EXTRA_COLUMN_PREFIX.len()..] {
        "" => 0,
        suffix => suffix.parse().unwrap_or(u64::MAX),
    }
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse a sheet exported as a JSON array of column records.
///
/// Non-object records are skipped.
pub fn rows_from_json(bytes: &[u8]) -> serde_json::Result<Vec<ContentRow>> {
    let records: Vec<Value> = serde_json::from_slice(bytes)?;
    Ok(records
        .iter()
        .filter_map(Value::as_object)
        .map(ContentRow::from_columns)
        .collect())
}
