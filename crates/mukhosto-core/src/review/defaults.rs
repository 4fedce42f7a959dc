//! Practice defaults
//!
//! Per-learner presentation switches kept next to the scheduling records.
//! Each switch is its own record holding `1` or `0`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::records::{REVERSE_PRACTICE_KEY, SHOW_EXTRA_DEFAULT_KEY};
use crate::storage::KeyValueStore;

/// How review sessions start unless told otherwise
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeDefaults {
    /// Show the meaning first
    pub reverse: bool,
    /// Show extra columns when a card is flipped
    pub show_extras: bool,
}

impl PracticeDefaults {
    /// Read both switches; absent or unreadable records read as off.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self {
            reverse: read_flag(store, REVERSE_PRACTICE_KEY),
            show_extras: read_flag(store, SHOW_EXTRA_DEFAULT_KEY),
        }
    }

    /// Store both switches. Returns `false` if either write fails.
    pub fn save(&self, store: &dyn KeyValueStore) -> bool {
        let reverse = write_flag(store, REVERSE_PRACTICE_KEY, self.reverse);
        let show_extras = write_flag(store, SHOW_EXTRA_DEFAULT_KEY, self.show_extras);
        reverse && show_extras
    }

    /// Remove both switches, returning to the built-in defaults
    pub fn clear(store: &dyn KeyValueStore) -> bool {
        let mut ok = true;
        for key in [REVERSE_PRACTICE_KEY, SHOW_EXTRA_DEFAULT_KEY] {
            if let Err(e) = store.remove(key) {
                tracing::warn!(key, error = %e, "Failed to clear practice default");
                ok = false;
            }
        }
        ok
    }
}

fn read_flag(store: &dyn KeyValueStore, key: &str) -> bool {
    match store.get(key) {
        Ok(Some(bytes)) => match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Number(n)) => n.as_i64() == Some(1),
            Ok(Value::String(s)) => s == "1",
            Ok(Value::Bool(b)) => b,
            _ => false,
        },
        Ok(None) => false,
        Err(e) => {
            tracing::warn!(key, error = %e, "Practice default unreadable");
            false
        }
    }
}

fn write_flag(store: &dyn KeyValueStore, key: &str, on: bool) -> bool {
    let value: &[u8] = if on { b"1" } else { b"0" };
    match store.set(key, value) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to store practice default");
            false
        }
    }
}
