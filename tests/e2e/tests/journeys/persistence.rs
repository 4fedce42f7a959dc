//! # Persistence Journey
//!
//! What reaches the database and what survives a restart:
//! 1. Items, config and history survive reopening the database
//! 2. The stored record keeps its camelCase millisecond shape
//! 3. Damaged entries are repaired, not lost
//! 4. Legacy known-words migrate once
//! 5. Resetting progress empties the database

use chrono::Duration;
use mukhosto_core::records::{ITEMS_KEY, KNOWN_WORDS_KEY, SESSION_KEY};
use mukhosto_core::{HistoryAction, Outcome, SqliteStore};
use mukhosto_e2e_tests::harness::T0_MILLIS;
use mukhosto_e2e_tests::{TestDataFactory, TestStoreManager};

#[test]
fn test_state_survives_reopen() {
    let db = TestStoreManager::new_temp();
    assert!(db.scheduler.config().set_stage_intervals([60, 120]));
    db.scheduler.mark_reviewed("Apple", Outcome::Good).unwrap();
    let before = db.scheduler.peek("apple").unwrap();

    let reopened = db.reopen();
    assert_eq!(reopened.scheduler.config().stage_intervals(), vec![60, 120]);
    assert_eq!(reopened.scheduler.peek("apple").unwrap(), before);
    assert!(db.db_path().ends_with(mukhosto_core::storage::DB_FILE_NAME));
}

#[test]
fn test_stored_record_shape() {
    let db = TestStoreManager::new_temp();
    db.scheduler.init_for_word("Book").unwrap();

    let record = db.raw_record(ITEMS_KEY).unwrap();
    let first = 3 * 24 * 60 * 60_000;
    assert_eq!(
        record,
        serde_json::json!({
            "book": {
                "key": "book",
                "display": "Book",
                "addedAt": T0_MILLIS,
                "stage": 0,
                "dueAt": T0_MILLIS + first,
                "history": [{"ts": T0_MILLIS, "action": "init"}]
            }
        })
    );
}

#[test]
fn test_damaged_entries_are_repaired() {
    let db = TestStoreManager::new_temp();
    let record = serde_json::json!({
        "apple": {"key": "apple", "display": "Apple", "addedAt": T0_MILLIS, "stage": 2,
                  "dueAt": T0_MILLIS, "history": [{"ts": T0_MILLIS, "action": "good"}, "junk"]},
        "book": {"display": "Book", "stage": "two"},
        "broken": 42
    });
    db.write_raw(ITEMS_KEY, record.to_string().as_bytes());

    assert_eq!(db.scheduler.tracked_count(), 2);
    assert_eq!(db.scheduler.due_keys(), vec!["Apple".to_string()]);

    let book = db.scheduler.peek("book").unwrap();
    assert_eq!(book.stage, 0);
    assert_eq!(book.due_at, db.now() + Duration::days(3));

    // initializing a repaired word persists the repair without losing progress
    let apple = db.scheduler.init_for_word("apple").unwrap();
    assert_eq!(apple.stage, 2);
    assert_eq!(apple.history.len(), 1);
    let stored = db.raw_record(ITEMS_KEY).unwrap();
    assert!(stored.get("broken").is_none());
    assert_eq!(stored["book"]["key"], "book");
}

#[test]
fn test_known_words_migrate_once() {
    let db = TestStoreManager::new_temp();
    db.write_raw(KNOWN_WORDS_KEY, br#"["Apple", "book", "apple"]"#);
    TestDataFactory::track_at_stage(&db.scheduler, &["book"], 1);

    let report = db.scheduler.migrate_from_known_words();
    assert_eq!(report.added, 1);
    assert_eq!(
        db.scheduler.peek("apple").unwrap().last_action(),
        Some(&HistoryAction::Migrated)
    );
    assert_eq!(db.scheduler.peek("book").unwrap().stage, 1);

    let reopened = db.reopen();
    assert_eq!(reopened.scheduler.migrate_from_known_words().added, 0);
}

#[test]
fn test_reset_progress_clears_everything() {
    let db = TestStoreManager::new_temp();
    db.write_raw(KNOWN_WORDS_KEY, br#"["apple"]"#);
    db.write_raw(SESSION_KEY, br#"{"ts": 1, "reviewed": 3}"#);
    TestDataFactory::track_batch(&db.scheduler, 25);

    assert!(db.scheduler.reset_progress());
    assert!(db.is_empty());
    assert!(db.raw_record(KNOWN_WORDS_KEY).is_none());
    assert!(db.raw_record(SESSION_KEY).is_none());

    let keys = db.store.keys().unwrap();
    assert!(!keys.iter().any(|k| k == ITEMS_KEY));
}

#[test]
fn test_clear_all_keeps_config() {
    let db = TestStoreManager::new_temp();
    assert!(db.scheduler.config().set_rolling_interval(600));
    TestDataFactory::track_batch(&db.scheduler, 10);

    assert!(db.scheduler.clear_all());
    assert!(db.is_empty());
    assert_eq!(db.reopen().scheduler.config().rolling_interval(), 600);
}

#[test]
fn test_separate_directories_are_isolated() {
    let a = TestStoreManager::new_temp();
    let b = TestStoreManager::new_temp();
    a.scheduler.init_for_word("only-in-a").unwrap();
    assert!(b.is_empty());
    assert_ne!(a.data_dir(), b.data_dir());

    let direct = SqliteStore::open(a.db_path()).unwrap();
    assert!(direct.keys().unwrap().contains(&ITEMS_KEY.to_string()));
}
