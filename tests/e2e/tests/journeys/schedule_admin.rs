//! # Schedule Administration Journey
//!
//! Changing the ladder while words are in flight:
//! 1. Configure a short schedule from interval tokens
//! 2. Re-apply the first interval to stage-0 words
//! 3. Reset to defaults
//! 4. Load an old day-based config record

use chrono::Duration;
use mukhosto_core::records::{CONFIG_KEY, LEGACY_CONFIG_KEY};
use mukhosto_core::{
    DEFAULT_ROLLING_MINUTES, DEFAULT_STAGE_MINUTES, HistoryAction, Outcome, parse_interval_token,
    parse_schedule,
};
use mukhosto_e2e_tests::{TestDataFactory, TestStoreManager};

#[test]
fn test_configure_schedule_from_tokens() {
    let db = TestStoreManager::new_temp();
    let config = db.scheduler.config();

    let stages = parse_schedule("1d, 30m, 3h, junk, 30m");
    assert_eq!(stages, vec![30, 180, 1440]);
    assert!(config.set_stage_intervals(stages.iter().map(|&m| i64::from(m))));
    let rolling = parse_interval_token("2d").unwrap();
    assert!(config.set_rolling_interval(i64::from(rolling)));

    assert_eq!(config.describe(), "30m → 3h → 1d → every 2d");
    assert_eq!(
        db.raw_record(CONFIG_KEY).unwrap(),
        serde_json::json!({"stageMinutes": [30, 180, 1440], "rollingMinutes": 2880})
    );

    let item = db.scheduler.init_for_word("apple").unwrap();
    assert_eq!(item.due_at, db.now() + Duration::minutes(30));
}

#[test]
fn test_invalid_rolling_keeps_previous() {
    let db = TestStoreManager::new_temp();
    let config = db.scheduler.config();
    assert!(config.set_rolling_interval(90));
    assert!(!config.set_rolling_interval(0));
    assert!(!config.set_rolling_interval(-5));
    assert!(!config.set_rolling_interval(10_000_000));
    assert_eq!(config.rolling_interval(), 90);
}

#[test]
fn test_reschedule_stage0_after_shortening() {
    let db = TestStoreManager::new_temp();
    TestDataFactory::track_at_stage(&db.scheduler, &["new-a", "new-b"], 0);
    TestDataFactory::track_at_stage(&db.scheduler, &["learned"], 2);
    let learned = db.scheduler.peek("learned").unwrap();

    assert!(db.scheduler.config().set_stage_intervals([10, 60]));
    assert!(db.scheduler.due_keys_at(db.now() + Duration::minutes(10)).is_empty());

    let report = db.scheduler.reschedule_stage0();
    assert_eq!(report.changed, 2);
    assert_eq!(report.first_minutes, 10);
    assert_eq!(
        db.scheduler.due_keys_at(db.now() + Duration::minutes(10)),
        vec!["new-a".to_string(), "new-b".to_string()]
    );
    assert_eq!(db.scheduler.peek("learned").unwrap(), learned);
    assert_eq!(
        db.scheduler.peek("new-a").unwrap().last_action(),
        Some(&HistoryAction::RescheduleStage0)
    );
}

#[test]
fn test_reset_to_defaults() {
    let db = TestStoreManager::new_temp();
    let config = db.scheduler.config();
    assert!(config.set_stage_intervals([5]));
    assert!(config.set_rolling_interval(5));
    assert!(config.reset_to_defaults());
    assert_eq!(config.stage_intervals(), DEFAULT_STAGE_MINUTES.to_vec());
    assert_eq!(config.rolling_interval(), DEFAULT_ROLLING_MINUTES);
}

#[test]
fn test_shrinking_schedule_caps_advanced_words() {
    let db = TestStoreManager::new_temp();
    TestDataFactory::track_at_stage(&db.scheduler, &["deep"], 4);
    assert!(db.scheduler.config().set_stage_intervals([15, 45]));
    assert!(db.scheduler.config().set_rolling_interval(120));

    let item = db.scheduler.mark_reviewed("deep", Outcome::Good).unwrap();
    assert_eq!(item.stage, 1);
    assert_eq!(item.due_at, db.now() + Duration::minutes(120));
}

#[test]
fn test_legacy_day_config_is_honored() {
    let db = TestStoreManager::new_temp();
    db.write_raw(LEGACY_CONFIG_KEY, br#"{"stageDays": [1, 2], "rollingDays": 10}"#);

    let config = db.scheduler.config();
    assert_eq!(config.stage_intervals(), vec![1440, 2880]);
    assert_eq!(config.rolling_interval(), 14_400);
    assert_eq!(config.stage_days(), vec![1, 2]);

    // the first write moves the schedule to the minute-based record
    assert!(config.set_rolling_interval(60));
    assert_eq!(
        db.raw_record(CONFIG_KEY).unwrap(),
        serde_json::json!({"stageMinutes": [1440, 2880], "rollingMinutes": 60})
    );
}

#[test]
fn test_damaged_config_reads_as_defaults() {
    let db = TestStoreManager::new_temp();
    db.write_raw(CONFIG_KEY, b"not json at all");
    assert_eq!(db.scheduler.config().stage_intervals(), DEFAULT_STAGE_MINUTES.to_vec());

    db.write_raw(CONFIG_KEY, br#"{"stageMinutes": [], "rollingMinutes": "45"}"#);
    assert_eq!(db.scheduler.config().stage_intervals(), DEFAULT_STAGE_MINUTES.to_vec());
    assert_eq!(db.scheduler.config().rolling_interval(), DEFAULT_ROLLING_MINUTES);

    db.write_raw(CONFIG_KEY, br#"{"stageMinutes": ["90", 30.7, -1], "rollingMinutes": 60.0}"#);
    assert_eq!(db.scheduler.config().stage_intervals(), vec![30, 90]);
    assert_eq!(db.scheduler.config().rolling_interval(), 60);
}
