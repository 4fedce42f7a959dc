//! # Review Lifecycle Journey
//!
//! A word from first sight to the rolling interval:
//! 1. Track a word and wait for it to come due
//! 2. Climb the whole ladder with good ratings
//! 3. Fail it once and start over
//! 4. Check the history tells the same story

use chrono::Duration;
use mukhosto_core::{DEFAULT_ROLLING_MINUTES, DEFAULT_STAGE_MINUTES, HistoryAction, Outcome};
use mukhosto_e2e_tests::TestStoreManager;

#[test]
fn test_word_is_due_after_first_interval() {
    let db = TestStoreManager::new_temp();
    let item = db.scheduler.init_for_word("Apple").unwrap();
    assert_eq!(item.due_at, db.now() + Duration::days(3));

    db.advance_days(2);
    assert!(db.scheduler.due_keys().is_empty());

    db.advance_days(1);
    assert_eq!(db.scheduler.due_keys(), vec!["Apple".to_string()]);
    assert_eq!(db.scheduler.count_due(), 1);
}

#[test]
fn test_full_ladder_then_rolling() {
    let db = TestStoreManager::new_temp();
    db.scheduler.init_for_word("river").unwrap();
    db.advance_days(3);

    for (stage, minutes) in DEFAULT_STAGE_MINUTES.iter().enumerate().skip(1) {
        let item = db.scheduler.mark_reviewed("river", Outcome::Good).unwrap();
        assert_eq!(item.stage, stage);
        assert_eq!(item.due_at, db.now() + Duration::minutes(i64::from(*minutes)));
        db.advance_minutes(i64::from(*minutes));
        assert_eq!(db.scheduler.count_due(), 1);
    }

    for _ in 0..3 {
        let item = db.scheduler.mark_reviewed("river", Outcome::Good).unwrap();
        assert_eq!(item.stage, DEFAULT_STAGE_MINUTES.len() - 1);
        assert_eq!(
            item.due_at,
            db.now() + Duration::minutes(i64::from(DEFAULT_ROLLING_MINUTES))
        );
        db.advance_minutes(i64::from(DEFAULT_ROLLING_MINUTES));
    }
}

#[test]
fn test_lapse_restarts_the_ladder() {
    let db = TestStoreManager::new_temp();
    for _ in 0..3 {
        db.scheduler.mark_reviewed("book", Outcome::Good).unwrap();
    }
    assert_eq!(db.scheduler.peek("book").unwrap().stage, 3);

    db.advance_days(20);
    let item = db.scheduler.mark_reviewed("Book", Outcome::Again).unwrap();
    assert_eq!(item.stage, 0);
    assert_eq!(item.due_at, db.now() + Duration::days(3));
    assert_eq!(item.display, "Book");

    let item = db.scheduler.mark_reviewed("book", Outcome::Good).unwrap();
    assert_eq!(item.stage, 1);
    assert_eq!(item.due_at, db.now() + Duration::days(7));
}

#[test]
fn test_history_records_every_event() {
    let db = TestStoreManager::new_temp();
    db.scheduler.init_for_word("water").unwrap();
    db.advance_minutes(1);
    db.scheduler.mark_reviewed("water", Outcome::Good).unwrap();
    db.advance_minutes(1);
    db.scheduler.mark_reviewed("water", Outcome::Again).unwrap();

    let item = db.scheduler.peek("WATER").unwrap();
    let actions: Vec<_> = item.history.iter().map(|h| h.action.clone()).collect();
    assert_eq!(
        actions,
        vec![HistoryAction::Init, HistoryAction::Good, HistoryAction::Again]
    );
    assert!(item.history.windows(2).all(|w| w[0].ts < w[1].ts));
    assert_eq!(item.count_outcomes(Outcome::Good), 1);
}

#[test]
fn test_due_queue_orders_by_due_time() {
    let db = TestStoreManager::new_temp();
    db.scheduler.init_for_word("zebra").unwrap();
    db.advance_minutes(10);
    db.scheduler.init_for_word("apple").unwrap();
    db.advance_minutes(10);
    db.scheduler.init_for_word("mango").unwrap();

    db.advance_days(4);
    assert_eq!(
        db.scheduler.due_keys(),
        vec!["zebra".to_string(), "apple".to_string(), "mango".to_string()]
    );
}
