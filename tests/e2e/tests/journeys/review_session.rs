//! # Review Session Journey
//!
//! One sitting with the due queue:
//! 1. Join due words with the content sheet
//! 2. Rate cards, skipping around with next/previous
//! 3. Finish and read the summary back
//! 4. Practice defaults and shuffled order survive the session

use mukhosto_core::review::rows_from_json;
use mukhosto_core::{Outcome, PracticeDefaults, ReviewQueue, ReviewSession};
use mukhosto_e2e_tests::{TestDataFactory, TestStoreManager};

#[test]
fn test_queue_from_sheet() {
    let db = TestStoreManager::new_temp();
    TestDataFactory::track_at_stage(&db.scheduler, &["apple", "Book", "Unknown"], 0);
    db.advance_days(3);

    let rows = rows_from_json(TestDataFactory::vocabulary_sheet_json().as_bytes()).unwrap();
    let queue = ReviewQueue::build(&db.scheduler.due_keys(), &rows, false);
    let cards = queue.cards();

    assert_eq!(cards.len(), 3);
    assert_eq!(cards[0].word, "Apple");
    assert_eq!(cards[0].sub_back, "a round fruit");
    assert_eq!(cards[0].extras, vec!["An apple a day".to_string()]);
    assert_eq!(cards[1].word, "Book");
    assert_eq!(cards[1].back, "বই");
    assert_eq!(cards[2].word, "Unknown");
    assert_eq!(cards[2].front, "Unknown");
    assert_eq!(cards[2].back, "");
}

#[test]
fn test_reverse_queue() {
    let db = TestStoreManager::new_temp();
    TestDataFactory::track_at_stage(&db.scheduler, &["water"], 0);
    db.advance_days(3);

    let queue = ReviewQueue::build(&db.scheduler.due_keys(), &TestDataFactory::vocabulary_rows(), true);
    let card = &queue.cards()[0];
    assert_eq!(card.front, "পানি");
    assert_eq!(card.back, "Water");
    assert_eq!(card.word, "Water");
}

#[test]
fn test_full_session() {
    let db = TestStoreManager::new_temp();
    TestDataFactory::track_at_stage(&db.scheduler, &["apple", "book", "river"], 0);
    db.advance_days(3);

    let queue = ReviewQueue::build(&db.scheduler.due_keys(), &TestDataFactory::vocabulary_rows(), false);
    let mut session = ReviewSession::new(&db.scheduler, queue);
    assert_eq!(session.position(), (1, 3));

    // skip apple, fail book, come back for apple
    assert!(session.next());
    assert_eq!(session.mark(Outcome::Again).unwrap().word, "Book");
    assert!(session.previous());
    assert_eq!(session.mark(Outcome::Good).unwrap().word, "Apple");
    assert_eq!(session.remaining(), 1);
    assert_eq!(session.mark(Outcome::Good).unwrap().word, "River");
    assert!(session.is_done());

    db.advance_minutes(1);
    let summary = session.finish();
    assert_eq!(summary.reviewed, 3);
    assert_eq!(summary.ts, db.now());
    assert_eq!(ReviewSession::last_summary(&db.reopen().scheduler), Some(summary));

    assert_eq!(db.scheduler.peek("apple").unwrap().stage, 1);
    assert_eq!(db.scheduler.peek("book").unwrap().stage, 0);
    assert_eq!(db.scheduler.count_due(), 0);
}

#[test]
fn test_empty_session_summary() {
    let db = TestStoreManager::new_temp();
    let queue = ReviewQueue::build(&db.scheduler.due_keys(), &TestDataFactory::vocabulary_rows(), false);
    let session = ReviewSession::new(&db.scheduler, queue);
    assert!(session.current().is_none());
    assert_eq!(session.position(), (0, 0));
    assert_eq!(session.finish().reviewed, 0);
}

#[test]
fn test_shuffled_session_with_saved_defaults() {
    let db = TestStoreManager::new_temp();
    let defaults = PracticeDefaults {
        reverse: true,
        show_extras: true,
    };
    assert!(defaults.save(db.store.as_ref()));
    assert_eq!(db.raw_record("reversePractice"), Some(serde_json::json!(1)));

    let reopened = db.reopen();
    let saved = PracticeDefaults::load(reopened.store.as_ref());
    assert_eq!(saved, defaults);

    TestDataFactory::track_at_stage(&reopened.scheduler, &["apple", "book", "river"], 0);
    reopened.advance_days(3);
    let queue = ReviewQueue::build(
        &reopened.scheduler.due_keys(),
        &TestDataFactory::vocabulary_rows(),
        saved.reverse,
    );
    let mut session = ReviewSession::new(&reopened.scheduler, queue);
    session.next();
    session.shuffle();
    assert_eq!(session.position(), (1, 3));

    let mut rated = Vec::new();
    while let Some(card) = session.mark(Outcome::Good) {
        assert_ne!(card.front, card.word);
        rated.push(card.word);
    }
    rated.sort();
    assert_eq!(rated, vec!["Apple", "Book", "River"]);
    assert_eq!(session.finish().reviewed, 3);
    assert_eq!(reopened.scheduler.count_due(), 0);
}
