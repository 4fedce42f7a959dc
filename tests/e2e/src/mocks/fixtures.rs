//! Test Data Factory
//!
//! Provides content rows and scheduling scenarios:
//! - Vocabulary rows shaped like the content sheet
//! - Batches of tracked words spread across the stage ladder

use mukhosto_core::{ContentRow, Outcome, ReviewScheduler};

/// Factory for creating test data
pub struct TestDataFactory;

impl TestDataFactory {
    /// Small English-Bangla vocabulary sheet
    pub fn vocabulary_rows() -> Vec<ContentRow> {
        vec![
            ContentRow::new("Apple", "আপেল")
                .with_sub("a round fruit")
                .with_extra("An apple a day keeps the doctor away"),
            ContentRow::new("Book", "বই").with_sub("pages bound together"),
            ContentRow::new("Water", "পানি"),
            ContentRow::new("River", "নদী").with_extra("The river floods in monsoon"),
        ]
    }

    /// Columns as exported from the sheet, for the JSON loader
    pub fn vocabulary_sheet_json() -> String {
        serde_json::json!([
            {"FrontData": "Apple", "BackData": "আপেল", "SubBack": "a round fruit", "ExtraData1": "An apple a day"},
            {"FrontData": "Book", "BackData": "বই"},
            {"FrontData": "Water", "BackData": "পানি", "Notes": "not shown"},
        ])
        .to_string()
    }

    /// Track `words` and rate each one `good` `stage` times
    pub fn track_at_stage(scheduler: &ReviewScheduler, words: &[&str], stage: usize) {
        for word in words {
            scheduler.init_for_word(word).expect("Failed to init word");
            for _ in 0..stage {
                scheduler
                    .mark_reviewed(word, Outcome::Good)
                    .expect("Failed to review word");
            }
        }
    }

    /// `count` generated words, all at stage 0
    pub fn track_batch(scheduler: &ReviewScheduler, count: usize) -> Vec<String> {
        let words: Vec<String> = (0..count).map(|i| format!("word-{i:04}")).collect();
        let report = scheduler.migrate_from_legacy_set(&words);
        assert_eq!(report.added, count, "batch words should all be new");
        words
    }
}
