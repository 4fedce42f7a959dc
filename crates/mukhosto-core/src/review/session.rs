//! Review session
//!
//! Walks a [`ReviewQueue`], forwarding each rating to the scheduler. Rated
//! cards leave the session; the summary written by [`ReviewSession::finish`]
//! survives for whoever shows the next screen.

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::queue::{ReviewCard, ReviewQueue};
use crate::clock::{Clock, truncate_to_millis};
use crate::records::SESSION_KEY;
use crate::srs::{Outcome, ReviewScheduler};
use crate::storage::KeyValueStore;

/// Written when a session ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub ts: DateTime<Utc>,
    /// Cards rated during the session, whichever way
    pub reviewed: usize,
}

pub struct ReviewSession<'a> {
    scheduler: &'a ReviewScheduler,
    cards: Vec<ReviewCard>,
    index: usize,
    reviewed: usize,
}

impl<'a> ReviewSession<'a> {
    pub fn new(scheduler: &'a ReviewScheduler, queue: ReviewQueue) -> Self {
        Self {
            scheduler,
            cards: queue.into_cards(),
            index: 0,
            reviewed: 0,
        }
    }

    /// Card under the cursor, `None` once every card is rated
    pub fn current(&self) -> Option<&ReviewCard> {
        self.cards.get(self.index)
    }

    /// 1-based position and remaining card count, `(0, 0)` when empty
    pub fn position(&self) -> (usize, usize) {
        if self.cards.is_empty() {
            (0, 0)
        } else {
            (self.index + 1, self.cards.len())
        }
    }

    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    pub fn reviewed(&self) -> usize {
        self.reviewed
    }

    pub fn is_done(&self) -> bool {
        self.cards.is_empty()
    }

    /// Whether the cursor is on the last remaining card
    pub fn is_last(&self) -> bool {
        !self.cards.is_empty() && self.index == self.cards.len() - 1
    }

    /// Move forward; returns `false` at the last card, leaving the cursor.
    pub fn next(&mut self) -> bool {
        if self.index + 1 < self.cards.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Put the remaining cards in random order and return to the first.
    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut rand::rng());
    }

    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.cards.shuffle(rng);
        self.index = 0;
    }

    /// Move back; returns `false` at the first card.
    pub fn previous(&mut self) -> bool {
        if self.index > 0 {
            self.index -= 1;
            true
        } else {
            false
        }
    }

    /// Rate the current card and take it out of the session.
    ///
    /// The card counts as reviewed even if the scheduler could not store the
    /// rating. Returns the rated card, or `None` when nothing is left.
    pub fn mark(&mut self, outcome: Outcome) -> Option<ReviewCard> {
        if self.index >= self.cards.len() {
            return None;
        }
        let card = self.cards.remove(self.index);
        let text = if card.word.is_empty() { &card.front } else { &card.word };
        if self.scheduler.mark_reviewed(text, outcome).is_none() {
            tracing::warn!(word = %card.word, %outcome, "Rating was not stored");
        }
        self.reviewed += 1;

        if self.index >= self.cards.len() {
            self.index = self.cards.len().saturating_sub(1);
        }
        Some(card)
    }

    /// End the session and record its summary.
    ///
    /// A failed write is logged; the summary is returned either way.
    pub fn finish(self) -> SessionSummary {
        let summary = SessionSummary {
            ts: truncate_to_millis(self.scheduler.clock().now()),
            reviewed: self.reviewed,
        };
        match serde_json::to_vec(&summary) {
            Ok(bytes) => {
                if let Err(e) = self.scheduler.store().set(SESSION_KEY, &bytes) {
                    tracing::warn!(key = SESSION_KEY, error = %e, "Failed to store session summary");
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to encode session summary"),
        }
        tracing::info!(reviewed = summary.reviewed, skipped = self.cards.len(), "Review session finished");
        summary
    }

    /// Summary of the most recently finished session
    pub fn last_summary(scheduler: &ReviewScheduler) -> Option<SessionSummary> {
        let bytes = scheduler.store().get(SESSION_KEY).ok()??;
        serde_json::from_slice(&bytes).ok()
    }
}
