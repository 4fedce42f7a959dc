//! Review queue: due words joined with their content rows.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::content::ContentRow;
use crate::srs::normalize_key;

/// One card to show
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewCard {
    /// Text passed back to the scheduler when the card is rated
    pub word: String,
    pub front: String,
    pub back: String,
    pub sub_back: String,
    pub extras: Vec<String>,
}

impl ReviewCard {
    fn from_row(row: &ContentRow, reverse: bool) -> Self {
        let (front, back) = if reverse {
            (row.back_text.clone(), row.front_text.clone())
        } else {
            (row.front_text.clone(), row.back_text.clone())
        };
        Self {
            word: row.front_text.clone(),
            front,
            back,
            sub_back: row.sub_text.clone(),
            extras: row.extra_texts.clone(),
        }
    }

    /// Card for a due word with no content row
    fn bare(word: &str, reverse: bool) -> Self {
        let (front, back) = if reverse {
            (String::new(), word.to_string())
        } else {
            (word.to_string(), String::new())
        };
        Self {
            word: word.to_string(),
            front,
            back,
            ..Default::default()
        }
    }
}

/// Ordered cards for one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewQueue {
    cards: Vec<ReviewCard>,
}

impl ReviewQueue {
    /// Join `due_texts` with `rows` by normalized front text.
    ///
    /// Keeps the order of `due_texts`. When several rows share a front the
    /// last one wins. `reverse` shows the meaning first.
    pub fn build<S: AsRef<str>>(due_texts: &[S], rows: &[ContentRow], reverse: bool) -> Self {
        let by_front: HashMap<String, &ContentRow> = rows
            .iter()
            .filter_map(|row| {
                let key = row.lookup_key();
                (!key.is_empty()).then_some((key, row))
            })
            .collect();

        let cards = due_texts
            .iter()
            .map(|text| {
                let text = text.as_ref();
                match by_front.get(&normalize_key(text)) {
                    Some(row) => ReviewCard::from_row(row, reverse),
                    None => ReviewCard::bare(text, reverse),
                }
            })
            .collect();

        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[ReviewCard] {
        &self.cards
    }

    pub fn into_cards(self) -> Vec<ReviewCard> {
        self.cards
    }
}
