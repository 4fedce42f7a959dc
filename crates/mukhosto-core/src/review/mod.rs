//! Review
//!
//! Turning due words into cards and walking through them.

mod content;
mod defaults;
mod queue;
mod session;

pub use content::{BACK_COLUMN, ContentRow, EXTRA_COLUMN_PREFIX, FRONT_COLUMN, SUB_COLUMN, rows_from_json};
pub use defaults::PracticeDefaults;
pub use queue::{ReviewCard, ReviewQueue};
pub use session::{ReviewSession, SessionSummary};
