//! Append-only log of questions the protocols did not answer.
//!
//! Clinical staff review these rows to decide which protocols need new
//! entries. Logging is best-effort: a failure here never blocks an answer.

pub mod sqlite;

pub use sqlite::SqliteReviewLog;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Timestamp layout of logged rows.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Error, Debug)]
pub enum ReviewLogError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Cannot create review log directory: {0}")]
    Io(#[from] std::io::Error),
}

/// One row of the review log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnansweredQuestion {
    /// Local time, `YYYY-MM-DD HH:MM:SS`.
    pub logged_at: String,
    pub surgery_type: String,
    pub question: String,
}

impl UnansweredQuestion {
    /// Stamp a question with the current local time.
    pub fn now(surgery_type: &str, question: &str) -> Self {
        Self {
            logged_at: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
            surgery_type: surgery_type.to_string(),
            question: question.to_string(),
        }
    }
}

/// Append-only sink for unanswered questions.
pub trait ReviewLog {
    fn append(&self, row: &UnansweredQuestion) -> Result<(), ReviewLogError>;

    /// False when no sink is configured; the router then skips logging
    /// entirely and tells the patient nothing.
    fn is_enabled(&self) -> bool {
        true
    }
}

impl<T: ReviewLog + ?Sized> ReviewLog for Box<T> {
    fn append(&self, row: &UnansweredQuestion) -> Result<(), ReviewLogError> {
        (**self).append(row)
    }

    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }
}

/// Sink used when review logging is turned off.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledReviewLog;

impl ReviewLog for DisabledReviewLog {
    fn append(&self, _row: &UnansweredQuestion) -> Result<(), ReviewLogError> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_uses_review_sheet_layout() {
        let row = UnansweredQuestion::now("ACDF", "Can I fly?");
        assert!(chrono::NaiveDateTime::parse_from_str(&row.logged_at, TIMESTAMP_FORMAT).is_ok());
        assert_eq!(row.logged_at.len(), "2026-01-01 00:00:00".len());
        assert_eq!(row.surgery_type, "ACDF");
        assert_eq!(row.question, "Can I fly?");
    }

    #[test]
    fn disabled_log_accepts_and_reports_disabled() {
        let log = DisabledReviewLog;
        assert!(!log.is_enabled());
        assert!(log.append(&UnansweredQuestion::now("ACDF", "q")).is_ok());
    }
}
