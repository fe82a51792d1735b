//! Curated protocol data: loading the tabular source and serving
//! per-surgery subsets to patient sessions.

pub mod csv;
pub mod store;

pub use store::ProtocolStore;

use std::path::PathBuf;

use thiserror::Error;

/// Column headers the protocol source must carry.
pub const COLUMN_SURGERY_TYPE: &str = "SurgeryType";
pub const COLUMN_QUESTION: &str = "Question";
pub const COLUMN_ALTERNATE_QUESTIONS: &str = "Alternate_Questions";
pub const COLUMN_ANSWER: &str = "Answer";

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Protocol file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read protocol file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Protocol file has no header row")]
    MissingHeader,

    #[error("Protocol file is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("Malformed protocol row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("Protocol file contains no entries")]
    Empty,
}
