use std::path::Path;

use super::csv::parse_records;
use super::{
    ProtocolError, COLUMN_ALTERNATE_QUESTIONS, COLUMN_ANSWER, COLUMN_QUESTION,
    COLUMN_SURGERY_TYPE,
};
use crate::models::ProtocolEntry;

/// Read-only table of every curated protocol entry, in source order.
///
/// Loaded once at startup and shared by reference with every session.
/// There is no mutation API: a different protocol file means a new process.
#[derive(Debug, Clone)]
pub struct ProtocolStore {
    entries: Vec<ProtocolEntry>,
}

/// Column positions resolved from the header row.
struct ColumnIndex {
    surgery_type: usize,
    question: usize,
    alternate_questions: usize,
    answer: usize,
}

impl ColumnIndex {
    fn from_header(header: &[String]) -> Result<Self, ProtocolError> {
        let find = |name: &'static str| {
            header
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(ProtocolError::MissingColumn(name))
        };

        Ok(Self {
            surgery_type: find(COLUMN_SURGERY_TYPE)?,
            question: find(COLUMN_QUESTION)?,
            alternate_questions: find(COLUMN_ALTERNATE_QUESTIONS)?,
            answer: find(COLUMN_ANSWER)?,
        })
    }
}

impl ProtocolStore {
    /// Load the protocol table from a CSV file on disk.
    pub fn load(path: &Path) -> Result<Self, ProtocolError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProtocolError::NotFound(path.to_path_buf())
            } else {
                ProtocolError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let store = Self::from_csv_str(&text)?;
        tracing::info!(
            path = %path.display(),
            entries = store.len(),
            surgery_types = store.surgery_types().len(),
            "Protocol store loaded"
        );
        Ok(store)
    }

    /// Parse the protocol table from CSV text.
    pub fn from_csv_str(text: &str) -> Result<Self, ProtocolError> {
        let mut records = parse_records(text)?.into_iter();
        let (_, header) = records.next().ok_or(ProtocolError::MissingHeader)?;
        let columns = ColumnIndex::from_header(&header)?;

        let mut entries = Vec::new();
        for (row, fields) in records {
            let cell = |idx: usize| fields.get(idx).map(|s| s.trim()).unwrap_or("");

            let surgery_type = cell(columns.surgery_type);
            if surgery_type.is_empty() {
                return Err(ProtocolError::MalformedRow {
                    row,
                    reason: format!("blank {COLUMN_SURGERY_TYPE}"),
                });
            }
            let question = cell(columns.question);
            if question.is_empty() {
                return Err(ProtocolError::MalformedRow {
                    row,
                    reason: format!("blank {COLUMN_QUESTION}"),
                });
            }

            entries.push(ProtocolEntry::new(
                surgery_type,
                question,
                cell(columns.alternate_questions),
                cell(columns.answer),
            ));
        }

        Self::from_entries(entries)
    }

    /// Build a store from already-parsed entries, preserving their order.
    pub fn from_entries(entries: Vec<ProtocolEntry>) -> Result<Self, ProtocolError> {
        if entries.is_empty() {
            return Err(ProtocolError::Empty);
        }
        Ok(Self { entries })
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub(crate) fn entries(&self) -> &[ProtocolEntry] {
        &self.entries
    }

    /// Distinct surgery types in order of first appearance.
    pub fn surgery_types(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !seen.contains(&entry.surgery_type()) {
                seen.push(entry.surgery_type());
            }
        }
        seen
    }

    pub fn has_surgery_type(&self, surgery_type: &str) -> bool {
        self.entries.iter().any(|e| e.surgery_type() == surgery_type)
    }

    /// Entries for one surgery type, in load order.
    pub fn subset_for(&self, surgery_type: &str) -> Vec<&ProtocolEntry> {
        self.entries
            .iter()
            .filter(|e| e.surgery_type() == surgery_type)
            .collect()
    }
}
