//! Single best-match selection with a two-regime acceptance policy.
//!
//! Scoring is the size of the keyword intersection between the question and
//! an entry's search text. The acceptance thresholds are product decisions
//! tied to patient safety: a rejected question falls back to a general answer
//! with a disclaimer and is logged for review, while a wrongly accepted one
//! is answered from the wrong protocol with no disclaimer. Keep them exact.

use std::collections::HashSet;

use super::keywords::keywords;
use crate::models::ProtocolEntry;

/// Questions with at most this many keywords must be fully covered.
const FULL_COVERAGE_MAX_KEYWORDS: usize = 2;

/// Overlap required for longer questions.
const MIN_OVERLAP_LONG_QUERY: usize = 2;

/// The protocol entry selected to ground an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolMatch<'a> {
    pub entry: &'a ProtocolEntry,
    /// Number of question keywords found in the entry's search text.
    pub score: usize,
}

/// Find the protocol entry that should ground the answer to `question`, if any.
///
/// Entries are scanned in the given order and the first entry reaching the
/// highest score wins ties. Returns `None` when the question has no
/// significant keywords or the best score fails the acceptance policy.
pub fn find_best_match<'a, I>(question: &str, entries: I) -> Option<ProtocolMatch<'a>>
where
    I: IntoIterator<Item = &'a ProtocolEntry>,
{
    let query = keywords(question);
    if query.is_empty() {
        return None;
    }

    let mut best: Option<ProtocolMatch<'a>> = None;
    for entry in entries {
        let score = overlap(&query, &keywords(&entry.search_text()));
        let best_score = best.map(|m| m.score).unwrap_or(0);
        if score > best_score {
            best = Some(ProtocolMatch { entry, score });
        }
    }

    let best = best?;
    if is_accepted(query.len(), best.score) {
        tracing::debug!(
            keywords = query.len(),
            score = best.score,
            protocol_question = %best.entry.question(),
            "Protocol match accepted"
        );
        Some(best)
    } else {
        tracing::debug!(
            keywords = query.len(),
            score = best.score,
            "Best protocol candidate rejected"
        );
        None
    }
}

fn overlap(query: &HashSet<String>, entry: &HashSet<String>) -> usize {
    query.intersection(entry).count()
}

/// Short questions need every keyword covered; longer ones need at least two.
fn is_accepted(query_keywords: usize, best_score: usize) -> bool {
    if query_keywords <= FULL_COVERAGE_MAX_KEYWORDS {
        best_score == query_keywords
    } else {
        best_score >= MIN_OVERLAP_LONG_QUERY
    }
}
