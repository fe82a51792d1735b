//! Keyword-overlap relevance matching between patient questions and
//! curated protocol entries.

pub mod keywords;
pub mod matcher;

pub use keywords::{keywords, is_stop_word, STOP_WORDS};
pub use matcher::{find_best_match, ProtocolMatch};
