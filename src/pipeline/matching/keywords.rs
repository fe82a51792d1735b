use std::collections::HashSet;

/// Closed list of words carrying no matching signal: articles, prepositions,
/// auxiliaries, pronouns, question words, and a few conversational verbs
/// patients put in front of almost every question.
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "after", "an", "are", "as", "at", "be", "by", "can", "do", "for", "from",
    "how", "i", "in", "is", "it", "me", "my", "of", "on", "or", "should", "that", "the",
    "this", "to", "was", "what", "when", "where", "who", "will", "with", "your",
];

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

/// Significant keywords of `text`: lower-cased, whitespace-split, stop words removed.
///
/// Punctuation is kept attached to its word, so `"surgery?"` and `"surgery"`
/// are different keywords.
pub fn keywords(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .filter(|w| !is_stop_word(w))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn strips_stop_words_and_lowercases() {
        assert_eq!(keywords("What is a Discectomy"), set(&["discectomy"]));
    }

    #[test]
    fn shower_question_keeps_two_keywords() {
        assert_eq!(
            keywords("can I shower after my surgery"),
            set(&["shower", "surgery"])
        );
    }

    #[test]
    fn duplicates_collapse() {
        assert_eq!(keywords("brace brace BRACE"), set(&["brace"]));
    }

    #[test]
    fn empty_and_all_stop_word_input_is_empty() {
        assert!(keywords("").is_empty());
        assert!(keywords("   \t\n ").is_empty());
        assert!(keywords("what should I do about it").is_empty());
    }

    #[test]
    fn punctuation_stays_attached() {
        assert_eq!(keywords("surgery?"), set(&["surgery?"]));
        assert!(!keywords("when is my surgery?").contains("surgery"));
    }

    #[test]
    fn splits_on_any_whitespace() {
        assert_eq!(keywords("walk\tbrace\nstairs"), set(&["walk", "brace", "stairs"]));
    }

    #[test]
    fn stop_word_list_is_lowercase_and_unique() {
        let unique: HashSet<&str> = STOP_WORDS.iter().copied().collect();
        assert_eq!(unique.len(), STOP_WORDS.len());
        assert!(STOP_WORDS.iter().all(|w| w.chars().all(|c| c.is_ascii_lowercase())));
    }
}
