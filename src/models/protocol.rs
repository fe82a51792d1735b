use serde::{Deserialize, Serialize};

/// One curated question/answer pair from a surgeon's post-operative protocol.
///
/// Fields are private so an entry cannot change after it is loaded;
/// `search_text` is always derived from the current question fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolEntry {
    surgery_type: String,
    question: String,
    alternate_questions: String,
    answer: String,
}

impl ProtocolEntry {
    pub fn new(
        surgery_type: impl Into<String>,
        question: impl Into<String>,
        alternate_questions: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            surgery_type: surgery_type.into(),
            question: question.into(),
            alternate_questions: alternate_questions.into(),
            answer: answer.into(),
        }
    }

    pub fn surgery_type(&self) -> &str {
        &self.surgery_type
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    /// Alternate phrasings of the question. Empty when the source cell was blank.
    pub fn alternate_questions(&self) -> &str {
        &self.alternate_questions
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Text the relevance matcher scores against: the question followed by its
    /// alternate phrasings, separated by a single space.
    pub fn search_text(&self) -> String {
        format!("{} {}", self.question, self.alternate_questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_text_joins_question_and_alternates() {
        let entry = ProtocolEntry::new(
            "ACDF",
            "When can I drive?",
            "driving car",
            "Not while on narcotics.",
        );
        assert_eq!(entry.search_text(), "When can I drive? driving car");
    }

    #[test]
    fn search_text_with_blank_alternates_keeps_question() {
        let entry = ProtocolEntry::new("ACDF", "When can I drive?", "", "Answer");
        assert_eq!(entry.search_text().trim_end(), "When can I drive?");
    }
}
