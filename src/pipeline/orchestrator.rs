//! Per-question routing: match → prompt → generate → record.
//!
//! A matched question is answered from its protocol entry. An unmatched one
//! is logged for clinical review and answered from general knowledge with the
//! mandatory disclaimer. Collaborator failures never end the session.

use super::matching::find_best_match;
use super::prompt::{general_prompt, grounded_prompt};
use super::safety::{clean_patient_question, neutralize_injection};
use crate::llm::LlmGenerate;
use crate::models::enums::AnswerSource;
use crate::review_log::{ReviewLog, UnansweredQuestion};
use crate::session::{Session, SessionError};

/// Default maximum question length in characters.
pub const DEFAULT_MAX_QUESTION_CHARS: usize = 2_000;

/// Shown to the patient after their question is queued for review.
pub const REVIEW_NOTICE: &str = "This question has been logged for review.";

/// Prefix of the inline answer shown when the model call fails.
pub const MODEL_ERROR_PREFIX: &str = "An error occurred while contacting the AI model";

/// Outcome of one submitted question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    /// Text shown to the patient (the model's answer or an inline error).
    pub text: String,
    pub source: AnswerSource,
    /// Protocol question that grounded the answer, when matched.
    pub matched_question: Option<String>,
    pub match_score: Option<usize>,
    /// Whether the question reached the review log.
    pub logged_for_review: bool,
    /// Whether `text` is an inline model error rather than an answer.
    pub model_failed: bool,
}

/// Routes patient questions for one process. Holds only borrowed collaborators;
/// all per-patient state lives in the `Session` passed to `ask`.
pub struct PatientAssistant<'a, G: LlmGenerate, L: ReviewLog> {
    generator: &'a G,
    review_log: &'a L,
    max_question_chars: usize,
}

impl<'a, G: LlmGenerate, L: ReviewLog> PatientAssistant<'a, G, L> {
    pub fn new(generator: &'a G, review_log: &'a L) -> Self {
        Self {
            generator,
            review_log,
            max_question_chars: DEFAULT_MAX_QUESTION_CHARS,
        }
    }

    pub fn with_max_question_chars(mut self, max_question_chars: usize) -> Self {
        self.max_question_chars = max_question_chars;
        self
    }

    /// Answer one patient question within `session`.
    ///
    /// Errors only for session misuse (blank question, no surgery selected);
    /// model and logging failures are folded into the reply.
    pub fn ask(
        &self,
        session: &mut Session<'_>,
        raw_question: &str,
    ) -> Result<AssistantReply, SessionError> {
        let question = clean_patient_question(raw_question, self.max_question_chars);
        if question.is_empty() {
            return Err(SessionError::EmptyQuestion);
        }
        let surgery_type = session
            .surgery_type()
            .ok_or(SessionError::NoSurgerySelected)?
            .to_string();

        // Step 1: Match against the selected surgery's protocol
        let matched = find_best_match(&question, session.active_subset().iter().copied());

        // Step 2: Build exactly one of the two prompts
        let prompt_question = neutralize_injection(&question);
        let (prompt, source, matched_question, match_score, logged_for_review) = match matched {
            Some(m) => {
                tracing::info!(
                    session = %session.id(),
                    surgery = %surgery_type,
                    score = m.score,
                    "Answering from protocol"
                );
                (
                    grounded_prompt(&prompt_question, m.entry),
                    AnswerSource::Protocol,
                    Some(m.entry.question().to_string()),
                    Some(m.score),
                    false,
                )
            }
            None => {
                tracing::info!(
                    session = %session.id(),
                    surgery = %surgery_type,
                    "No protocol match, answering generally"
                );
                let logged = self.log_unanswered(&surgery_type, &question);
                (
                    general_prompt(&prompt_question),
                    AnswerSource::General,
                    None,
                    None,
                    logged,
                )
            }
        };

        // Step 3: Generate
        let (text, model_failed) = match self.generator.generate(&prompt) {
            Ok(answer) => (answer, false),
            Err(e) => {
                tracing::error!(
                    session = %session.id(),
                    model = %self.generator.model(),
                    error = %e,
                    "Model call failed"
                );
                (format!("{MODEL_ERROR_PREFIX}: {e}"), true)
            }
        };

        // Step 4: Record the exchange
        session.record_exchange(&question, &text);

        Ok(AssistantReply {
            text,
            source,
            matched_question,
            match_score,
            logged_for_review,
            model_failed,
        })
    }

    /// Best-effort append to the review log. Returns whether the row was written.
    fn log_unanswered(&self, surgery_type: &str, question: &str) -> bool {
        if !self.review_log.is_enabled() {
            return false;
        }
        let row = UnansweredQuestion::now(surgery_type, question);
        match self.review_log.append(&row) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Could not write to the review log");
                false
            }
        }
    }
}
