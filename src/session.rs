//! Per-patient conversation state.
//!
//! A session borrows the process-wide protocol store and keeps the subset
//! for the selected surgery, in store order. Only the owning front end
//! touches it; nothing is shared between sessions except the store.

use thiserror::Error;
use uuid::Uuid;

use crate::models::{ChatMessage, ProtocolEntry};
use crate::protocol::ProtocolStore;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    #[error("Unknown surgery type: {0}")]
    UnknownSurgeryType(String),

    #[error("Surgery type already selected ({0}); reset the session to change it")]
    SurgeryAlreadySelected(String),

    #[error("Select a surgery type before asking a question")]
    NoSurgerySelected,

    #[error("Question is empty")]
    EmptyQuestion,
}

pub struct Session<'s> {
    id: Uuid,
    store: &'s ProtocolStore,
    surgery_type: Option<String>,
    active_subset: Vec<&'s ProtocolEntry>,
    history: Vec<ChatMessage>,
}

impl<'s> Session<'s> {
    pub fn new(store: &'s ProtocolStore) -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(session = %id, "Session started");
        Self {
            id,
            store,
            surgery_type: None,
            active_subset: Vec::new(),
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn surgery_type(&self) -> Option<&str> {
        self.surgery_type.as_deref()
    }

    /// Protocol entries for the selected surgery, in store order.
    /// Empty until a surgery type is selected.
    pub fn active_subset(&self) -> &[&'s ProtocolEntry] {
        &self.active_subset
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Choose the surgery type. Allowed once per session; `reset` to change.
    pub fn select_surgery(&mut self, surgery_type: &str) -> Result<(), SessionError> {
        if let Some(current) = &self.surgery_type {
            return Err(SessionError::SurgeryAlreadySelected(current.clone()));
        }
        if !self.store.has_surgery_type(surgery_type) {
            return Err(SessionError::UnknownSurgeryType(surgery_type.to_string()));
        }

        self.active_subset = self.store.subset_for(surgery_type);
        self.surgery_type = Some(surgery_type.to_string());
        tracing::info!(
            session = %self.id,
            surgery = %surgery_type,
            entries = self.active_subset.len(),
            "Surgery protocol selected"
        );
        Ok(())
    }

    /// Clear the surgery selection and the conversation.
    pub fn reset(&mut self) {
        self.surgery_type = None;
        self.active_subset.clear();
        self.history.clear();
        tracing::info!(session = %self.id, "Session reset");
    }

    /// Record one question and its answer, in that order.
    pub(crate) fn record_exchange(&mut self, question: &str, answer: &str) {
        self.history.push(ChatMessage::user(question));
        self.history.push(ChatMessage::assistant(answer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageRole;

    fn store() -> ProtocolStore {
        ProtocolStore::from_entries(vec![
            ProtocolEntry::new("ACDF", "Shower after surgery", "", "48 hours."),
            ProtocolEntry::new("Lumbar Fusion", "Driving", "", "Two weeks."),
            ProtocolEntry::new("ACDF", "Neck brace", "collar", "Six weeks."),
        ])
        .unwrap()
    }

    #[test]
    fn new_session_has_no_surgery_or_history() {
        let store = store();
        let session = Session::new(&store);
        assert!(session.surgery_type().is_none());
        assert!(session.active_subset().is_empty());
        assert!(session.history().is_empty());
    }

    #[test]
    fn selecting_surgery_filters_subset_in_load_order() {
        let store = store();
        let mut session = Session::new(&store);
        session.select_surgery("ACDF").unwrap();

        assert_eq!(session.surgery_type(), Some("ACDF"));
        let questions: Vec<_> = session.active_subset().iter().map(|e| e.question()).collect();
        assert_eq!(questions, vec!["Shower after surgery", "Neck brace"]);
        assert!(session.active_subset().iter().all(|e| e.surgery_type() == "ACDF"));
    }

    #[test]
    fn unknown_surgery_is_rejected() {
        let store = store();
        let mut session = Session::new(&store);
        let err = session.select_surgery("Kyphoplasty").unwrap_err();
        assert_eq!(err, SessionError::UnknownSurgeryType("Kyphoplasty".into()));
        assert!(session.surgery_type().is_none());
    }

    #[test]
    fn surgery_can_only_be_selected_once() {
        let store = store();
        let mut session = Session::new(&store);
        session.select_surgery("ACDF").unwrap();
        let err = session.select_surgery("Lumbar Fusion").unwrap_err();
        assert_eq!(err, SessionError::SurgeryAlreadySelected("ACDF".into()));
        assert_eq!(session.active_subset().len(), 2);
    }

    #[test]
    fn reset_clears_selection_and_history_then_allows_reselection() {
        let store = store();
        let mut session = Session::new(&store);
        session.select_surgery("ACDF").unwrap();
        session.record_exchange("q", "a");

        session.reset();
        assert!(session.surgery_type().is_none());
        assert!(session.active_subset().is_empty());
        assert!(session.history().is_empty());

        session.select_surgery("Lumbar Fusion").unwrap();
        let questions: Vec<_> = session.active_subset().iter().map(|e| e.question()).collect();
        assert_eq!(questions, vec!["Driving"]);
    }

    #[test]
    fn exchange_is_recorded_question_first() {
        let store = store();
        let mut session = Session::new(&store);
        session.record_exchange("When can I drive?", "In two weeks.");
        assert_eq!(session.history()[0].role, MessageRole::User);
        assert_eq!(session.history()[0].content, "When can I drive?");
        assert_eq!(session.history()[1].role, MessageRole::Assistant);
    }
}
