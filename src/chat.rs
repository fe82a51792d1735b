//! Terminal chat front end.
//!
//! Plays the role of the patient-facing UI: surgery selection, a
//! "start over" action, and one assistant response per submitted question.
//! Generic over reader and writer so the whole flow runs in tests.

use std::io::{BufRead, Write};

use crate::config::APP_NAME;
use crate::llm::LlmGenerate;
use crate::pipeline::orchestrator::{PatientAssistant, REVIEW_NOTICE};
use crate::protocol::ProtocolStore;
use crate::review_log::ReviewLog;
use crate::session::{Session, SessionError};

pub const WELCOME: &str =
    "Welcome! To provide the most accurate information, please select your surgery type below.";
pub const RESET_COMMAND: &str = "/reset";
pub const QUIT_COMMAND: &str = "/quit";
pub const INVALID_SELECTION: &str = "Please choose one of the listed surgery types.";

/// Banner shown once a surgery's protocol is active.
pub fn protocol_loaded_banner(surgery_type: &str) -> String {
    format!(
        "Protocol for {} is loaded. How can I help you?",
        surgery_type.to_uppercase()
    )
}

/// Resolve a menu answer: a 1-based number or a surgery name (case-insensitive).
pub fn parse_selection<'s>(input: &str, options: &[&'s str]) -> Option<&'s str> {
    let input = input.trim();
    if let Ok(n) = input.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| options.get(i)).copied();
    }
    options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(input))
        .copied()
}

/// Run the interactive loop until `/quit` or end of input.
pub fn run_chat<R, W, G, L>(
    mut input: R,
    output: &mut W,
    store: &ProtocolStore,
    assistant: &PatientAssistant<'_, G, L>,
) -> std::io::Result<()>
where
    R: BufRead,
    W: Write,
    G: LlmGenerate,
    L: ReviewLog,
{
    let mut session = Session::new(store);
    let options = store.surgery_types();

    writeln!(output, "{APP_NAME}")?;
    writeln!(
        output,
        "Type {RESET_COMMAND} to change surgery and start over, {QUIT_COMMAND} to leave."
    )?;

    loop {
        if session.surgery_type().is_none() {
            writeln!(output, "\n{WELCOME}")?;
            for (i, option) in options.iter().enumerate() {
                writeln!(output, "  {}. {}", i + 1, option)?;
            }
            write!(output, "Select your surgery: ")?;
        } else {
            write!(output, "\n> ")?;
        }
        output.flush()?;

        let Some(line) = read_line(&mut input)? else {
            break;
        };
        let line = line.trim();

        if line == QUIT_COMMAND {
            break;
        }
        if line == RESET_COMMAND {
            session.reset();
            continue;
        }
        if line.is_empty() {
            continue;
        }

        if session.surgery_type().is_none() {
            match parse_selection(line, &options) {
                Some(choice) => {
                    session
                        .select_surgery(choice)
                        .map_err(|e| std::io::Error::other(e.to_string()))?;
                    writeln!(output, "{}", protocol_loaded_banner(choice))?;
                }
                None => writeln!(output, "{INVALID_SELECTION}")?,
            }
            continue;
        }

        match assistant.ask(&mut session, line) {
            Ok(reply) => {
                if reply.logged_for_review {
                    writeln!(output, "{REVIEW_NOTICE}")?;
                }
                writeln!(output, "{}", reply.text)?;
            }
            Err(SessionError::EmptyQuestion) => {}
            Err(e) => writeln!(output, "{e}")?,
        }
    }

    writeln!(output)?;
    Ok(())
}

fn read_line<R: BufRead>(input: &mut R) -> std::io::Result<Option<String>> {
    let mut line = String::new();
    match input.read_line(&mut line)? {
        0 => Ok(None),
        _ => Ok(Some(line)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io::Cursor;

    use crate::llm::LlmError;
    use crate::models::ProtocolEntry;
    use crate::review_log::SqliteReviewLog;

    struct EchoLlm {
        calls: RefCell<usize>,
    }

    impl LlmGenerate for EchoLlm {
        fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            *self.calls.borrow_mut() += 1;
            if prompt.contains("RELEVANT PROTOCOL INFO") {
                Ok("grounded answer".into())
            } else {
                Ok("general answer".into())
            }
        }

        fn model(&self) -> &str {
            "echo"
        }
    }

    fn store() -> ProtocolStore {
        ProtocolStore::from_entries(vec![
            ProtocolEntry::new("ACDF", "Neck brace", "collar", "Wear it six weeks."),
            ProtocolEntry::new("Lumbar Fusion", "Driving", "car", "Two weeks."),
        ])
        .unwrap()
    }

    fn run(script: &str) -> (String, usize, usize) {
        let store = store();
        let llm = EchoLlm {
            calls: RefCell::new(0),
        };
        let log = SqliteReviewLog::open_in_memory().unwrap();
        let assistant = PatientAssistant::new(&llm, &log);
        let mut out = Vec::new();
        run_chat(Cursor::new(script.to_string()), &mut out, &store, &assistant).unwrap();
        let calls = *llm.calls.borrow();
        (String::from_utf8(out).unwrap(), calls, log.count().unwrap())
    }

    #[test]
    fn selection_by_number_then_grounded_answer() {
        let (out, calls, logged) = run("1\nneck brace\n/quit\n");
        assert!(out.contains("1. ACDF"));
        assert!(out.contains("2. Lumbar Fusion"));
        assert!(out.contains("Protocol for ACDF is loaded. How can I help you?"));
        assert!(out.contains("grounded answer"));
        assert_eq!(calls, 1);
        assert_eq!(logged, 0);
    }

    #[test]
    fn unmatched_question_shows_review_notice() {
        let (out, _, logged) = run("lumbar fusion\ncan I fly\n");
        assert!(out.contains("Protocol for LUMBAR FUSION is loaded."));
        assert!(out.contains(REVIEW_NOTICE));
        assert!(out.contains("general answer"));
        assert_eq!(logged, 1);
    }

    #[test]
    fn invalid_selection_reprompts() {
        let (out, calls, _) = run("7\nKyphoplasty\n2\n");
        assert_eq!(out.matches(INVALID_SELECTION).count(), 2);
        assert!(out.contains("Protocol for LUMBAR FUSION is loaded."));
        assert_eq!(calls, 0);
    }

    #[test]
    fn reset_returns_to_surgery_selection() {
        let (out, calls, _) = run("1\n/reset\nneck brace\n2\ndriving car\n");
        // "neck brace" after reset is treated as an invalid menu choice, not a question
        assert!(out.contains(INVALID_SELECTION));
        assert_eq!(out.matches(WELCOME).count(), 3);
        assert_eq!(calls, 1);
    }

    #[test]
    fn blank_lines_produce_no_response() {
        let (_, calls, logged) = run("1\n\n   \n");
        assert_eq!(calls, 0);
        assert_eq!(logged, 0);
    }

    #[test]
    fn parse_selection_accepts_numbers_and_names() {
        let options = ["ACDF", "Lumbar Fusion"];
        assert_eq!(parse_selection("2", &options), Some("Lumbar Fusion"));
        assert_eq!(parse_selection(" acdf ", &options), Some("ACDF"));
        assert_eq!(parse_selection("0", &options), None);
        assert_eq!(parse_selection("3", &options), None);
        assert_eq!(parse_selection("fusion", &options), None);
    }
}
