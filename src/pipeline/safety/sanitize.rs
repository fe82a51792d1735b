//! Input hygiene for patient questions.
//!
//! `clean_patient_question` produces the question the matcher, the review
//! log and the message history see. `neutralize_injection` is applied only to
//! the copy embedded in a model prompt.

use std::sync::LazyLock;

use regex::Regex;

/// Clean a patient question.
///
/// Strips invisible Unicode and control characters (newline and tab survive),
/// trims surrounding whitespace, and truncates to `max_chars` characters at a
/// word boundary. Words are never rewritten.
pub fn clean_patient_question(raw: &str, max_chars: usize) -> String {
    let text = remove_control_characters(&remove_invisible_unicode(raw));
    let mut text = text.trim().to_string();
    if text.chars().count() > max_chars {
        text = truncate_at_word_boundary(&text, max_chars);
        tracing::debug!(max_chars, "Patient question truncated");
    }
    text
}

/// Replace prompt-injection phrases with `[FILTERED]`.
pub fn neutralize_injection(text: &str) -> String {
    static INJECTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
        [
            r"(?i)ignore\s+(?:previous|above|all\s+prior|the\s+above)\s+(?:instructions?|rules?|prompts?)",
            r"(?i)forget\s+(?:everything\s+(?:above|before)|(?:all|your)\s+(?:previous|prior)\s+(?:instructions?|rules?|prompts?))",
            r"(?i)new\s+instructions?:",
            r"(?i)you\s+are\s+now\s+(?:a|an)\s+",
            r"(?i)\bsystem\s*:",
            r"(?i)\bassistant\s*:",
            r"<<SYS>>",
            r"\[INST\]",
            r"<\|im_start\|>",
            r"<\|im_end\|>",
            r"(?i)(?:DAN|do\s+anything\s+now)\s+mode",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    });

    let mut result = text.to_string();
    for pattern in INJECTION_PATTERNS.iter() {
        result = pattern.replace_all(&result, "[FILTERED]").into_owned();
    }
    if result != text {
        tracing::debug!("Injection phrase filtered from prompt text");
    }
    result
}

fn remove_invisible_unicode(text: &str) -> String {
    text.chars()
        .filter(|c| {
            !matches!(
                *c,
                '\u{200B}'..='\u{200F}'
                | '\u{202A}'..='\u{202E}'
                | '\u{2060}'..='\u{2064}'
                | '\u{2066}'..='\u{2069}'
                | '\u{FEFF}'
                | '\u{00AD}'
                | '\u{034F}'
                | '\u{061C}'
                | '\u{180E}'
            )
        })
        .collect()
}

fn remove_control_characters(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Truncate to at most `max` characters, backing up to the last whitespace.
fn truncate_at_word_boundary(text: &str, max: usize) -> String {
    let end = text
        .char_indices()
        .nth(max)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    let truncated = &text[..end];
    match truncated.rfind(char::is_whitespace) {
        Some(pos) if pos > 0 => truncated[..pos].trim_end().to_string(),
        _ => truncated.to_string(),
    }
}
