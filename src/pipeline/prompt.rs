//! Instruction templates sent to the language model.
//!
//! The grounded and general templates carry different safety guarantees:
//! grounded answers may only restate protocol text, general answers must end
//! with the disclaimer. Each function builds exactly one of them.

use crate::models::ProtocolEntry;

pub const PRACTICE_NAME: &str = "OrthoIndy";

/// Appended verbatim to every general-knowledge answer.
pub const GENERAL_DISCLAIMER: &str = "*Disclaimer: This is general medical information and not a substitute for direct medical advice regarding your specific condition. This information is not part of Dr. [Your Name]'s official protocol. For any questions about your personal care plan, please contact the OrthoIndy office directly.*";

const PROTOCOL_INFO_START: &str = "--- RELEVANT PROTOCOL INFO ---";
const PROTOCOL_INFO_END: &str = "--- END OF PROTOCOL INFO ---";

/// Prompt that restricts the model to the matched protocol entry.
pub fn grounded_prompt(question: &str, entry: &ProtocolEntry) -> String {
    format!(
        "You are a helpful, polite, and safe AI assistant for the {PRACTICE_NAME} spine surgery practice. \
Your role is to answer patient questions about their upcoming surgery. \
You must adhere to the following rules STRICTLY:\n\
1. Base your answer ONLY on the information provided in the 'RELEVANT PROTOCOL INFO' section.\n\
2. Do NOT use any of your general medical knowledge.\n\
3. Begin your answer in a friendly and reassuring tone.\n\
\n\
PATIENT QUESTION: \"{question}\"\n\
{context}\n\
Please provide your answer now.",
        context = protocol_context(entry),
    )
}

/// Prompt for questions no protocol entry covers. Requires the disclaimer.
pub fn general_prompt(question: &str) -> String {
    format!(
        "You are a helpful AI assistant with deep medical knowledge. \
A patient from the {PRACTICE_NAME} spine surgery practice has asked a general medical question \
that is not covered by their surgeon's specific post-operative protocols. \
Your task is to answer the following question clearly and accurately for a patient.\n\
CRITICAL RULE: After providing your answer, you MUST include the following disclaimer verbatim \
(exactly as written) at the end of your response, separated by a line.\n\
---\n\
{GENERAL_DISCLAIMER}\n\
\n\
PATIENT QUESTION: \"{question}\"\n\
Please provide your answer now, followed by the mandatory disclaimer."
    )
}

fn protocol_context(entry: &ProtocolEntry) -> String {
    format!(
        "{PROTOCOL_INFO_START}\nQuestion: {}\nAnswer: {}\n{PROTOCOL_INFO_END}\n",
        entry.question(),
        entry.answer(),
    )
}
