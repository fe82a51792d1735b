pub mod sanitize;

pub use sanitize::{clean_patient_question, neutralize_injection};
