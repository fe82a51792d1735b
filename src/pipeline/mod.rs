pub mod matching;
pub mod orchestrator;
pub mod prompt;
pub mod safety;
