//! Language-model collaborators.
//!
//! The assistant only needs "instruction text in, answer text out".
//! `LlmGenerate` is that seam; backends implement it over blocking HTTP.

pub mod groq;
pub mod ollama;

pub use groq::GroqClient;
pub use ollama::OllamaClient;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Cannot reach language model service at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Language model service returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),
}

/// Text completion over a single instruction string.
pub trait LlmGenerate {
    fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Model identifier, for logs.
    fn model(&self) -> &str;
}

impl<T: LlmGenerate + ?Sized> LlmGenerate for Box<T> {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        (**self).generate(prompt)
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}

/// Map a transport error from `reqwest` onto `LlmError`.
pub(crate) fn map_transport_error(e: reqwest::Error, base_url: &str, timeout_secs: u64) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout(timeout_secs)
    } else if e.is_connect() {
        LlmError::Connection(base_url.to_string())
    } else {
        LlmError::HttpClient(e.to_string())
    }
}

/// Build the blocking HTTP client shared by every backend.
pub(crate) fn build_http_client(timeout_secs: u64) -> Result<reqwest::blocking::Client, LlmError> {
    reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| LlmError::HttpClient(e.to_string()))
}

/// Read a non-2xx response into `LlmError::Status`.
pub(crate) fn status_error(response: reqwest::blocking::Response) -> LlmError {
    let status = response.status().as_u16();
    let body = response.text().unwrap_or_default();
    LlmError::Status { status, body }
}
