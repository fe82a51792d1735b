use serde::{Deserialize, Serialize};

use super::{build_http_client, map_transport_error, status_error, LlmError, LlmGenerate};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";

/// Ollama HTTP client for local LLM inference.
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, LlmError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client: build_http_client(timeout_secs)?,
            timeout_secs,
        })
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl LlmGenerate for OllamaClient {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| map_transport_error(e, &self.base_url, self.timeout_secs))?;

        if !response.status().is_success() {
            return Err(status_error(response));
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .map_err(|e| LlmError::ResponseParsing(e.to_string()))?;

        Ok(parsed.response)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_trims_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", "llama3", 60).unwrap();
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.model(), "llama3");
        assert_eq!(client.timeout_secs, 60);
    }

    #[test]
    fn request_body_disables_streaming() {
        let body = OllamaGenerateRequest {
            model: "llama3",
            prompt: "hello",
            stream: false,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "llama3");
        assert_eq!(json["prompt"], "hello");
        assert_eq!(json["stream"], false);
    }

    #[test]
    fn generate_response_parses() {
        let parsed: OllamaGenerateResponse =
            serde_json::from_str(r#"{"model":"llama3","response":"Hi there","done":true}"#).unwrap();
        assert_eq!(parsed.response, "Hi there");
    }

    #[test]
    fn silent_server_maps_to_timeout() {
        // Accepted by the kernel backlog, never answered
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let client = OllamaClient::new(&url, "llama3", 1).unwrap();

        let err = client.generate("hello").unwrap_err();
        assert!(matches!(err, LlmError::Timeout(1)), "got {err:?}");
        assert_eq!(err.to_string(), "Request timed out after 1s");
        drop(listener);
    }

    #[test]
    fn unreachable_server_is_an_error_not_a_panic() {
        let client = OllamaClient::new("http://127.0.0.1:9", "llama3", 2).unwrap();
        let err = client.generate("hello").unwrap_err();
        assert!(matches!(
            err,
            LlmError::Connection(_) | LlmError::Timeout(_) | LlmError::HttpClient(_)
        ));
    }
}
