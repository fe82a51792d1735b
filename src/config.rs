use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::llm::groq::{DEFAULT_GROQ_MODEL, DEFAULT_GROQ_URL};
use crate::llm::ollama::{DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL};
use crate::llm::{GroqClient, LlmError, LlmGenerate, OllamaClient};
use crate::pipeline::orchestrator::DEFAULT_MAX_QUESTION_CHARS;

/// Application-level constants
pub const APP_NAME: &str = "SDG Spine Surgery Patient Assistant";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_PROTOCOL_FILE: &str = "combined_protocols.csv";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Per-user data directory (review log lives here unless overridden).
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("spine-assist")
}

pub fn default_review_log_path() -> PathBuf {
    app_data_dir().join("review_log.db")
}

/// Tracing filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "spine_assist_lib=info,warn"
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("GROQ_API_KEY is not set; it is required for the groq backend")]
    MissingApiKey,

    #[error("Timeout must be at least 1 second")]
    InvalidTimeout,

    #[error("Maximum question length must be at least 1 character")]
    InvalidMaxQuestionChars,
}

/// Which language model service answers questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Backend {
    /// Groq hosted chat completions
    Groq,
    /// Local Ollama instance
    Ollama,
}

// ═══════════════════════════════════════════
// CLI Arguments
// ═══════════════════════════════════════════

#[derive(Parser, Debug, Clone)]
#[command(name = "spine-assist")]
#[command(about = "Patient question assistant grounded in spine surgery protocols")]
#[command(version)]
pub struct CliArgs {
    /// CSV file with SurgeryType, Question, Alternate_Questions, Answer columns
    #[arg(long, env = "SPINE_ASSIST_PROTOCOLS", default_value = DEFAULT_PROTOCOL_FILE)]
    pub protocols: PathBuf,

    /// SQLite file receiving unanswered questions (default: per-user data dir)
    #[arg(long, env = "SPINE_ASSIST_REVIEW_LOG")]
    pub review_log: Option<PathBuf>,

    /// Do not log unanswered questions
    #[arg(long)]
    pub no_review_log: bool,

    /// Language model backend
    #[arg(long, value_enum, env = "SPINE_ASSIST_BACKEND", default_value = "groq")]
    pub backend: Backend,

    /// Model name (default depends on backend)
    #[arg(long, env = "SPINE_ASSIST_MODEL")]
    pub model: Option<String>,

    /// Groq OpenAI-compatible API base URL
    #[arg(long, env = "GROQ_BASE_URL", default_value = DEFAULT_GROQ_URL)]
    pub groq_url: String,

    /// Groq API key
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub groq_api_key: Option<String>,

    /// Ollama base URL
    #[arg(long, env = "OLLAMA_HOST", default_value = DEFAULT_OLLAMA_URL)]
    pub ollama_url: String,

    /// Model request timeout in seconds
    #[arg(long, env = "SPINE_ASSIST_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Longer questions are truncated at a word boundary
    #[arg(long, default_value_t = DEFAULT_MAX_QUESTION_CHARS)]
    pub max_question_chars: usize,
}

// ═══════════════════════════════════════════
// Validated configuration
// ═══════════════════════════════════════════

#[derive(Clone, PartialEq, Eq)]
pub enum LlmConfig {
    Groq {
        base_url: String,
        api_key: String,
        model: String,
        timeout_secs: u64,
    },
    Ollama {
        base_url: String,
        model: String,
        timeout_secs: u64,
    },
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Groq {
                base_url,
                model,
                timeout_secs,
                ..
            } => f
                .debug_struct("Groq")
                .field("base_url", base_url)
                .field("api_key", &"<redacted>")
                .field("model", model)
                .field("timeout_secs", timeout_secs)
                .finish(),
            Self::Ollama {
                base_url,
                model,
                timeout_secs,
            } => f
                .debug_struct("Ollama")
                .field("base_url", base_url)
                .field("model", model)
                .field("timeout_secs", timeout_secs)
                .finish(),
        }
    }
}

impl LlmConfig {
    /// Build the configured client.
    pub fn build_client(&self) -> Result<Box<dyn LlmGenerate>, LlmError> {
        let client: Box<dyn LlmGenerate> = match self {
            Self::Groq {
                base_url,
                api_key,
                model,
                timeout_secs,
            } => Box::new(GroqClient::new(base_url, api_key, model, *timeout_secs)?),
            Self::Ollama {
                base_url,
                model,
                timeout_secs,
            } => Box::new(OllamaClient::new(base_url, model, *timeout_secs)?),
        };
        Ok(client)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantConfig {
    pub protocol_path: PathBuf,
    /// `None` when review logging is disabled.
    pub review_log_path: Option<PathBuf>,
    pub llm: LlmConfig,
    pub max_question_chars: usize,
}

impl AssistantConfig {
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        if args.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }
        if args.max_question_chars == 0 {
            return Err(ConfigError::InvalidMaxQuestionChars);
        }

        let model = args.model.filter(|m| !m.trim().is_empty());
        let llm = match args.backend {
            Backend::Groq => {
                let api_key = args
                    .groq_api_key
                    .filter(|k| !k.trim().is_empty())
                    .ok_or(ConfigError::MissingApiKey)?;
                LlmConfig::Groq {
                    base_url: args.groq_url,
                    api_key,
                    model: model.unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string()),
                    timeout_secs: args.timeout_secs,
                }
            }
            Backend::Ollama => LlmConfig::Ollama {
                base_url: args.ollama_url,
                model: model.unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
                timeout_secs: args.timeout_secs,
            },
        };

        let review_log_path = if args.no_review_log {
            None
        } else {
            Some(args.review_log.unwrap_or_else(default_review_log_path))
        };

        Ok(Self {
            protocol_path: args.protocols,
            review_log_path,
            llm,
            max_question_chars: args.max_question_chars,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["spine-assist"];
        argv.extend_from_slice(extra);
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn groq_backend_requires_api_key() {
        let mut cli = args(&["--backend", "groq"]);
        cli.groq_api_key = None;
        assert_eq!(
            AssistantConfig::from_args(cli).unwrap_err(),
            ConfigError::MissingApiKey
        );
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let cli = args(&["--backend", "groq", "--groq-api-key", "   "]);
        assert_eq!(
            AssistantConfig::from_args(cli).unwrap_err(),
            ConfigError::MissingApiKey
        );
    }

    #[test]
    fn groq_defaults_to_llama3_8b() {
        let cli = args(&["--backend", "groq", "--groq-api-key", "gsk_test"]);
        let config = AssistantConfig::from_args(cli).unwrap();
        match config.llm {
            LlmConfig::Groq { model, api_key, .. } => {
                assert_eq!(model, "llama3-8b-8192");
                assert_eq!(api_key, "gsk_test");
            }
            other => panic!("unexpected backend: {other:?}"),
        }
    }

    #[test]
    fn ollama_needs_no_credentials() {
        let cli = args(&["--backend", "ollama", "--model", "llama3.1"]);
        let config = AssistantConfig::from_args(cli).unwrap();
        assert_eq!(
            config.llm,
            LlmConfig::Ollama {
                base_url: cli_default_ollama(),
                model: "llama3.1".into(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            }
        );
    }

    fn cli_default_ollama() -> String {
        args(&[]).ollama_url
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let cli = args(&["--backend", "ollama", "--timeout-secs", "0"]);
        assert_eq!(
            AssistantConfig::from_args(cli).unwrap_err(),
            ConfigError::InvalidTimeout
        );
    }

    #[test]
    fn review_log_can_be_disabled_or_redirected() {
        let cli = args(&["--backend", "ollama", "--no-review-log"]);
        assert!(AssistantConfig::from_args(cli).unwrap().review_log_path.is_none());

        let cli = args(&["--backend", "ollama", "--review-log", "/tmp/review.db"]);
        assert_eq!(
            AssistantConfig::from_args(cli).unwrap().review_log_path,
            Some(PathBuf::from("/tmp/review.db"))
        );
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let llm = LlmConfig::Groq {
            base_url: DEFAULT_GROQ_URL.into(),
            api_key: "gsk_secret".into(),
            model: DEFAULT_GROQ_MODEL.into(),
            timeout_secs: 5,
        };
        let debug = format!("{llm:?}");
        assert!(!debug.contains("gsk_secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn review_log_defaults_under_app_data_dir() {
        assert!(default_review_log_path().starts_with(app_data_dir()));
        assert!(default_review_log_path().ends_with("review_log.db"));
    }
}
