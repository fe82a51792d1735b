pub mod chat;
pub mod config;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod protocol;
pub mod review_log;
pub mod session;

use std::process::ExitCode;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use config::{AssistantConfig, CliArgs, ConfigError};
use llm::LlmError;
use pipeline::orchestrator::PatientAssistant;
use protocol::{ProtocolError, ProtocolStore};
use review_log::{DisabledReviewLog, ReviewLog, SqliteReviewLog};

/// Failures that stop the assistant before the first question.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Protocol data could not be loaded: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Language model client could not be created: {0}")]
    Llm(#[from] LlmError),

    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shown to the patient when the protocol file cannot be used.
pub const PROTOCOL_UNAVAILABLE: &str =
    "Protocol data could not be loaded. The app cannot continue.";

/// Install the global tracing subscriber (stderr, `RUST_LOG` aware).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Open the configured review log. An unusable sink is reported and replaced
/// by the disabled sink; the assistant still answers questions without it.
fn open_review_log(config: &AssistantConfig) -> Box<dyn ReviewLog> {
    let Some(path) = &config.review_log_path else {
        tracing::warn!("Review logging disabled; unanswered questions will not be recorded");
        return Box::new(DisabledReviewLog);
    };

    match SqliteReviewLog::open(path) {
        Ok(log) => {
            tracing::info!(path = %path.display(), "Review log ready");
            Box::new(log)
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Review log unavailable");
            eprintln!("Review log connection failed. Unanswered questions will not be logged. Error: {e}");
            Box::new(DisabledReviewLog)
        }
    }
}

/// Load everything, then hand the terminal to the chat loop.
pub fn start(args: CliArgs) -> Result<(), StartupError> {
    let config = AssistantConfig::from_args(args)?;
    tracing::debug!(?config, "Configuration resolved");

    let store = ProtocolStore::load(&config.protocol_path).inspect_err(|_| {
        eprintln!("{PROTOCOL_UNAVAILABLE}");
    })?;

    let generator = config.llm.build_client()?;
    tracing::info!(model = %generator.model(), "Language model client ready");

    let review_log = open_review_log(&config);
    let assistant = PatientAssistant::new(&generator, &review_log)
        .with_max_question_chars(config.max_question_chars);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    chat::run_chat(stdin.lock(), &mut stdout, &store, &assistant)?;
    Ok(())
}

pub fn run(args: CliArgs) -> ExitCode {
    init_tracing();
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    match start(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
