//! CLI module for the review-task tool
//!
//! `fetch` talks to the console API, `build` works on a saved document. Both
//! end in the same rendering step.

pub mod commands;
pub mod output;

pub use commands::{BuildArgs, FetchArgs, ReviewCli, ReviewCommands};
pub use output::{OutputFormat, RenderOptions};

use dify_session::ClientError;
use dify_trace::TraceError;
use thiserror::Error;

/// Errors surfaced by CLI commands
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error("Failed to read {path}: {message}")]
    File { path: String, message: String },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Failed to write output: {0}")]
    Output(String),
}

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Task document produced
    Success = 0,
    /// Login rejected, session expired or credentials missing
    AuthenticationError = 2,
    /// Backend request failed
    RequestError = 3,
    /// Node-execution document has the wrong shape
    InvalidInput = 4,
    /// Input file missing, unreadable or unparsable
    FileError = 5,
    /// Anything else
    InternalError = 10,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    /// Exit code for a failed command
    pub fn from_error(err: &CliError) -> Self {
        match err {
            CliError::Client(ClientError::Configuration(_)) => ExitCode::AuthenticationError,
            CliError::Client(e) if e.requires_login() => ExitCode::AuthenticationError,
            CliError::Client(ClientError::MalformedToken(_)) => ExitCode::AuthenticationError,
            CliError::Client(_) => ExitCode::RequestError,
            CliError::Trace(TraceError::Serialization(_)) => ExitCode::InternalError,
            CliError::Trace(_) => ExitCode::InvalidInput,
            CliError::File { .. } | CliError::Parse { .. } => ExitCode::FileError,
            CliError::Output(_) => ExitCode::InternalError,
        }
    }
}

/// Run the CLI and return the rendered document
pub async fn run(cli: ReviewCli) -> Result<String, CliError> {
    match cli.command {
        ReviewCommands::Fetch(args) => commands::execute_fetch(args).await,
        ReviewCommands::Build(args) => commands::execute_build(args),
    }
}
