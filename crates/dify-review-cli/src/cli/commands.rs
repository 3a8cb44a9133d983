//! CLI command definitions for the review-task tool

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};
use dify_session::config::{DEFAULT_BASE_URL, DEFAULT_LANGUAGE};
use dify_session::{ClientConfig, ClientError, Credentials, DifyClient};
use dify_trace::ReviewTask;
use serde_json::Value;
use tracing::{debug, info};

use super::output::{self, RenderOptions};
use super::CliError;

/// Dify review-task CLI
///
/// Build Label Studio comparison tasks from Dify workflow runs.
#[derive(Parser, Debug)]
#[command(name = "dify-review")]
#[command(about = "Build Label Studio comparison tasks from Dify workflow runs", long_about = None)]
#[command(version)]
pub struct ReviewCli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Write the document to this file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: ReviewCommands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum ReviewCommands {
    /// Log in, fetch a workflow run's node executions and build its task
    Fetch(FetchArgs),

    /// Build a task from a saved node-execution document (JSON or YAML)
    Build(BuildArgs),
}

/// Arguments of `fetch`
#[derive(Args)]
pub struct FetchArgs {
    /// Console base URL
    #[arg(long, env = "DIFY_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Language reported at login
    #[arg(long, env = "DIFY_LANGUAGE", default_value = DEFAULT_LANGUAGE)]
    pub language: String,

    /// `remember_me` flag reported at login
    #[arg(long, env = "DIFY_REMEMBER_ME", default_value_t = true, action = ArgAction::Set)]
    pub remember_me: bool,

    /// Request timeout in milliseconds
    #[arg(long, env = "DIFY_TIMEOUT_MS", default_value_t = 30_000)]
    pub timeout_ms: u64,

    /// Console account email
    #[arg(long, env = "DIFY_EMAIL")]
    pub email: Option<String>,

    /// Console account password
    #[arg(long, env = "DIFY_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Application id
    #[arg(long)]
    pub app_id: String,

    /// Workflow run id
    #[arg(long)]
    pub run_id: String,

    #[command(flatten)]
    pub render: RenderOptions,
}

impl FetchArgs {
    /// Client configuration from the connection flags
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.base_url)
            .with_language(&self.language)
            .with_remember_me(self.remember_me)
            .with_timeout(Duration::from_millis(self.timeout_ms))
    }

    /// Login credentials; both values must be present and non-empty
    pub fn credentials(&self) -> Result<Credentials, ClientError> {
        let email = non_empty(self.email.as_deref())
            .ok_or_else(|| ClientError::configuration("email is required (--email or DIFY_EMAIL)"))?;
        let password = non_empty(self.password.as_deref()).ok_or_else(|| {
            ClientError::configuration("password is required (--password or DIFY_PASSWORD)")
        })?;
        Ok(Credentials::new(email, password))
    }
}

impl fmt::Debug for FetchArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchArgs")
            .field("base_url", &self.base_url)
            .field("language", &self.language)
            .field("remember_me", &self.remember_me)
            .field("timeout_ms", &self.timeout_ms)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("app_id", &self.app_id)
            .field("run_id", &self.run_id)
            .field("render", &self.render)
            .finish()
    }
}

/// Arguments of `build`
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Node-execution document; `.yaml`/`.yml` files are read as YAML
    #[arg(short, long)]
    pub file: PathBuf,

    #[command(flatten)]
    pub render: RenderOptions,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Execute `fetch`
pub async fn execute_fetch(args: FetchArgs) -> Result<String, CliError> {
    let credentials = args.credentials()?;
    let client = DifyClient::new(args.client_config())?;

    client.login(&credentials).await?;

    info!(app_id = %args.app_id, run_id = %args.run_id, "Fetching node executions");
    let document = client.node_executions(&args.app_id, &args.run_id).await?;

    let task = ReviewTask::from_document(&document)?;
    info!(items = task.items.len(), "Review task built");

    output::render(&task, &args.render)
}

/// Execute `build`
pub fn execute_build(args: BuildArgs) -> Result<String, CliError> {
    let document = load_document(&args.file)?;

    let task = ReviewTask::from_document(&document)?;
    info!(file = %args.file.display(), items = task.items.len(), "Review task built");

    output::render(&task, &args.render)
}

fn load_document(path: &Path) -> Result<Value, CliError> {
    let display = path.display().to_string();

    let content = std::fs::read_to_string(path).map_err(|e| CliError::File {
        path: display.clone(),
        message: e.to_string(),
    })?;

    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    );
    debug!(file = %path.display(), yaml = is_yaml, bytes = content.len(), "Loaded document");

    if is_yaml {
        serde_yaml::from_str(&content).map_err(|e| CliError::Parse {
            path: display,
            message: e.to_string(),
        })
    } else {
        serde_json::from_str(&content).map_err(|e| CliError::Parse {
            path: display,
            message: e.to_string(),
        })
    }
}
