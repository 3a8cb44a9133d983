//! Dify review-task CLI entry point
//!
//! The document goes to stdout (or `--output`); logs go to stderr as JSON.

use clap::Parser;
use dify_review_cli::cli::output::write_output;
use dify_review_cli::{run, ExitCode, ReviewCli};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = ReviewCli::parse();

    // Initialize tracing
    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    let output = cli.output.clone();

    match run(cli).await {
        Ok(document) => {
            write_output(output.as_deref(), &document)?;
            Ok(())
        }
        Err(err) => {
            let code = ExitCode::from_error(&err);
            tracing::error!(error = %err, exit_code = i32::from(code), "Command failed");
            eprintln!("Error: {}", err);
            std::process::exit(code.into());
        }
    }
}
