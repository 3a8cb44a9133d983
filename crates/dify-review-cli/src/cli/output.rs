//! Output rendering for the review-task CLI
//!
//! The document is either the bare task or the `{"data": ...}` envelope the
//! labeling tool imports, compact or pretty-printed.

use std::path::Path;

use clap::{Args, ValueEnum};
use dify_trace::ReviewTask;

use super::CliError;

/// Shape of the printed document
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug, Default)]
pub enum OutputFormat {
    /// `{task, prompt, items}`
    #[default]
    Task,
    /// `{"data": "<task JSON>"}` for direct import
    Envelope,
}

/// Rendering flags shared by every command
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Document shape
    #[arg(long, value_enum, default_value = "task")]
    pub format: OutputFormat,

    /// Pretty-print the outer document
    #[arg(long)]
    pub pretty: bool,
}

/// Render a task according to the options
pub fn render(task: &ReviewTask, options: &RenderOptions) -> Result<String, CliError> {
    let rendered = match (options.format, options.pretty) {
        (OutputFormat::Task, false) => task.to_json()?,
        (OutputFormat::Task, true) => serde_json::to_string_pretty(task)
            .map_err(|e| CliError::Output(e.to_string()))?,
        (OutputFormat::Envelope, false) => serde_json::to_string(&task.envelope()?)
            .map_err(|e| CliError::Output(e.to_string()))?,
        (OutputFormat::Envelope, true) => serde_json::to_string_pretty(&task.envelope()?)
            .map_err(|e| CliError::Output(e.to_string()))?,
    };
    Ok(rendered)
}

/// Write the document to a file, or stdout when no path is given
pub fn write_output(path: Option<&Path>, document: &str) -> Result<(), CliError> {
    match path {
        Some(path) => std::fs::write(path, format!("{}\n", document))
            .map_err(|e| CliError::Output(format!("{}: {}", path.display(), e))),
        None => {
            println!("{}", document);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn task() -> ReviewTask {
        ReviewTask::from_document(&json!([
            { "node_type": "start", "inputs": { "sys.query": "Q" } },
            { "node_type": "llm", "title": "A", "process_data": { "model_name": "m" }, "outputs": { "text": "hi" } },
        ]))
        .unwrap()
    }

    #[test]
    fn test_task_format() {
        let rendered = render(&task(), &RenderOptions::default()).unwrap();
        assert_eq!(rendered, task().to_json().unwrap());
        assert!(!rendered.contains('\n'));
    }

    #[test]
    fn test_envelope_format() {
        let options = RenderOptions {
            format: OutputFormat::Envelope,
            pretty: false,
        };
        let rendered = render(&task(), &options).unwrap();

        let envelope: Value = serde_json::from_str(&rendered).unwrap();
        let data = envelope["data"].as_str().unwrap();
        assert_eq!(data, task().to_json().unwrap());
    }

    #[test]
    fn test_pretty_keeps_content() {
        let options = RenderOptions {
            format: OutputFormat::Task,
            pretty: true,
        };
        let rendered = render(&task(), &options).unwrap();

        assert!(rendered.contains("\n  \"prompt\": \"Q\""));
        let parsed: ReviewTask = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, task());
    }
}
