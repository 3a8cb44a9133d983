//! Dify Review CLI
//!
//! Command-line front end that logs in to the Dify console, pulls the node
//! executions of one workflow run and prints the Label Studio comparison task
//! built from them. A saved node-execution document can be converted offline
//! with the `build` command.

pub mod cli;

pub use cli::{run, CliError, ExitCode, ReviewCli, ReviewCommands};
