//! CLI module
//!
//! Command-line interface for running the connector.
//!
//! # Commands
//!
//! - `spec` - Print the configuration schema
//! - `check` - Test connection to the database
//! - `discover` - List available streams
//! - `read` - Extract data from streams

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
