//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Firestore source connector
#[derive(Parser, Debug)]
#[command(name = "firestore-source")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON or YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline config JSON (takes precedence over --config)
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// State file (JSON)
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Inline state JSON
    #[arg(long, global = true)]
    pub state_json: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show connector specification
    Spec,

    /// Test connection to the database
    Check,

    /// Discover available streams
    Discover,

    /// Read data from streams
    Read {
        /// Configured catalog file (JSON); discovered when absent
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Streams to sync (comma-separated, empty = all)
        #[arg(long)]
        streams: Option<String>,

        /// Output directory for JSON-lines files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Maximum records per stream
        #[arg(long)]
        max_records: Option<usize>,
    },
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
