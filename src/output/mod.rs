//! Output module
//!
//! Writes records to local JSON-lines files.
//!
//! # Overview
//!
//! - `JsonlWriter` - Appends records per stream under a base directory
//! - `build_partitioned_dir` / `build_partitioned_path` - Hive-style
//!   `{stream}/dt={YYYY-MM-DD}` layout

mod paths;
mod writer;

pub use paths::{build_partitioned_dir, build_partitioned_path, sanitize_stream_name};
pub use writer::JsonlWriter;

#[cfg(test)]
mod tests;
