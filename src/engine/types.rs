//! Engine types
//!
//! Message types, sync configuration and statistics.

use crate::types::{JsonObject, JsonValue, LogLevel};

/// A message emitted during sync
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// One flattened record
    Record {
        /// Stream name
        stream: String,
        /// Record fields
        data: JsonObject,
    },
    /// State update for a stream
    State {
        /// Stream name
        stream: String,
        /// Cursor mapping `{cursor_key: iso}`
        data: JsonObject,
    },
    /// Log message
    Log {
        /// Log level
        level: LogLevel,
        /// Log message
        message: String,
    },
    /// Outcome of one stream, sent once it has finished or failed
    StreamStatus {
        /// Stream name
        stream: String,
        /// Counters for the stream
        stats: SyncStats,
        /// Declared schema built from the records seen
        schema: JsonValue,
        /// Failure text, `None` on success
        error: Option<String>,
    },
}

impl Message {
    /// Create a record message
    pub fn record(stream: impl Into<String>, data: JsonObject) -> Self {
        Self::Record {
            stream: stream.into(),
            data,
        }
    }

    /// Create a state message
    pub fn state(stream: impl Into<String>, data: JsonObject) -> Self {
        Self::State {
            stream: stream.into(),
            data,
        }
    }

    /// Create a log message
    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        Self::Log {
            level,
            message: message.into(),
        }
    }

    /// Create an info log
    pub fn info(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Info, message)
    }

    /// Create a debug log
    pub fn debug(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Debug, message)
    }

    /// Create a warning log
    pub fn warn(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Warn, message)
    }

    /// Create an error log
    pub fn error(message: impl Into<String>) -> Self {
        Self::log(LogLevel::Error, message)
    }

    /// Create a stream status message
    pub fn stream_status(
        stream: impl Into<String>,
        stats: SyncStats,
        schema: JsonValue,
        error: Option<String>,
    ) -> Self {
        Self::StreamStatus {
            stream: stream.into(),
            stats,
            schema,
            error,
        }
    }

    /// Check if this is a record message
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }

    /// Check if this is a state message
    pub fn is_state(&self) -> bool {
        matches!(self, Self::State { .. })
    }

    /// Check if this is a log message
    pub fn is_log(&self) -> bool {
        matches!(self, Self::Log { .. })
    }
}

/// Configuration for a sync run
#[derive(Debug, Clone, Default)]
pub struct SyncConfig {
    /// Maximum records per stream (0 = unlimited)
    pub max_records: usize,
}

impl SyncConfig {
    /// Create a new sync config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max records per stream
    #[must_use]
    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = max;
        self
    }
}

/// Statistics from a sync operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Total records emitted
    pub records_synced: usize,
    /// Total page fetches, including the final empty page
    pub pages_fetched: usize,
    /// Streams drained to completion
    pub streams_synced: usize,
    /// Streams that failed
    pub errors: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add records
    pub fn add_records(&mut self, count: usize) {
        self.records_synced += count;
    }

    /// Add a page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Add a stream
    pub fn add_stream(&mut self) {
        self.streams_synced += 1;
    }

    /// Add an error
    pub fn add_error(&mut self) {
        self.errors += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }

    /// Fold another run's counters into this one
    pub fn merge(&mut self, other: &SyncStats) {
        self.records_synced += other.records_synced;
        self.pages_fetched += other.pages_fetched;
        self.streams_synced += other.streams_synced;
        self.errors += other.errors;
    }
}
