//! Execution engine module
//!
//! The per-collection read loop.
//!
//! # Overview
//!
//! The engine module provides:
//! - `CollectionStream` - Drains one collection page by page, emitting
//!   records one at a time and advancing its cursor tracker after each
//! - `SyncConfig` / `SyncStats` - Run limits and counters
//! - Message types for output (Record, State, Log)

mod types;

pub use types::{Message, SyncConfig, SyncStats};

use crate::error::Result;
use crate::pagination::{PageFetcher, PageRequest, Record};
use crate::schema::{JsonSchema, SchemaBuilder};
use crate::state::CursorTracker;
use crate::types::JsonObject;
use crate::value::infer_schema;
use std::time::Instant;
use tracing::{debug, info};

/// One collection being read as a stream
#[derive(Debug, Clone)]
pub struct CollectionStream {
    /// Stream name
    name: String,
    /// Collection id queried
    collection: String,
    /// Cursor watermark
    tracker: CursorTracker,
    /// Field schemas seen so far
    schema: SchemaBuilder,
    /// Limits for the run
    config: SyncConfig,
}

impl CollectionStream {
    /// Create a stream over `collection`
    pub fn new(name: impl Into<String>, collection: impl Into<String>, tracker: CursorTracker) -> Self {
        Self {
            name: name.into(),
            collection: collection.into(),
            tracker,
            schema: SchemaBuilder::new(),
            config: SyncConfig::default(),
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Stream name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Collection id
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Cursor tracker
    pub fn tracker(&self) -> &CursorTracker {
        &self.tracker
    }

    /// Accumulated field schemas
    pub fn schema(&self) -> &SchemaBuilder {
        &self.schema
    }

    /// Declared schema given the fields observed so far
    pub fn json_schema(&self) -> JsonSchema {
        self.schema.stream_schema(self.tracker.cursor_key())
    }

    /// Current cursor state
    pub fn get_state(&self) -> JsonObject {
        self.tracker.get_state()
    }

    /// Drain the collection
    ///
    /// Pages are requested until one comes back empty, or until the last
    /// record of a page leaves no position to continue from. Every record is
    /// handed to `emit` as soon as its page is decoded; the cursor tracker
    /// is advanced after each successful emit. The query filter stays on
    /// the watermark held when the drain started, while the page token
    /// moves the query forward.
    pub async fn drain<F>(&mut self, fetcher: &dyn PageFetcher, mut emit: F) -> Result<SyncStats>
    where
        F: FnMut(&Record) -> Result<()> + Send,
    {
        let start = Instant::now();
        let mut stats = SyncStats::new();
        let watermark = self.tracker.value();
        let mut token = None;

        info!(
            "Reading {} (collection {}, cursor {:?}, from {:?})",
            self.name,
            self.collection,
            self.tracker.cursor_key(),
            watermark
        );

        'pages: loop {
            let request = PageRequest::new(&self.collection)
                .with_cursor_key(self.tracker.cursor_key().map(str::to_string))
                .with_last_cursor_value(watermark)
                .with_token(token.take());

            let page = fetcher.fetch_page(&request).await?;
            stats.add_page();
            debug!(
                "{}: page {} returned {} records",
                self.name,
                stats.pages_fetched,
                page.records.len()
            );

            for record in &page.records {
                self.observe_schema(record);
                emit(record)?;
                self.tracker.observe_record(record);
                stats.add_records(1);

                if self.config.max_records > 0 && stats.records_synced >= self.config.max_records {
                    info!("{}: reached max records ({})", self.name, self.config.max_records);
                    break 'pages;
                }
            }

            match page.next_token {
                Some(next) => token = Some(next),
                None => break,
            }
        }

        stats.add_stream();
        stats.set_duration(start.elapsed().as_millis() as u64);
        info!(
            "Completed {}: {} records in {} pages",
            self.name, stats.records_synced, stats.pages_fetched
        );
        Ok(stats)
    }

    fn observe_schema(&mut self, record: &Record) {
        for (field, value) in &record.fields {
            self.schema.observe(field, infer_schema(value));
        }
    }
}
