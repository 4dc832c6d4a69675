//! Incremental cursor tracking

use crate::error::{Error, Result};
use crate::pagination::Record;
use crate::types::{JsonObject, JsonValue};
use crate::value::{format_timestamp, parse_timestamp, Timestamp};
use tracing::debug;

/// High-water mark of one stream's cursor field
///
/// The tracked value only moves forward while records are observed; it is
/// replaced wholesale only by [`CursorTracker::set_state`].
#[derive(Debug, Clone, PartialEq)]
pub struct CursorTracker {
    cursor_key: Option<String>,
    value: Option<Timestamp>,
    start_date: Option<Timestamp>,
}

impl CursorTracker {
    /// Create a tracker seeded from the configured start date
    pub fn new(cursor_key: Option<String>, start_date: Option<Timestamp>) -> Self {
        Self {
            cursor_key,
            value: start_date,
            start_date,
        }
    }

    /// Cursor field, if any
    pub fn cursor_key(&self) -> Option<&str> {
        self.cursor_key.as_deref()
    }

    /// Current watermark
    pub fn value(&self) -> Option<Timestamp> {
        self.value
    }

    /// Advance the watermark to `max(current, candidate)`
    ///
    /// Returns whether the watermark moved.
    pub fn observe(&mut self, candidate: Timestamp) -> bool {
        match self.value {
            Some(current) if current >= candidate => false,
            _ => {
                self.value = Some(candidate);
                true
            }
        }
    }

    /// Advance the watermark from an emitted record
    ///
    /// Records without a timestamp in the cursor field leave it unchanged.
    pub fn observe_record(&mut self, record: &Record) -> bool {
        let Some(key) = self.cursor_key.as_deref() else {
            return false;
        };
        match record.cursor_value(key) {
            Some(ts) => self.observe(ts),
            None => {
                debug!("Record {} has no timestamp in '{}'", record.name, key);
                false
            }
        }
    }

    /// Export as `{cursor_key: iso}`, or an empty mapping
    pub fn get_state(&self) -> JsonObject {
        let mut state = JsonObject::new();
        if let (Some(key), Some(value)) = (&self.cursor_key, &self.value) {
            state.insert(key.clone(), JsonValue::String(format_timestamp(value)));
        }
        state
    }

    /// Restore from persisted state
    ///
    /// Adopts the persisted value under the cursor key when present,
    /// otherwise falls back to the start date, otherwise clears the value.
    /// A persisted value that is not a timestamp string is rejected.
    pub fn set_state(&mut self, persisted: &JsonObject) -> Result<()> {
        let Some(key) = self.cursor_key.as_deref() else {
            self.value = self.start_date;
            return Ok(());
        };

        self.value = match persisted.get(key) {
            Some(JsonValue::String(text)) => Some(parse_timestamp(text)?),
            Some(other) => {
                return Err(Error::state(format!(
                    "cursor '{key}' must be a timestamp string, got {other}"
                )))
            }
            None => self.start_date,
        };
        Ok(())
    }
}
