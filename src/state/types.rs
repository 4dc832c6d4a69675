//! State types for tracking sync progress
//!
//! These types are serialized to JSON and persisted between runs.

use crate::types::JsonObject;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete state for the connector
///
/// Each stream maps to the cursor mapping its tracker exported,
/// `{cursor_key: iso}` or empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Per-stream state
    #[serde(default)]
    pub streams: BTreeMap<String, JsonObject>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get state for a stream
    pub fn get_stream(&self, stream: &str) -> Option<&JsonObject> {
        self.streams.get(stream)
    }

    /// Replace the state of a stream
    pub fn set_stream(&mut self, stream: &str, state: JsonObject) {
        self.streams.insert(stream.to_string(), state);
    }
}

#[cfg(test)]
mod type_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_default() {
        let state = State::new();
        assert!(state.streams.is_empty());
        assert!(state.get_stream("orders").is_none());
    }

    #[test]
    fn test_state_serialization() {
        let mut stream = JsonObject::new();
        stream.insert("updated_at".into(), json!("2024-01-03T00:00:00+00:00"));
        let mut state = State::new();
        state.set_stream("orders", stream);

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(
            value,
            json!({"streams": {"orders": {"updated_at": "2024-01-03T00:00:00+00:00"}}})
        );

        let restored: State = serde_json::from_value(value).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_state_missing_streams_key() {
        let state: State = serde_json::from_str("{}").unwrap();
        assert!(state.streams.is_empty());
    }
}
