//! Pagination types and traits

use crate::error::Result;
use crate::schema::NAME_FIELD;
use crate::types::{JsonObject, JsonValue};
use crate::value::{format_timestamp, NativeValue, Timestamp};
use async_trait::async_trait;
use serde_json::json;
use std::collections::BTreeMap;
use tracing::warn;

/// A decoded document
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Fully-qualified document path
    pub name: String,
    /// Resolved field values
    pub fields: BTreeMap<String, NativeValue>,
}

impl Record {
    /// Create a record with no fields
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a field
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: NativeValue) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Cursor position of this record, if the field holds a timestamp
    pub fn cursor_value(&self, cursor_key: &str) -> Option<Timestamp> {
        self.fields.get(cursor_key).and_then(NativeValue::as_timestamp)
    }

    /// Flattened output form
    ///
    /// Every field becomes a top-level key. The document path is written
    /// last under `name`, so a document field of the same name never
    /// replaces the primary key.
    pub fn to_json(&self) -> JsonObject {
        let mut object: JsonObject = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect();
        object.insert(NAME_FIELD.to_string(), JsonValue::String(self.name.clone()));
        object
    }
}

/// Position after which the next page starts
#[derive(Debug, Clone, PartialEq)]
pub enum PageToken {
    /// Cursor-field value of the last record
    Timestamp(Timestamp),
    /// Document path of the last record
    DocumentName(String),
}

impl PageToken {
    /// Derive the next token from a page of records
    ///
    /// `None` when the page is empty. Without a cursor field the last
    /// record's document name is used. With a cursor field the last
    /// record's timestamp is used; if that record has no usable timestamp
    /// the query cannot be positioned after it, so pagination stops there.
    pub fn after_last(records: &[Record], cursor_key: Option<&str>) -> Option<Self> {
        let last = records.last()?;
        let Some(key) = cursor_key else {
            return Some(PageToken::DocumentName(last.name.clone()));
        };
        match last.cursor_value(key) {
            Some(ts) => Some(PageToken::Timestamp(ts)),
            None => {
                warn!(
                    "Document {} has no timestamp in cursor field '{}', stopping pagination",
                    last.name, key
                );
                None
            }
        }
    }

    /// Tagged value used in a query's `startAt`
    pub fn to_value(&self) -> JsonValue {
        match self {
            PageToken::Timestamp(ts) => json!({ "timestampValue": format_timestamp(ts) }),
            PageToken::DocumentName(name) => json!({ "stringValue": name }),
        }
    }
}

/// Inputs of one page fetch
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    pub collection: String,
    pub cursor_key: Option<String>,
    pub last_cursor_value: Option<Timestamp>,
    pub token: Option<PageToken>,
}

impl PageRequest {
    /// First page of a collection
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            ..Self::default()
        }
    }

    /// Set the cursor field
    #[must_use]
    pub fn with_cursor_key(mut self, key: Option<String>) -> Self {
        self.cursor_key = key;
        self
    }

    /// Set the watermark the query filters on
    #[must_use]
    pub fn with_last_cursor_value(mut self, value: Option<Timestamp>) -> Self {
        self.last_cursor_value = value;
        self
    }

    /// Set the resume token
    #[must_use]
    pub fn with_token(mut self, token: Option<PageToken>) -> Self {
        self.token = token;
        self
    }
}

/// One decoded page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub records: Vec<Record>,
    pub next_token: Option<PageToken>,
}

impl Page {
    /// Build a page, deriving its next token from the records
    pub fn from_records(records: Vec<Record>, cursor_key: Option<&str>) -> Self {
        let next_token = PageToken::after_last(&records, cursor_key);
        Self {
            records,
            next_token,
        }
    }

    /// Whether this page ends the drain
    pub fn is_last(&self) -> bool {
        self.next_token.is_none()
    }
}

/// Source of query pages
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch one page
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page>;
}
