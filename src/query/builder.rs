//! Query construction

use super::types::{
    CollectionSelector, Cursor, Direction, FieldFilter, FieldOperator, FieldReference, Filter,
    Order, RunQueryRequest, StructuredQuery,
};
use crate::pagination::PageToken;
use crate::value::{format_timestamp, Timestamp};
use serde_json::json;

/// Builds a `runQuery` body for one page of a collection
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    collection: String,
    cursor_key: Option<String>,
    last_cursor_value: Option<Timestamp>,
    token: Option<PageToken>,
    limit: Option<u32>,
}

impl QueryBuilder {
    /// Start a query over every collection named `collection`
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            cursor_key: None,
            last_cursor_value: None,
            token: None,
            limit: None,
        }
    }

    /// Set the cursor field
    #[must_use]
    pub fn with_cursor_key(mut self, key: Option<&str>) -> Self {
        self.cursor_key = key.map(str::to_string);
        self
    }

    /// Set the last seen cursor value
    #[must_use]
    pub fn with_last_cursor_value(mut self, value: Option<Timestamp>) -> Self {
        self.last_cursor_value = value;
        self
    }

    /// Resume after the given token
    #[must_use]
    pub fn with_token(mut self, token: Option<PageToken>) -> Self {
        self.token = token;
        self
    }

    /// Set an explicit page limit
    #[must_use]
    pub fn with_limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }

    /// Build the request body
    ///
    /// The filter and ordering are only added when both the cursor field
    /// and a last cursor value are known. Otherwise the query is a full
    /// unordered scan.
    pub fn build(self) -> RunQueryRequest {
        let mut query = StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: self.collection,
                all_descendants: true,
            }],
            limit: self.limit,
            ..StructuredQuery::default()
        };

        if let (Some(key), Some(last)) = (self.cursor_key.as_deref(), self.last_cursor_value) {
            query.filter = Some(Filter {
                field_filter: FieldFilter {
                    field: FieldReference::new(key),
                    op: FieldOperator::GreaterThan,
                    value: json!({ "timestampValue": format_timestamp(&last) }),
                },
            });
            query.order_by.push(Order {
                field: FieldReference::new(key),
                direction: Direction::Ascending,
            });
        }

        if let Some(token) = self.token {
            query.start_at = Some(Cursor {
                values: vec![token.to_value()],
                before: false,
            });
        }

        RunQueryRequest {
            structured_query: query,
        }
    }
}

/// Build the query body for one page
pub fn build_query(
    collection: &str,
    cursor_key: Option<&str>,
    last_cursor_value: Option<Timestamp>,
    token: Option<&PageToken>,
    limit: Option<u32>,
) -> RunQueryRequest {
    QueryBuilder::new(collection)
        .with_cursor_key(cursor_key)
        .with_last_cursor_value(last_cursor_value)
        .with_token(token.cloned())
        .with_limit(limit)
        .build()
}
