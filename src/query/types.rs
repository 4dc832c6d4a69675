//! Structured query wire types

use crate::types::JsonValue;
use serde::{Deserialize, Serialize};

/// Body of a `documents:runQuery` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub structured_query: StructuredQuery,
}

/// A structured query over one collection id
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    pub from: Vec<CollectionSelector>,

    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub order_by: Vec<Order>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<Cursor>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Collection source of a query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector {
    pub collection_id: String,
    /// Match the id anywhere in the hierarchy, not only under one parent
    pub all_descendants: bool,
}

/// Query filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub field_filter: FieldFilter,
}

/// Comparison of one field against a tagged value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: FieldReference,
    pub op: FieldOperator,
    pub value: JsonValue,
}

/// Reference to a document field by path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    pub field_path: String,
}

impl FieldReference {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            field_path: path.into(),
        }
    }
}

/// Field comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldOperator {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Equal,
}

/// Ordering on one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub field: FieldReference,
    pub direction: Direction,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Ascending,
    Descending,
}

/// Query position
///
/// With `before: false` the query resumes strictly after the position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    pub values: Vec<JsonValue>,
    pub before: bool,
}
