//! Schema types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// JSON Schema type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl JsonType {
    /// Merge two types, returning the more general type
    pub fn merge_with(&self, other: &JsonType) -> JsonType {
        match (self, other) {
            (a, b) if a == b => a.clone(),
            (JsonType::Null, other) | (other, JsonType::Null) => other.clone(),
            (JsonType::Integer, JsonType::Number) | (JsonType::Number, JsonType::Integer) => {
                JsonType::Number
            }
            // Incompatible types - fall back to string
            _ => JsonType::String,
        }
    }
}

/// JSON type can be a single type or array of types (for nullable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JsonTypeOrArray {
    Single(JsonType),
    Multiple(Vec<JsonType>),
}

impl JsonTypeOrArray {
    /// Create a single type
    pub fn single(t: JsonType) -> Self {
        JsonTypeOrArray::Single(t)
    }

    /// Create a nullable type, written null-first (`["null", "string"]`)
    pub fn nullable(t: JsonType) -> Self {
        if t == JsonType::Null {
            JsonTypeOrArray::Single(JsonType::Null)
        } else {
            JsonTypeOrArray::Multiple(vec![JsonType::Null, t])
        }
    }

    /// Check if this type is nullable
    pub fn is_nullable(&self) -> bool {
        match self {
            JsonTypeOrArray::Single(JsonType::Null) => true,
            JsonTypeOrArray::Multiple(types) => types.contains(&JsonType::Null),
            _ => false,
        }
    }

    /// Get the primary (non-null) type
    pub fn primary_type(&self) -> Option<&JsonType> {
        match self {
            JsonTypeOrArray::Single(t) => Some(t),
            JsonTypeOrArray::Multiple(types) => types.iter().find(|t| **t != JsonType::Null),
        }
    }

    /// Make this type nullable
    pub fn make_nullable(&self) -> Self {
        if self.is_nullable() {
            return self.clone();
        }
        match self {
            JsonTypeOrArray::Single(t) => JsonTypeOrArray::nullable(t.clone()),
            JsonTypeOrArray::Multiple(types) => {
                let mut new_types = vec![JsonType::Null];
                new_types.extend(types.iter().cloned());
                JsonTypeOrArray::Multiple(new_types)
            }
        }
    }

    /// Merge with another type
    pub fn merge_with(&self, other: &JsonTypeOrArray) -> JsonTypeOrArray {
        let result_nullable = self.is_nullable() || other.is_nullable();

        let merged_type = match (self.primary_type(), other.primary_type()) {
            (Some(a), Some(b)) => a.merge_with(b),
            (Some(t), None) | (None, Some(t)) => t.clone(),
            (None, None) => JsonType::Null,
        };

        if result_nullable && merged_type != JsonType::Null {
            JsonTypeOrArray::nullable(merged_type)
        } else {
            JsonTypeOrArray::single(merged_type)
        }
    }
}

/// JSON Schema property definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaProperty {
    /// Property type(s)
    #[serde(rename = "type")]
    pub json_type: JsonTypeOrArray,

    /// Format hint (e.g., "date-time")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Nested properties (for objects)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, SchemaProperty>>,

    /// Array items schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaProperty>>,
}

impl SchemaProperty {
    /// Create a new property with the given type
    pub fn new(json_type: JsonType) -> Self {
        Self {
            json_type: JsonTypeOrArray::single(json_type),
            format: None,
            properties: None,
            items: None,
        }
    }

    /// Create a nullable property
    pub fn nullable(json_type: JsonType) -> Self {
        Self {
            json_type: JsonTypeOrArray::nullable(json_type),
            ..Self::new(JsonType::Null)
        }
    }

    /// Create an object property with nested properties
    pub fn object(properties: BTreeMap<String, SchemaProperty>) -> Self {
        Self {
            properties: Some(properties),
            ..Self::new(JsonType::Object)
        }
    }

    /// Create an array property with item schema
    pub fn array(items: SchemaProperty) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::new(JsonType::Array)
        }
    }

    /// Set format hint
    #[must_use]
    pub fn with_format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    /// Make this property nullable
    pub fn make_nullable(&mut self) {
        self.json_type = self.json_type.make_nullable();
    }

    /// Check if nullable
    pub fn is_nullable(&self) -> bool {
        self.json_type.is_nullable()
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Full JSON Schema document for a stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonSchema {
    /// Schema version
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Schema type (always "object" for top-level)
    #[serde(rename = "type")]
    pub json_type: JsonType,

    /// Required properties
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    /// Object properties
    #[serde(default)]
    pub properties: BTreeMap<String, SchemaProperty>,

    /// Schemas for properties matched by name pattern
    #[serde(
        rename = "patternProperties",
        default,
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub pattern_properties: BTreeMap<String, Value>,

    /// Allow additional properties
    #[serde(rename = "additionalProperties", default = "default_true")]
    pub additional_properties: bool,
}

fn default_true() -> bool {
    true
}

impl Default for JsonSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonSchema {
    /// Create a new empty schema
    pub fn new() -> Self {
        Self {
            schema: Some("http://json-schema.org/draft-07/schema#".to_string()),
            json_type: JsonType::Object,
            required: Vec::new(),
            properties: BTreeMap::new(),
            pattern_properties: BTreeMap::new(),
            additional_properties: true,
        }
    }

    /// Add a property
    pub fn add_property(&mut self, name: &str, property: SchemaProperty) {
        self.properties.insert(name.to_string(), property);
    }

    /// Add a required property
    pub fn add_required(&mut self, name: &str) {
        if !self.is_required(name) {
            self.required.push(name.to_string());
        }
    }

    /// Check if a property is required
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|n| n == name)
    }

    /// Get a property
    pub fn get_property(&self, name: &str) -> Option<&SchemaProperty> {
        self.properties.get(name)
    }

    /// Convert to JSON value
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
