//! Per-stream schema accumulation
//!
//! Every resolved document field is recorded here with its inferred
//! fragment. Repeated observations of a field are merged into one entry,
//! so the declared schema stays bounded by the number of distinct fields.

use super::types::{JsonSchema, JsonType, SchemaProperty};
use serde_json::json;
use std::collections::BTreeMap;

/// Primary key field present on every record
pub const NAME_FIELD: &str = "name";

/// Accumulates field schemas observed in parsed documents
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    fields: BTreeMap<String, SchemaProperty>,
    observations: usize,
}

impl SchemaBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the inferred schema of one field occurrence
    pub fn observe(&mut self, field: &str, property: SchemaProperty) {
        self.observations += 1;
        match self.fields.get_mut(field) {
            Some(existing) => *existing = merge_property(existing, &property),
            None => {
                self.fields.insert(field.to_string(), property);
            }
        }
    }

    /// Merged schema for a field, if it was ever observed
    pub fn field(&self, name: &str) -> Option<&SchemaProperty> {
        self.fields.get(name)
    }

    /// Number of distinct fields seen
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field has been observed yet
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of field occurrences recorded
    pub fn observations(&self) -> usize {
        self.observations
    }

    /// Build the declared schema of a collection stream
    ///
    /// `name` is always a required string. The cursor field, when set, is
    /// declared as a nullable string regardless of what was observed, and
    /// any field not listed is allowed through the catch-all pattern.
    pub fn stream_schema(&self, cursor_key: Option<&str>) -> JsonSchema {
        let mut schema = JsonSchema::new();
        schema.add_required(NAME_FIELD);
        schema.add_property(NAME_FIELD, SchemaProperty::new(JsonType::String));

        for (field, property) in &self.fields {
            if field == NAME_FIELD {
                continue;
            }
            schema.add_property(field, property.clone());
        }

        if let Some(cursor) = cursor_key {
            schema.add_property(cursor, SchemaProperty::nullable(JsonType::String));
        }

        schema
            .pattern_properties
            .insert("^.*$".to_string(), wildcard_property());
        schema.additional_properties = false;

        schema
    }
}

/// Types accepted for fields that are not declared explicitly
fn wildcard_property() -> serde_json::Value {
    json!({
        "anyOf": [
            {"type": "string"},
            {"type": "number"},
            {"type": "boolean"},
            {"type": "integer"},
            {"type": "array", "items": {"type": "string"}},
            {"type": "array", "items": {"type": "number"}},
            {"type": "array", "items": {"type": "boolean"}},
            {"type": "object", "properties": {}}
        ]
    })
}

/// Merge two properties together
pub fn merge_property(a: &SchemaProperty, b: &SchemaProperty) -> SchemaProperty {
    let merged_type = a.json_type.merge_with(&b.json_type);

    // Conflicting formats are dropped
    let format = match (&a.format, &b.format) {
        (Some(af), Some(bf)) if af == bf => Some(af.clone()),
        (Some(_), Some(_)) => None,
        (Some(f), None) | (None, Some(f)) => {
            let other = if a.format.is_some() { b } else { a };
            if other.json_type.primary_type() == Some(&JsonType::Null) {
                Some(f.clone())
            } else {
                None
            }
        }
        (None, None) => None,
    };

    let properties = match (&a.properties, &b.properties) {
        (Some(a_props), Some(b_props)) => {
            let mut merged = a_props.clone();
            for (key, b_prop) in b_props {
                if let Some(a_prop) = merged.get_mut(key) {
                    *a_prop = merge_property(a_prop, b_prop);
                } else {
                    let mut prop = b_prop.clone();
                    prop.make_nullable();
                    merged.insert(key.clone(), prop);
                }
            }
            for key in a_props.keys() {
                if !b_props.contains_key(key) {
                    if let Some(prop) = merged.get_mut(key) {
                        prop.make_nullable();
                    }
                }
            }
            Some(merged)
        }
        (Some(props), None) | (None, Some(props)) => Some(props.clone()),
        (None, None) => None,
    };

    let items = match (&a.items, &b.items) {
        (Some(a_items), Some(b_items)) => Some(Box::new(merge_property(a_items, b_items))),
        (Some(items), None) | (None, Some(items)) => Some(items.clone()),
        (None, None) => None,
    };

    SchemaProperty {
        json_type: merged_type,
        format,
        properties,
        items,
    }
}
