//! Tagged value resolution and schema inference

use super::timestamp::{format_timestamp, parse_timestamp, Timestamp};
use crate::error::{Error, Result};
use crate::schema::{JsonType, SchemaProperty};
use crate::types::{JsonObject, JsonValue};
use std::collections::BTreeMap;

/// A resolved Firestore value
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    /// `nullValue`
    Null,
    /// `booleanValue`
    Boolean(bool),
    /// `integerValue` (sent as a decimal string on the wire)
    Integer(i64),
    /// `doubleValue`
    Double(f64),
    /// `timestampValue`
    Timestamp(Timestamp),
    /// `stringValue`
    String(String),
    /// `arrayValue`
    Array(Vec<NativeValue>),
    /// `mapValue`
    Map(BTreeMap<String, NativeValue>),
    /// Any tag not listed above, kept exactly as received
    Unrecognized(JsonValue),
}

impl NativeValue {
    /// Render as plain JSON for record output
    ///
    /// Timestamps become ISO-8601 strings with an explicit offset. Non-finite
    /// doubles have no JSON number form and are written as `"NaN"`,
    /// `"Infinity"` or `"-Infinity"`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            NativeValue::Null => JsonValue::Null,
            NativeValue::Boolean(b) => JsonValue::Bool(*b),
            NativeValue::Integer(i) => JsonValue::from(*i),
            NativeValue::Double(d) => match serde_json::Number::from_f64(*d) {
                Some(n) => JsonValue::Number(n),
                None if d.is_nan() => JsonValue::String("NaN".to_string()),
                None if d.is_sign_negative() => JsonValue::String("-Infinity".to_string()),
                None => JsonValue::String("Infinity".to_string()),
            },
            NativeValue::Timestamp(ts) => JsonValue::String(format_timestamp(ts)),
            NativeValue::String(s) => JsonValue::String(s.clone()),
            NativeValue::Array(items) => {
                JsonValue::Array(items.iter().map(NativeValue::to_json).collect())
            }
            NativeValue::Map(fields) => JsonValue::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            NativeValue::Unrecognized(raw) => raw.clone(),
        }
    }

    /// Read plain JSON as a native value (no tag interpretation)
    pub fn from_json(value: &JsonValue) -> NativeValue {
        match value {
            JsonValue::Null => NativeValue::Null,
            JsonValue::Bool(b) => NativeValue::Boolean(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => NativeValue::Integer(i),
                None => NativeValue::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => NativeValue::String(s.clone()),
            JsonValue::Array(items) => {
                NativeValue::Array(items.iter().map(NativeValue::from_json).collect())
            }
            JsonValue::Object(map) => NativeValue::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), NativeValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Interpret this value as a cursor timestamp
    ///
    /// Resolved timestamps are used directly; strings are accepted when they
    /// parse as ISO-8601. Anything else has no cursor position.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            NativeValue::Timestamp(ts) => Some(*ts),
            NativeValue::String(s) => parse_timestamp(s).ok(),
            _ => None,
        }
    }
}

/// Resolve a tagged wire-format value into a native value
///
/// Tags are checked in a fixed order: `arrayValue`, `mapValue`,
/// `integerValue`, `doubleValue`, `booleanValue`, `timestampValue`,
/// `stringValue`, `nullValue`. Input carrying none of them is returned
/// unchanged as `NativeValue::Unrecognized`.
pub fn resolve(value: &JsonValue) -> Result<NativeValue> {
    let Some(tagged) = value.as_object() else {
        return Ok(NativeValue::Unrecognized(value.clone()));
    };

    if let Some(array) = tagged.get("arrayValue") {
        let items = match array.get("values") {
            Some(JsonValue::Array(values)) => values.iter().map(resolve).collect::<Result<_>>()?,
            Some(JsonValue::Null) | None => Vec::new(),
            Some(other) => {
                return Err(Error::malformed(format!(
                    "arrayValue.values must be an array, got {other}"
                )))
            }
        };
        return Ok(NativeValue::Array(items));
    }

    if let Some(map) = tagged.get("mapValue") {
        let fields = match map.get("fields") {
            Some(JsonValue::Object(fields)) => resolve_fields(fields)?,
            Some(JsonValue::Null) | None => BTreeMap::new(),
            Some(other) => {
                return Err(Error::malformed(format!(
                    "mapValue.fields must be an object, got {other}"
                )))
            }
        };
        return Ok(NativeValue::Map(fields));
    }

    if let Some(raw) = tagged.get("integerValue") {
        return parse_integer(raw).map(NativeValue::Integer);
    }

    if let Some(raw) = tagged.get("doubleValue") {
        return parse_double(raw).map(NativeValue::Double);
    }

    if let Some(raw) = tagged.get("booleanValue") {
        return parse_boolean(raw).map(NativeValue::Boolean);
    }

    if let Some(raw) = tagged.get("timestampValue") {
        let text = raw
            .as_str()
            .ok_or_else(|| Error::malformed(format!("timestampValue must be a string, got {raw}")))?;
        return parse_timestamp(text).map(NativeValue::Timestamp);
    }

    if let Some(raw) = tagged.get("stringValue") {
        return match raw {
            JsonValue::String(s) => Ok(NativeValue::String(s.clone())),
            other => Ok(NativeValue::String(other.to_string())),
        };
    }

    if tagged.contains_key("nullValue") {
        return Ok(NativeValue::Null);
    }

    Ok(NativeValue::Unrecognized(value.clone()))
}

/// Resolve every entry of a document's `fields` map
pub(crate) fn resolve_fields(fields: &JsonObject) -> Result<BTreeMap<String, NativeValue>> {
    fields
        .iter()
        .map(|(key, value)| Ok((key.clone(), resolve(value)?)))
        .collect()
}

fn parse_integer(raw: &JsonValue) -> Result<i64> {
    match raw {
        JsonValue::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| Error::malformed(format!("integerValue '{s}': {e}"))),
        JsonValue::Number(n) => n
            .as_i64()
            .ok_or_else(|| Error::malformed(format!("integerValue {n} is not an integer"))),
        other => Err(Error::malformed(format!(
            "integerValue must be a string or number, got {other}"
        ))),
    }
}

fn parse_double(raw: &JsonValue) -> Result<f64> {
    match raw {
        JsonValue::Number(n) => n
            .as_f64()
            .ok_or_else(|| Error::malformed(format!("doubleValue {n} is not a number"))),
        // Non-finite values arrive as strings
        JsonValue::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|e| Error::malformed(format!("doubleValue '{s}': {e}"))),
        other => Err(Error::malformed(format!(
            "doubleValue must be a number, got {other}"
        ))),
    }
}

fn parse_boolean(raw: &JsonValue) -> Result<bool> {
    match raw {
        JsonValue::Bool(b) => Ok(*b),
        JsonValue::String(s) => s
            .trim()
            .parse::<bool>()
            .map_err(|e| Error::malformed(format!("booleanValue '{s}': {e}"))),
        other => Err(Error::malformed(format!(
            "booleanValue must be a boolean, got {other}"
        ))),
    }
}

/// Infer a JSON-Schema fragment for a native value
///
/// Arrays are typed by their first element only; an empty array has
/// `null` items. Unrecognized values are inferred from their raw JSON.
pub fn infer_schema(value: &NativeValue) -> SchemaProperty {
    match value {
        NativeValue::Boolean(_) => SchemaProperty::new(JsonType::Boolean),
        NativeValue::Integer(_) => SchemaProperty::new(JsonType::Integer),
        NativeValue::Double(_) => SchemaProperty::new(JsonType::Number),
        NativeValue::String(_) => SchemaProperty::new(JsonType::String),
        NativeValue::Timestamp(_) => SchemaProperty::new(JsonType::String).with_format("date-time"),
        NativeValue::Null => SchemaProperty::new(JsonType::Null),
        NativeValue::Array(items) => match items.first() {
            Some(first) => SchemaProperty::array(infer_schema(first)),
            None => SchemaProperty::array(SchemaProperty::new(JsonType::Null)),
        },
        NativeValue::Map(fields) => SchemaProperty::object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), infer_schema(v)))
                .collect(),
        ),
        NativeValue::Unrecognized(raw) => infer_schema(&NativeValue::from_json(raw)),
    }
}
