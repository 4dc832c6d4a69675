//! Value resolver tests

use super::*;
use crate::error::Error;
use crate::schema::{JsonType, JsonTypeOrArray};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::BTreeMap;
use test_case::test_case;

fn ts(value: &str) -> Timestamp {
    parse_timestamp(value).unwrap()
}

// ============================================================================
// resolve
// ============================================================================

#[test_case(json!({"integerValue": "42"}), NativeValue::Integer(42) ; "integer from string")]
#[test_case(json!({"integerValue": -7}), NativeValue::Integer(-7) ; "integer from number")]
#[test_case(json!({"doubleValue": 1.5}), NativeValue::Double(1.5) ; "double")]
#[test_case(json!({"doubleValue": "2.25"}), NativeValue::Double(2.25) ; "double from string")]
#[test_case(json!({"booleanValue": true}), NativeValue::Boolean(true) ; "boolean")]
#[test_case(json!({"booleanValue": "false"}), NativeValue::Boolean(false) ; "boolean from string")]
#[test_case(json!({"stringValue": "hello"}), NativeValue::String("hello".into()) ; "string")]
#[test_case(json!({"nullValue": null}), NativeValue::Null ; "null")]
fn test_resolve_scalar(input: serde_json::Value, expected: NativeValue) {
    assert_eq!(resolve(&input).unwrap(), expected);
}

#[test]
fn test_resolve_timestamp_zulu() {
    let value = resolve(&json!({"timestampValue": "2024-01-02T03:04:05.678Z"})).unwrap();
    assert_eq!(value, NativeValue::Timestamp(ts("2024-01-02T03:04:05.678+00:00")));
    assert_eq!(value.to_json(), json!("2024-01-02T03:04:05.678+00:00"));
}

#[test]
fn test_resolve_nested_array_and_map() {
    let input = json!({
        "mapValue": {
            "fields": {
                "tags": {"arrayValue": {"values": [
                    {"stringValue": "a"},
                    {"integerValue": "2"}
                ]}},
                "inner": {"mapValue": {"fields": {
                    "ok": {"booleanValue": true}
                }}}
            }
        }
    });

    let resolved = resolve(&input).unwrap();

    let mut inner = BTreeMap::new();
    inner.insert("ok".to_string(), NativeValue::Boolean(true));
    let mut expected = BTreeMap::new();
    expected.insert(
        "tags".to_string(),
        NativeValue::Array(vec![NativeValue::String("a".into()), NativeValue::Integer(2)]),
    );
    expected.insert("inner".to_string(), NativeValue::Map(inner));
    assert_eq!(resolved, NativeValue::Map(expected));

    assert_eq!(
        resolved.to_json(),
        json!({"tags": ["a", 2], "inner": {"ok": true}})
    );
}

#[test]
fn test_resolve_empty_containers() {
    assert_eq!(
        resolve(&json!({"arrayValue": {}})).unwrap(),
        NativeValue::Array(vec![])
    );
    assert_eq!(
        resolve(&json!({"mapValue": {}})).unwrap(),
        NativeValue::Map(BTreeMap::new())
    );
}

#[test]
fn test_resolve_unrecognized_passthrough() {
    let geo = json!({"geoPointValue": {"latitude": 1.0, "longitude": 2.0}});
    assert_eq!(resolve(&geo).unwrap(), NativeValue::Unrecognized(geo.clone()));
    assert_eq!(resolve(&geo).unwrap().to_json(), geo);

    let bare = json!("just a string");
    assert_eq!(resolve(&bare).unwrap().to_json(), bare);
}

#[test]
fn test_resolve_bad_integer_is_malformed() {
    let err = resolve(&json!({"integerValue": "forty-two"})).unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }));
}

#[test]
fn test_resolve_bad_timestamp() {
    let err = resolve(&json!({"timestampValue": "not a time"})).unwrap_err();
    assert!(matches!(err, Error::InvalidTimestamp { .. }));
}

#[test]
fn test_non_finite_double_renders_as_string() {
    let value = resolve(&json!({"doubleValue": "NaN"})).unwrap();
    assert_eq!(value.to_json(), json!("NaN"));
    assert_eq!(NativeValue::Double(f64::NEG_INFINITY).to_json(), json!("-Infinity"));
}

#[test]
fn test_as_timestamp() {
    assert_eq!(
        NativeValue::String("2024-01-03T00:00:00Z".into()).as_timestamp(),
        Some(ts("2024-01-03T00:00:00+00:00"))
    );
    assert_eq!(NativeValue::Integer(3).as_timestamp(), None);
    assert_eq!(NativeValue::String("soon".into()).as_timestamp(), None);
}

// ============================================================================
// infer_schema
// ============================================================================

#[test_case(json!({"stringValue": "x"}), json!({"type": "string"}) ; "string")]
#[test_case(json!({"integerValue": "1"}), json!({"type": "integer"}) ; "integer")]
#[test_case(json!({"doubleValue": 0.5}), json!({"type": "number"}) ; "double")]
#[test_case(json!({"booleanValue": false}), json!({"type": "boolean"}) ; "boolean is not integer")]
#[test_case(json!({"nullValue": null}), json!({"type": "null"}) ; "null")]
#[test_case(
    json!({"timestampValue": "2024-01-01T00:00:00Z"}),
    json!({"type": "string", "format": "date-time"})
    ; "timestamp"
)]
#[test_case(
    json!({"arrayValue": {"values": []}}),
    json!({"type": "array", "items": {"type": "null"}})
    ; "empty array"
)]
#[test_case(
    json!({"arrayValue": {"values": [{"integerValue": "1"}, {"stringValue": "b"}]}}),
    json!({"type": "array", "items": {"type": "integer"}})
    ; "array typed by first element"
)]
fn test_infer_schema(input: serde_json::Value, expected: serde_json::Value) {
    let resolved = resolve(&input).unwrap();
    assert_eq!(infer_schema(&resolved).to_json(), expected);
}

#[test]
fn test_infer_schema_map() {
    let resolved = resolve(&json!({"mapValue": {"fields": {
        "city": {"stringValue": "Oslo"},
        "zip": {"integerValue": "150"}
    }}}))
    .unwrap();

    let schema = infer_schema(&resolved);
    assert_eq!(schema.json_type, JsonTypeOrArray::Single(JsonType::Object));
    assert_eq!(
        schema.to_json(),
        json!({
            "type": "object",
            "properties": {
                "city": {"type": "string"},
                "zip": {"type": "integer"}
            }
        })
    );
}

#[test]
fn test_infer_schema_unrecognized_uses_raw_json() {
    let resolved = resolve(&json!({"referenceValue": "projects/p/x"})).unwrap();
    let schema = infer_schema(&resolved);
    assert_eq!(schema.json_type, JsonTypeOrArray::Single(JsonType::Object));
    assert_eq!(
        schema.properties.unwrap()["referenceValue"].json_type,
        JsonTypeOrArray::Single(JsonType::String)
    );
}
