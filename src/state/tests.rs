//! Cursor tracker tests

use super::*;
use crate::error::Error;
use crate::pagination::Record;
use crate::types::JsonObject;
use crate::value::{parse_timestamp, NativeValue, Timestamp};
use pretty_assertions::assert_eq;
use serde_json::json;

fn ts(value: &str) -> Timestamp {
    parse_timestamp(value).unwrap()
}

fn record(updated_at: &str) -> Record {
    Record::new(format!("docs/{updated_at}"))
        .with_field("updated_at", NativeValue::Timestamp(ts(updated_at)))
}

fn persisted(value: serde_json::Value) -> JsonObject {
    value.as_object().cloned().unwrap()
}

#[test]
fn test_new_tracker_seeds_from_start_date() {
    let tracker = CursorTracker::new(Some("updated_at".into()), Some(ts("2024-01-01T00:00:00Z")));
    assert_eq!(tracker.value(), Some(ts("2024-01-01T00:00:00Z")));
    assert_eq!(
        tracker.get_state(),
        persisted(json!({"updated_at": "2024-01-01T00:00:00+00:00"}))
    );
}

#[test]
fn test_empty_state_without_value() {
    let tracker = CursorTracker::new(Some("updated_at".into()), None);
    assert!(tracker.get_state().is_empty());

    let tracker = CursorTracker::new(None, Some(ts("2024-01-01T00:00:00Z")));
    assert!(tracker.get_state().is_empty());
}

#[test]
fn test_observe_is_monotonic_in_any_order() {
    let values = [
        "2024-01-05T00:00:00Z",
        "2024-01-02T00:00:00Z",
        "2024-01-09T12:00:00Z",
        "2024-01-01T00:00:00Z",
        "2024-01-09T11:59:59Z",
    ];
    let orders: [[usize; 5]; 4] = [
        [0, 1, 2, 3, 4],
        [4, 3, 2, 1, 0],
        [2, 0, 4, 1, 3],
        [1, 3, 0, 4, 2],
    ];

    for order in orders {
        let mut tracker = CursorTracker::new(Some("updated_at".into()), None);
        let mut previous = None;
        for index in order {
            tracker.observe_record(&record(values[index]));
            assert!(tracker.value() >= previous);
            previous = tracker.value();
        }
        assert_eq!(tracker.value(), Some(ts("2024-01-09T12:00:00Z")));
    }
}

#[test]
fn test_observe_never_drops_below_initial_value() {
    let mut tracker = CursorTracker::new(Some("updated_at".into()), Some(ts("2024-06-01T00:00:00Z")));
    assert!(!tracker.observe_record(&record("2024-01-02T00:00:00Z")));
    assert_eq!(tracker.value(), Some(ts("2024-06-01T00:00:00Z")));

    assert!(tracker.observe_record(&record("2024-06-02T00:00:00Z")));
    assert_eq!(tracker.value(), Some(ts("2024-06-02T00:00:00Z")));
}

#[test]
fn test_observe_compares_instants_across_offsets() {
    let mut tracker = CursorTracker::new(Some("updated_at".into()), None);
    tracker.observe(ts("2024-01-01T12:00:00+00:00"));
    // 13:00 at +02:00 is 11:00 UTC
    assert!(!tracker.observe(ts("2024-01-01T13:00:00+02:00")));
    assert_eq!(tracker.value(), Some(ts("2024-01-01T12:00:00Z")));
}

#[test]
fn test_record_without_cursor_value_is_ignored() {
    let mut tracker = CursorTracker::new(Some("updated_at".into()), None);
    assert!(!tracker.observe_record(&Record::new("docs/a")));
    assert!(!tracker.observe_record(
        &Record::new("docs/b").with_field("updated_at", NativeValue::Integer(5))
    ));
    assert_eq!(tracker.value(), None);

    let mut untracked = CursorTracker::new(None, None);
    assert!(!untracked.observe_record(&record("2024-01-02T00:00:00Z")));
}

#[test]
fn test_set_state_adopts_persisted_value() {
    let mut tracker = CursorTracker::new(Some("updated_at".into()), Some(ts("2024-01-01T00:00:00Z")));
    tracker
        .set_state(&persisted(json!({"updated_at": "2024-03-01T00:00:00+00:00"})))
        .unwrap();
    assert_eq!(tracker.value(), Some(ts("2024-03-01T00:00:00Z")));
}

#[test]
fn test_set_state_falls_back_to_start_date() {
    let mut tracker = CursorTracker::new(Some("updated_at".into()), Some(ts("2024-01-01T00:00:00Z")));
    tracker.observe(ts("2024-05-01T00:00:00Z"));
    tracker
        .set_state(&persisted(json!({"other_field": "2024-03-01T00:00:00Z"})))
        .unwrap();
    assert_eq!(tracker.value(), Some(ts("2024-01-01T00:00:00Z")));

    let mut unset = CursorTracker::new(Some("updated_at".into()), None);
    unset.observe(ts("2024-05-01T00:00:00Z"));
    unset.set_state(&JsonObject::new()).unwrap();
    assert_eq!(unset.value(), None);
}

#[test]
fn test_set_state_rejects_bad_timestamp() {
    let mut tracker = CursorTracker::new(Some("updated_at".into()), None);
    let err = tracker
        .set_state(&persisted(json!({"updated_at": "last tuesday"})))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidTimestamp { .. }));
}

#[test]
fn test_set_state_rejects_non_string_cursor() {
    for stored in [json!(1706000000), json!(null), json!({"seconds": 1})] {
        let mut tracker =
            CursorTracker::new(Some("updated_at".into()), Some(ts("2024-01-01T00:00:00Z")));
        let err = tracker
            .set_state(&persisted(json!({ "updated_at": stored })))
            .unwrap_err();
        assert!(matches!(err, Error::State { .. }));
        assert_eq!(tracker.value(), Some(ts("2024-01-01T00:00:00Z")));
    }
}

#[test]
fn test_state_round_trip() {
    let mut tracker = CursorTracker::new(Some("updated_at".into()), None);
    tracker.observe(ts("2024-01-03T04:05:06.789123Z"));

    let exported = tracker.get_state();
    let mut restored = CursorTracker::new(Some("updated_at".into()), None);
    restored.set_state(&exported).unwrap();

    assert_eq!(restored.value(), tracker.value());
    assert_eq!(restored.get_state(), exported);

    tracker.set_state(&exported).unwrap();
    assert_eq!(tracker.get_state(), exported);
}
