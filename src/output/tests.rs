//! Tests for output module

use super::paths::partitioned_dir_for;
use super::*;
use chrono::NaiveDate;
use serde_json::{json, Value};
use tempfile::tempdir;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
}

fn object(value: Value) -> crate::types::JsonObject {
    value.as_object().cloned().unwrap()
}

#[test]
fn test_partitioned_dir_layout() {
    assert_eq!(
        partitioned_dir_for("/data/out/", "order_items", date()),
        "/data/out/order_items/dt=2024-03-09"
    );
    assert_eq!(
        partitioned_dir_for("out", "public.users", date()),
        "out/public_users/dt=2024-03-09"
    );
}

#[test]
fn test_partitioned_path_today() {
    let path = build_partitioned_path("users", "jsonl");
    assert!(path.starts_with("users/dt="));
    assert!(path.ends_with("/data.jsonl"));

    let dir = build_partitioned_dir("base", "users");
    assert!(dir.starts_with("base/users/dt="));
}

#[test]
fn test_sanitize_stream_name() {
    assert_eq!(sanitize_stream_name("a.b/c"), "a_b_c");
    assert_eq!(sanitize_stream_name("orders"), "orders");
}

#[test]
fn test_jsonl_writer_appends_per_stream() {
    let dir = tempdir().unwrap();
    let mut writer = JsonlWriter::for_date(dir.path(), date());

    writer
        .write("orders", &object(json!({"name": "docs/orders/1", "total": 3})))
        .unwrap();
    writer
        .write("orders", &object(json!({"name": "docs/orders/2", "total": 4})))
        .unwrap();
    writer
        .write("users", &object(json!({"name": "docs/users/a"})))
        .unwrap();
    writer.flush().unwrap();

    assert_eq!(writer.rows_written(), 3);
    let orders_path = dir.path().join("orders/dt=2024-03-09/data.jsonl");
    assert_eq!(writer.path_for("orders"), Some(orders_path.as_path()));

    let contents = std::fs::read_to_string(&orders_path).unwrap();
    let lines: Vec<Value> = contents
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1]["total"], 4);

    assert!(dir.path().join("users/dt=2024-03-09/data.jsonl").exists());
    assert!(writer.path_for("missing").is_none());
}

#[test]
fn test_jsonl_writer_appends_to_existing_file() {
    let dir = tempdir().unwrap();
    {
        let mut writer = JsonlWriter::for_date(dir.path(), date());
        writer.write("orders", &object(json!({"n": 1}))).unwrap();
    }
    {
        let mut writer = JsonlWriter::for_date(dir.path(), date());
        writer.write("orders", &object(json!({"n": 2}))).unwrap();
    }

    let contents =
        std::fs::read_to_string(dir.path().join("orders/dt=2024-03-09/data.jsonl")).unwrap();
    assert_eq!(contents.lines().count(), 2);
}
