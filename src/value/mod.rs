//! Firestore value resolution
//!
//! Converts tagged wire-format values (`{"integerValue": "42"}`,
//! `{"mapValue": {"fields": {...}}}`, ...) into native values and infers a
//! minimal JSON-Schema fragment for each of them.
//!
//! # Overview
//!
//! - `NativeValue` - Resolved value, rendered back to plain JSON for records
//! - `resolve` - Tagged value → native value (recursive)
//! - `infer_schema` - Native value → JSON-Schema fragment
//! - `parse_timestamp` / `format_timestamp` - ISO-8601 handling shared with
//!   the cursor tracker

mod resolver;
mod timestamp;

pub use resolver::{infer_schema, resolve, NativeValue};
pub use timestamp::{format_timestamp, parse_timestamp, Timestamp};

#[cfg(test)]
mod tests;
