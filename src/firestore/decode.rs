//! Response decoding

use crate::error::{Error, Result};
use crate::pagination::Record;
use crate::types::JsonValue;
use crate::value::resolve;

/// Decode a `runQuery` response into records
///
/// Entries without a `document` (progress-only entries) are skipped. A
/// document without a string `name` fails the whole page; a document
/// without `fields` yields a record holding only its name.
pub fn decode_run_query(response: &JsonValue) -> Result<Vec<Record>> {
    let entries = response.as_array().ok_or_else(|| {
        Error::malformed(format!(
            "runQuery response must be an array, got {}",
            json_kind(response)
        ))
    })?;

    let mut records = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let Some(document) = entry.get("document") else {
            continue;
        };

        let name = document
            .get("name")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| Error::malformed(format!("entry {index} has a document without a name")))?;

        let mut record = Record::new(name);
        match document.get("fields") {
            Some(JsonValue::Object(fields)) => {
                for (key, value) in fields {
                    record.fields.insert(key.clone(), resolve(value)?);
                }
            }
            Some(JsonValue::Null) | None => {}
            Some(other) => {
                return Err(Error::malformed(format!(
                    "document '{name}' has fields of type {}",
                    json_kind(other)
                )))
            }
        }
        records.push(record);
    }

    Ok(records)
}

/// Decode a `listCollectionIds` response
///
/// The ids are returned in response order. An absent `collectionIds` key
/// means the database has no collections.
pub fn decode_collection_ids(response: &JsonValue) -> Result<Vec<String>> {
    match response.get("collectionIds") {
        None | Some(JsonValue::Null) => Ok(Vec::new()),
        Some(JsonValue::Array(ids)) => ids
            .iter()
            .map(|id| {
                id.as_str().map(str::to_string).ok_or_else(|| {
                    Error::malformed(format!("collection id must be a string, got {id}"))
                })
            })
            .collect(),
        Some(other) => Err(Error::malformed(format!(
            "collectionIds must be an array, got {}",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
