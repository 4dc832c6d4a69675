//! Schema module
//!
//! JSON-Schema types and the per-stream schema builder that turns field
//! observations into a stream's declared output schema.
//!
//! # Features
//!
//! - **Schema Merging**: Repeated fields merge into one entry (union types)
//! - **Nullable Detection**: Null observations widen a field to nullable
//! - **Array Type Inference**: Array item types merge across observations
//! - **Nested Object Support**: Map fields merge their properties recursively

mod builder;
mod types;

pub use builder::{merge_property, SchemaBuilder, NAME_FIELD};
pub use types::{JsonSchema, JsonType, JsonTypeOrArray, SchemaProperty};
