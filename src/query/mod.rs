//! Query module
//!
//! Builds the request body of a `runQuery` call: the collection source,
//! the optional incremental filter and ordering, the resume position and
//! the page limit.
//!
//! Construction is pure. Nothing here touches the network or any state.

mod builder;
mod types;

pub use builder::{build_query, QueryBuilder};
pub use types::{
    CollectionSelector, Cursor, Direction, FieldFilter, FieldOperator, FieldReference, Filter,
    Order, RunQueryRequest, StructuredQuery,
};
