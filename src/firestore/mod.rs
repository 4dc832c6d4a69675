//! Firestore REST module
//!
//! The document API surface used by the source: endpoint construction,
//! the `runQuery` page fetcher, response decoding and the collection
//! enumerator.

mod client;
mod decode;
mod endpoints;

pub use client::{FirestoreClient, DEFAULT_PAGE_SIZE};
pub use decode::{decode_collection_ids, decode_run_query};
pub use endpoints::{Endpoints, DEFAULT_BASE_URL, DEFAULT_DATABASE};
