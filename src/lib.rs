// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Firestore Source
//!
//! A data-extraction connector that reads documents from a Firestore
//! database over its REST API and emits them as flattened, schema-tagged
//! records, with incremental re-extraction driven by a cursor field.
//!
//! ## Features
//!
//! - **Value resolution**: tagged Firestore values to native values and
//!   JSON-schema fragments
//! - **Structured queries**: collection-group queries with cursor filter,
//!   ordering and `startAt` resume positions
//! - **Paged reads**: records emitted one at a time, page after page, until
//!   an empty page comes back
//! - **Incremental sync**: a per-stream high-water mark persisted as state
//! - **Service-account auth**: signed JWT exchanged for an access token
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use firestore_source::connector::{Connector, FirestoreSource};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> firestore_source::Result<()> {
//!     let config = serde_json::json!({
//!         "project_id": "my-project",
//!         "credentials_json": std::fs::read_to_string("key.json")?,
//!         "cursor_field": "updated_at"
//!     });
//!     let source = FirestoreSource::new();
//!
//!     let catalog = source.discover(&config).await?.to_configured();
//!     let mut messages = source.read(&config, &catalog, None).await?;
//!     while let Some(msg) = messages.next().await {
//!         println!("{msg:?}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Connector Interface                         │
//! │  spec() → ConnectorSpec  check() → CheckResult  discover()      │
//! │  read(catalog, state) → Stream<Message>                         │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │   Auth   │   HTTP    │    Engine     │   State   │   Output    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Bearer   │ POST      │ Page fetcher  │ Cursor    │ JSON lines  │
//! │ Service  │ Retry     │ Query builder │ Tracker   │ dt= dirs    │
//! │ account  │ Rate Limit│ Value resolver│ File save │             │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Tagged value resolution and timestamps
pub mod value;

/// JSON schema types and per-stream schema accumulation
pub mod schema;

/// Structured query construction
pub mod query;

/// Page tokens, page requests and the page fetcher seam
pub mod pagination;

/// Firestore REST client
pub mod firestore;

/// Authentication implementations
pub mod auth;

/// HTTP client with retry and rate limiting
pub mod http;

/// Cursor tracking and state persistence
pub mod state;

/// Per-collection read loop
pub mod engine;

/// Configuration and catalog types
pub mod config;

/// Connector trait and the Firestore source
pub mod connector;

/// JSON-lines output
pub mod output;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::SourceConfig;
pub use connector::{CheckResult, Connector, FirestoreSource, MessageStream};
pub use engine::Message;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
