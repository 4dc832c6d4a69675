//! Connector trait and the Firestore source
//!
//! Defines the core Connector trait (spec, check, discover, read) and
//! `FirestoreSource`, which exposes every collection of a database as a
//! stream.

use crate::config::{Catalog, CatalogStream, ConfiguredCatalog, SourceConfig};
use crate::engine::{CollectionStream, Message, SyncConfig, SyncStats};
use crate::error::{Error, Result};
use crate::firestore::{Endpoints, FirestoreClient};
use crate::http::HttpClient;
use crate::schema::SchemaBuilder;
use crate::state::{CursorTracker, State};
use crate::types::{JsonObject, JsonValue, SyncMode};
use async_trait::async_trait;
use futures::channel::mpsc;
use futures::Stream;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, LazyLock};
use tracing::{error, info, warn};

// ============================================================================
// Connector Spec
// ============================================================================

/// Connector specification returned by spec()
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorSpec {
    /// Connector name
    pub name: String,

    /// Human-readable title
    pub title: String,

    /// Documentation link
    #[serde(rename = "documentationUrl")]
    pub documentation_url: String,

    /// JSON schema of the configuration
    #[serde(rename = "connectionSpecification")]
    pub connection_specification: JsonValue,
}

// ============================================================================
// Check Result
// ============================================================================

/// Result of a connection check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Whether the check succeeded
    pub success: bool,

    /// Error message if failed
    pub message: Option<String>,
}

impl CheckResult {
    /// Create a successful check result
    pub fn success() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// Create a failed check result
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

// ============================================================================
// Connector Trait
// ============================================================================

/// Type alias for the message stream returned by read()
pub type MessageStream = Pin<Box<dyn Stream<Item = Message> + Send>>;

/// Core trait that all connectors implement
#[async_trait]
pub trait Connector: Send + Sync {
    /// Returns the connector specification
    fn spec(&self) -> ConnectorSpec;

    /// Tests if credentials and configuration are valid
    async fn check(&self, config: &JsonValue) -> Result<CheckResult>;

    /// Lists available streams from the source
    async fn discover(&self, config: &JsonValue) -> Result<Catalog>;

    /// Reads data from selected streams
    ///
    /// Returns a stream of messages (records, state checkpoints, logs,
    /// per-stream status).
    async fn read(
        &self,
        config: &JsonValue,
        catalog: &ConfiguredCatalog,
        state: Option<&State>,
    ) -> Result<MessageStream>;
}

// ============================================================================
// Stream Naming
// ============================================================================

/// Uppercase run followed by a capitalized word: `HTTPLogs`
static ACRONYM_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").unwrap());

/// Lowercase letter or digit followed by an uppercase letter: `orderItems`
static WORD_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z\d])([A-Z])").unwrap());

/// Convert a camelCase collection id into a snake_case stream name
///
/// `orderItems` becomes `order_items`, `HTTPLogs` becomes `http_logs`.
pub fn camel_to_snake(name: &str) -> String {
    let name = ACRONYM_BOUNDARY.replace_all(name, "${1}_${2}");
    let name = WORD_BOUNDARY.replace_all(&name, "${1}_${2}");
    name.to_lowercase()
}

// ============================================================================
// Firestore Source
// ============================================================================

/// Source connector over a Firestore database
#[derive(Debug, Clone, Default)]
pub struct FirestoreSource {
    sync_config: SyncConfig,
}

impl FirestoreSource {
    /// Create a source with default sync limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Set sync limits applied to every stream
    #[must_use]
    pub fn with_sync_config(mut self, sync_config: SyncConfig) -> Self {
        self.sync_config = sync_config;
        self
    }

    /// Build an authenticated client from a validated config
    pub fn client(config: &SourceConfig) -> Result<FirestoreClient> {
        let http = HttpClient::with_auth(config.http_config(), config.auth_config()?)?;
        let endpoints = Endpoints::new(&config.base_url, &config.project_id, &config.database_id)?;
        Ok(FirestoreClient::new(http, endpoints).with_page_size(config.page_limit()))
    }

    /// Catalog entry for one collection
    pub fn catalog_stream(collection: &str, cursor_field: Option<&str>) -> CatalogStream {
        Self::named_stream(camel_to_snake(collection), collection, cursor_field)
    }

    /// Catalog entries for a set of collections
    ///
    /// Collections whose snake_case names collide keep their raw ids as
    /// stream names, so each stream owns its own state entry.
    pub fn catalog_streams(
        collections: &[String],
        cursor_field: Option<&str>,
    ) -> Vec<CatalogStream> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for id in collections {
            *counts.entry(camel_to_snake(id)).or_default() += 1;
        }

        collections
            .iter()
            .map(|id| {
                let name = camel_to_snake(id);
                if counts[&name] > 1 {
                    warn!(
                        "Collection {} maps to stream name {} shared with another collection, using the collection id",
                        id, name
                    );
                    Self::named_stream(id.clone(), id, cursor_field)
                } else {
                    Self::named_stream(name, id, cursor_field)
                }
            })
            .collect()
    }

    fn named_stream(name: String, collection: &str, cursor_field: Option<&str>) -> CatalogStream {
        CatalogStream {
            namespace: (name != collection).then(|| collection.to_string()),
            name,
            json_schema: SchemaBuilder::new().stream_schema(cursor_field).to_json(),
            supported_sync_modes: vec![SyncMode::FullRefresh, SyncMode::Incremental],
            source_defined_cursor: false,
            default_cursor_field: cursor_field.map(|c| vec![c.to_string()]),
            source_defined_primary_key: Some(vec![vec!["name".to_string()]]),
        }
    }

    /// Streams to run, with trackers restored from `state`
    fn prepare_streams(
        &self,
        config: &SourceConfig,
        catalog: &ConfiguredCatalog,
        state: Option<&State>,
    ) -> Result<Vec<(CollectionStream, bool)>> {
        let start_date = config.start_date()?;
        let empty = JsonObject::new();

        catalog
            .streams
            .iter()
            .map(|configured| {
                let name = &configured.stream.name;
                let cursor_key = configured.cursor_key();
                let incremental = cursor_key.is_some();
                if configured.sync_mode == SyncMode::Incremental && !incremental {
                    warn!("Stream {} is incremental but has no cursor field", name);
                }

                let mut tracker = CursorTracker::new(cursor_key, start_date);
                let saved = state.and_then(|s| s.get_stream(name)).unwrap_or(&empty);
                tracker
                    .set_state(saved)
                    .map_err(|e| Error::state(format!("Invalid state for {name}: {e}")))?;

                let stream = CollectionStream::new(
                    name.clone(),
                    configured.stream.collection_id(),
                    tracker,
                )
                .with_config(self.sync_config.clone());
                Ok((stream, incremental))
            })
            .collect()
    }
}

#[async_trait]
impl Connector for FirestoreSource {
    fn spec(&self) -> ConnectorSpec {
        let spec = SourceConfig::connection_spec();
        ConnectorSpec {
            name: "firestore".to_string(),
            title: "Firestore".to_string(),
            documentation_url: spec["documentationUrl"].as_str().unwrap_or_default().to_string(),
            connection_specification: spec["connectionSpecification"].clone(),
        }
    }

    async fn check(&self, config: &JsonValue) -> Result<CheckResult> {
        let config = match SourceConfig::from_value(config) {
            Ok(config) => config,
            Err(e) => return Ok(CheckResult::failure(e.to_string())),
        };
        let client = match Self::client(&config) {
            Ok(client) => client,
            Err(e) => return Ok(CheckResult::failure(e.to_string())),
        };

        match client.list_collections().await {
            Ok(ids) => {
                info!("Connection check found {} collections", ids.len());
                Ok(CheckResult::success())
            }
            Err(e) => {
                warn!("Connection check failed: {}", e);
                Ok(CheckResult::failure(e.to_string()))
            }
        }
    }

    async fn discover(&self, config: &JsonValue) -> Result<Catalog> {
        let config = SourceConfig::from_value(config)?;
        let client = Self::client(&config)?;

        let collections: Vec<String> = client
            .list_collections()
            .await?
            .into_iter()
            .filter(|id| config.includes_collection(id))
            .collect();

        Ok(Catalog {
            streams: Self::catalog_streams(&collections, config.cursor_field.as_deref()),
        })
    }

    async fn read(
        &self,
        config: &JsonValue,
        catalog: &ConfiguredCatalog,
        state: Option<&State>,
    ) -> Result<MessageStream> {
        let config = SourceConfig::from_value(config)?;
        let client = Arc::new(Self::client(&config)?);
        client.authenticate().await?;
        let streams = self.prepare_streams(&config, catalog, state)?;

        let (tx, rx) = mpsc::unbounded();
        tokio::spawn(async move {
            let mut total = SyncStats::new();
            for (mut stream, incremental) in streams {
                let name = stream.name().to_string();
                if tx
                    .unbounded_send(Message::info(format!("Starting sync for stream: {name}")))
                    .is_err()
                {
                    break;
                }

                let records = tx.clone();
                let result = stream
                    .drain(&*client, |record| {
                        records
                            .unbounded_send(Message::record(&name, record.to_json()))
                            .map_err(|_| Error::output("message receiver dropped"))
                    })
                    .await;

                let status = match result {
                    Ok(stats) => {
                        if incremental {
                            let _ = tx.unbounded_send(Message::state(&name, stream.get_state()));
                        }
                        total.merge(&stats);
                        Message::stream_status(
                            &name,
                            stats,
                            stream.json_schema().to_json(),
                            None,
                        )
                    }
                    Err(e) => {
                        error!("Error syncing stream {}: {}", name, e);
                        let _ = tx.unbounded_send(Message::error(format!(
                            "Error syncing stream {name}: {e}"
                        )));
                        let mut stats = SyncStats::new();
                        stats.add_error();
                        total.merge(&stats);
                        Message::stream_status(
                            &name,
                            stats,
                            stream.json_schema().to_json(),
                            Some(e.to_string()),
                        )
                    }
                };
                if tx.unbounded_send(status).is_err() {
                    break;
                }
            }
            info!(
                "Sync finished: {} streams, {} records, {} errors",
                total.streams_synced, total.records_synced, total.errors
            );
        });

        Ok(Box::pin(rx))
    }
}
