//! Configuration types
//!
//! `SourceConfig` is the user-supplied connection configuration, read from
//! a JSON or YAML file or inline JSON. The catalog types describe the
//! streams a source offers and the subset selected for a sync.

use crate::auth::{AuthConfig, ServiceAccountKey};
use crate::error::{Error, Result};
use crate::firestore::{DEFAULT_BASE_URL, DEFAULT_DATABASE, DEFAULT_PAGE_SIZE};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::types::{DestinationSyncMode, JsonValue, OptionStringExt, SyncMode};
use crate::value::{parse_timestamp, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use std::path::Path;
use std::time::Duration;

// ============================================================================
// Source Config
// ============================================================================

/// Connection configuration of the source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Cloud project id
    #[serde(default)]
    pub project_id: String,

    /// Service-account key, as JSON text or an inline object
    #[serde(default, skip_serializing)]
    pub credentials_json: Option<JsonValue>,

    /// Pre-issued bearer token (used instead of credentials)
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,

    /// Earliest cursor value for incremental streams
    #[serde(default)]
    pub start_date: Option<String>,

    /// Database id
    #[serde(default = "default_database_id")]
    pub database_id: String,

    /// REST root
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Explicit query limit; 0 leaves paging to the server
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Requests per second cap
    #[serde(default)]
    pub rate_limit_rps: Option<u32>,

    /// Default cursor field for every stream
    #[serde(default, deserialize_with = "deserialize_cursor_field")]
    pub cursor_field: Option<String>,

    /// Collection ids to expose; all when absent
    #[serde(default)]
    pub collections: Option<Vec<String>>,
}

fn default_database_id() -> String {
    DEFAULT_DATABASE.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

/// Accept a cursor field as a bare string or a single-element list
fn deserialize_cursor_field<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Shape {
        One(String),
        Many(Vec<String>),
    }

    let shape = Option::<Shape>::deserialize(deserializer)?;
    Ok(match shape {
        Some(Shape::One(field)) => Some(field),
        Some(Shape::Many(fields)) => fields.into_iter().next(),
        None => None,
    }
    .none_if_empty())
}

impl SourceConfig {
    /// Minimal config for a project
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            credentials_json: None,
            access_token: None,
            start_date: None,
            database_id: default_database_id(),
            base_url: default_base_url(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            rate_limit_rps: None,
            cursor_field: None,
            collections: None,
        }
    }

    /// Parse from a JSON value
    pub fn from_value(value: &JsonValue) -> Result<Self> {
        let config: Self = serde_json::from_value(value.clone())
            .map_err(|e| Error::config(format!("Invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse from inline JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_value(&Self::load_value(path)?)
    }

    /// Read a config file into a raw JSON value without validating it
    pub fn load_value(path: impl AsRef<Path>) -> Result<JsonValue> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read {}: {e}", path.display())))?;

        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Ok(serde_yaml::from_str(&contents)?)
        } else {
            Ok(serde_json::from_str(&contents)?)
        }
    }

    /// Check required fields and parse what can be parsed up front
    pub fn validate(&self) -> Result<()> {
        if self.project_id.trim().is_empty() {
            return Err(Error::missing_field("project_id"));
        }
        if self.credentials_json.is_none() && self.access_token.clone().none_if_empty().is_none() {
            return Err(Error::missing_field("credentials_json"));
        }
        self.start_date()?;
        if self.timeout_secs == 0 {
            return Err(Error::invalid_value("timeout_secs", "must be at least 1"));
        }
        Ok(())
    }

    /// Parsed start date
    pub fn start_date(&self) -> Result<Option<Timestamp>> {
        match self.start_date.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse_timestamp(text)
                .map(Some)
                .map_err(|e| Error::invalid_value("start_date", e.to_string())),
        }
    }

    /// Page limit for queries
    pub fn page_limit(&self) -> Option<u32> {
        (self.page_size > 0).then_some(self.page_size)
    }

    /// Whether a collection id passes the allow-list
    pub fn includes_collection(&self, collection: &str) -> bool {
        self.collections
            .as_ref()
            .map_or(true, |allowed| allowed.iter().any(|c| c == collection))
    }

    /// Authentication derived from the credentials
    ///
    /// A bearer token takes precedence over service-account credentials.
    pub fn auth_config(&self) -> Result<AuthConfig> {
        if let Some(token) = self.access_token.clone().none_if_empty() {
            return Ok(AuthConfig::Bearer { token });
        }

        let key = match &self.credentials_json {
            Some(JsonValue::String(text)) => ServiceAccountKey::from_json(text)?,
            Some(value @ JsonValue::Object(_)) => ServiceAccountKey::from_json(&value.to_string())?,
            Some(_) => {
                return Err(Error::auth(
                    "credentials_json must be a JSON string or object",
                ))
            }
            None => return Err(Error::missing_field("credentials_json")),
        };
        Ok(AuthConfig::service_account(key))
    }

    /// HTTP client settings
    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .max_retries(self.max_retries)
            .rate_limit(self.rate_limit_rps.map(RateLimiterConfig::per_second))
            .build()
    }

    /// Connection specification: the JSON schema of this config
    pub fn connection_spec() -> JsonValue {
        json!({
            "documentationUrl": "https://firebase.google.com/docs/firestore/reference/rest",
            "connectionSpecification": {
                "$schema": "http://json-schema.org/draft-07/schema#",
                "title": "Firestore Source Spec",
                "type": "object",
                "required": ["project_id"],
                "properties": {
                    "project_id": {
                        "type": "string",
                        "title": "Project ID",
                        "description": "Cloud project that owns the database"
                    },
                    "credentials_json": {
                        "type": "string",
                        "title": "Credentials JSON",
                        "description": "Service account key file contents",
                        "airbyte_secret": true
                    },
                    "access_token": {
                        "type": "string",
                        "title": "Access token",
                        "description": "Pre-issued bearer token, used instead of credentials_json",
                        "airbyte_secret": true
                    },
                    "start_date": {
                        "type": "string",
                        "title": "Start date",
                        "description": "Documents with a cursor value at or before this instant are skipped on the first incremental sync",
                        "format": "date-time"
                    },
                    "database_id": {"type": "string", "default": DEFAULT_DATABASE},
                    "base_url": {"type": "string", "default": DEFAULT_BASE_URL},
                    "page_size": {"type": "integer", "minimum": 0, "default": DEFAULT_PAGE_SIZE},
                    "timeout_secs": {"type": "integer", "minimum": 1, "default": 30},
                    "max_retries": {"type": "integer", "minimum": 0, "default": 3},
                    "rate_limit_rps": {"type": "integer", "minimum": 1},
                    "cursor_field": {
                        "oneOf": [
                            {"type": "string"},
                            {"type": "array", "items": {"type": "string"}, "maxItems": 1}
                        ]
                    },
                    "collections": {"type": "array", "items": {"type": "string"}}
                }
            }
        })
    }
}

// ============================================================================
// Catalog Types
// ============================================================================

/// Discovered catalog (available streams)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    /// Available streams
    pub streams: Vec<CatalogStream>,
}

impl Catalog {
    /// Find a stream by name
    pub fn get_stream(&self, name: &str) -> Option<&CatalogStream> {
        self.streams.iter().find(|s| s.name == name)
    }

    /// Select every stream, incremental where a cursor field is known
    pub fn to_configured(&self) -> ConfiguredCatalog {
        ConfiguredCatalog {
            streams: self
                .streams
                .iter()
                .map(|stream| {
                    let sync_mode = if stream.default_cursor_field.is_some() {
                        SyncMode::Incremental
                    } else {
                        SyncMode::FullRefresh
                    };
                    ConfiguredStream {
                        stream: stream.clone(),
                        sync_mode,
                        destination_sync_mode: DestinationSyncMode::Append,
                        cursor_field: stream.default_cursor_field.clone(),
                        primary_key: stream.source_defined_primary_key.clone(),
                    }
                })
                .collect(),
        }
    }
}

/// Stream in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStream {
    /// Stream name
    pub name: String,

    /// Collection id the stream reads (defaults to the stream name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// JSON schema for the stream
    #[serde(default)]
    pub json_schema: JsonValue,

    /// Supported sync modes
    #[serde(default)]
    pub supported_sync_modes: Vec<SyncMode>,

    /// Whether the source picks the cursor field
    #[serde(default)]
    pub source_defined_cursor: bool,

    /// Default cursor field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_cursor_field: Option<Vec<String>>,

    /// Source-defined primary key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_defined_primary_key: Option<Vec<Vec<String>>>,
}

impl CatalogStream {
    /// Collection id queried for this stream
    pub fn collection_id(&self) -> &str {
        self.namespace.as_deref().unwrap_or(&self.name)
    }
}

/// Configured catalog (selected streams for sync)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfiguredCatalog {
    /// Selected streams
    pub streams: Vec<ConfiguredStream>,
}

/// Configured stream for sync
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfiguredStream {
    /// Stream reference
    pub stream: CatalogStream,

    /// Selected sync mode
    #[serde(default)]
    pub sync_mode: SyncMode,

    /// Destination sync mode
    #[serde(default)]
    pub destination_sync_mode: DestinationSyncMode,

    /// Cursor field to use
    #[serde(default)]
    pub cursor_field: Option<Vec<String>>,

    /// Primary key to use
    #[serde(default)]
    pub primary_key: Option<Vec<Vec<String>>>,
}

impl ConfiguredStream {
    /// Cursor field for this run
    ///
    /// Full-refresh streams run without one. Incremental streams use the
    /// configured field, then the stream's default.
    pub fn cursor_key(&self) -> Option<String> {
        if self.sync_mode == SyncMode::FullRefresh {
            return None;
        }
        self.cursor_field
            .as_ref()
            .or(self.stream.default_cursor_field.as_ref())
            .and_then(|fields| fields.first())
            .cloned()
            .none_if_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthConfig;
    use tempfile::TempDir;

    fn catalog_stream(default_cursor: Option<&str>) -> CatalogStream {
        CatalogStream {
            name: "order_items".into(),
            namespace: Some("orderItems".into()),
            json_schema: json!({}),
            supported_sync_modes: vec![SyncMode::FullRefresh, SyncMode::Incremental],
            source_defined_cursor: false,
            default_cursor_field: default_cursor.map(|c| vec![c.to_string()]),
            source_defined_primary_key: Some(vec![vec!["name".into()]]),
        }
    }

    #[test]
    fn test_parse_minimal_config_defaults() {
        let config =
            SourceConfig::from_json(r#"{"project_id": "demo", "access_token": "t"}"#).unwrap();

        assert_eq!(config.database_id, "(default)");
        assert_eq!(config.base_url, "https://firestore.googleapis.com/v1/");
        assert_eq!(config.page_size, 100);
        assert_eq!(config.page_limit(), Some(100));
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_retries, 3);
        assert!(config.cursor_field.is_none());
        assert!(config.includes_collection("anything"));
    }

    #[test]
    fn test_cursor_field_shapes() {
        let one = SourceConfig::from_json(
            r#"{"project_id": "p", "access_token": "t", "cursor_field": "updated_at"}"#,
        )
        .unwrap();
        let list = SourceConfig::from_json(
            r#"{"project_id": "p", "access_token": "t", "cursor_field": ["updated_at"]}"#,
        )
        .unwrap();
        let empty = SourceConfig::from_json(
            r#"{"project_id": "p", "access_token": "t", "cursor_field": []}"#,
        )
        .unwrap();
        let null = SourceConfig::from_json(
            r#"{"project_id": "p", "access_token": "t", "cursor_field": null}"#,
        )
        .unwrap();

        assert_eq!(one.cursor_field.as_deref(), Some("updated_at"));
        assert_eq!(list.cursor_field.as_deref(), Some("updated_at"));
        assert!(empty.cursor_field.is_none());
        assert!(null.cursor_field.is_none());
    }

    #[test]
    fn test_validation_errors() {
        let err = SourceConfig::from_json(r#"{"access_token": "t"}"#).unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == "project_id"));

        let err = SourceConfig::from_json(r#"{"project_id": "p"}"#).unwrap_err();
        assert!(matches!(err, Error::MissingConfigField { ref field } if field == "credentials_json"));

        let err = SourceConfig::from_json(
            r#"{"project_id": "p", "access_token": "t", "start_date": "someday"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { ref field, .. } if field == "start_date"));
    }

    #[test]
    fn test_start_date_and_page_limit() {
        let mut config = SourceConfig::new("p");
        config.start_date = Some("2024-01-01T00:00:00Z".into());
        config.page_size = 0;

        assert_eq!(
            config.start_date().unwrap(),
            Some(parse_timestamp("2024-01-01T00:00:00+00:00").unwrap())
        );
        assert_eq!(config.page_limit(), None);
    }

    #[test]
    fn test_yaml_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "project_id: demo\naccess_token: abc\ncollections: [users]\nrate_limit_rps: 5\n",
        )
        .unwrap();

        let config = SourceConfig::from_file(&path).unwrap();
        assert_eq!(config.project_id, "demo");
        assert!(config.includes_collection("users"));
        assert!(!config.includes_collection("orders"));
        assert_eq!(
            config.http_config().rate_limit,
            Some(RateLimiterConfig::new(5, 5))
        );
    }

    #[test]
    fn test_auth_config_selection() {
        let mut config = SourceConfig::new("p");
        config.access_token = Some("tok".into());
        config.credentials_json = Some(json!("{}"));
        assert!(matches!(
            config.auth_config().unwrap(),
            AuthConfig::Bearer { ref token } if token == "tok"
        ));

        config.access_token = None;
        config.credentials_json = Some(json!({
            "client_email": "sa@p.iam.gserviceaccount.com",
            "private_key": "pem"
        }));
        assert!(matches!(
            config.auth_config().unwrap(),
            AuthConfig::ServiceAccount { .. }
        ));

        config.credentials_json = Some(json!(42));
        assert!(config.auth_config().is_err());
    }

    #[test]
    fn test_credentials_not_serialized() {
        let mut config = SourceConfig::new("p");
        config.access_token = Some("secret".into());
        let text = serde_json::to_string(&config).unwrap();
        assert!(!text.contains("secret"));
    }

    #[test]
    fn test_configured_stream_cursor_key() {
        let mut configured = Catalog {
            streams: vec![catalog_stream(Some("updated_at"))],
        }
        .to_configured();
        let stream = &mut configured.streams[0];

        assert_eq!(stream.sync_mode, SyncMode::Incremental);
        assert_eq!(stream.cursor_key().as_deref(), Some("updated_at"));
        assert_eq!(stream.stream.collection_id(), "orderItems");

        stream.cursor_field = Some(vec!["created_at".into()]);
        assert_eq!(stream.cursor_key().as_deref(), Some("created_at"));

        stream.sync_mode = SyncMode::FullRefresh;
        assert_eq!(stream.cursor_key(), None);
    }

    #[test]
    fn test_parse_configured_catalog() {
        let catalog: ConfiguredCatalog = serde_json::from_value(json!({
            "streams": [{
                "stream": {"name": "users", "json_schema": {}},
                "sync_mode": "incremental",
                "destination_sync_mode": "append",
                "cursor_field": ["ts"]
            }]
        }))
        .unwrap();

        let stream = &catalog.streams[0];
        assert_eq!(stream.stream.collection_id(), "users");
        assert_eq!(stream.cursor_key().as_deref(), Some("ts"));
    }

    #[test]
    fn test_connection_spec_lists_keys() {
        let spec = SourceConfig::connection_spec();
        let props = &spec["connectionSpecification"]["properties"];
        for key in ["project_id", "credentials_json", "start_date", "cursor_field"] {
            assert!(props.get(key).is_some(), "missing {key}");
        }
    }
}
