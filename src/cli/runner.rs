//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{ConfiguredCatalog, SourceConfig};
use crate::connector::{Connector, FirestoreSource};
use crate::engine::{Message, SyncConfig};
use crate::error::{Error, Result, ResultExt};
use crate::output::JsonlWriter;
use crate::state::StateManager;
use crate::types::JsonValue;
use futures::StreamExt;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::time::Instant;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Spec => self.spec(),
            Commands::Check => self.check().await,
            Commands::Discover => self.discover().await,
            Commands::Read {
                catalog,
                streams,
                output,
                max_records,
            } => {
                self.read(
                    catalog.as_deref(),
                    streams.as_deref(),
                    output.as_deref(),
                    *max_records,
                )
                .await
            }
        }
    }

    /// Load configuration as raw JSON
    fn load_config(&self) -> Result<JsonValue> {
        // Inline config takes precedence
        if let Some(json_str) = &self.cli.config_json {
            return serde_json::from_str(json_str)
                .map_err(|e| Error::config(format!("Invalid config JSON: {e}")));
        }

        match &self.cli.config {
            Some(path) => SourceConfig::load_value(path),
            None => Err(Error::config("No configuration given (use --config or --config-json)")),
        }
    }

    /// Load state
    fn load_state(&self) -> Result<StateManager> {
        // Inline state takes precedence
        if let Some(state_json) = &self.cli.state_json {
            StateManager::from_json(state_json)
        } else if let Some(path) = &self.cli.state {
            StateManager::from_file(path)
        } else {
            Ok(StateManager::in_memory())
        }
    }

    /// Show spec
    fn spec(&self) -> Result<()> {
        let spec = FirestoreSource::new().spec();
        self.output_message(&json!({
            "type": "SPEC",
            "spec": spec
        }));
        Ok(())
    }

    /// Check connection
    async fn check(&self) -> Result<()> {
        let config = self.load_config()?;

        self.output_message(&log_message("INFO", "Checking connection to Firestore"));

        let result = FirestoreSource::new().check(&config).await?;
        let status = if result.success {
            json!({"status": "SUCCEEDED", "message": "Connection successful"})
        } else {
            json!({
                "status": "FAILED",
                "message": format!(
                    "Connection failed: {}",
                    result.message.unwrap_or_default()
                )
            })
        };
        self.output_message(&json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": status
        }));
        Ok(())
    }

    /// Discover streams
    async fn discover(&self) -> Result<()> {
        let config = self.load_config()?;
        let catalog = FirestoreSource::new().discover(&config).await?;

        self.output_message(&json!({
            "type": "CATALOG",
            "catalog": catalog
        }));
        Ok(())
    }

    /// Read data
    async fn read(
        &self,
        catalog_path: Option<&Path>,
        streams: Option<&str>,
        output: Option<&Path>,
        max_records: Option<usize>,
    ) -> Result<()> {
        let sync_start = Instant::now();
        let config = self.load_config()?;
        let state = self.load_state()?;

        let mut sync_config = SyncConfig::new();
        if let Some(max) = max_records {
            sync_config = sync_config.with_max_records(max);
        }
        let source = FirestoreSource::new().with_sync_config(sync_config);

        let catalog = match catalog_path {
            Some(path) => {
                let content = fs::read_to_string(path).with_context(|| {
                    format!("Failed to read catalog file {}", path.display())
                })?;
                serde_json::from_str::<ConfiguredCatalog>(&content)
                    .map_err(|e| Error::config(format!("Invalid catalog JSON: {e}")))?
            }
            None => source.discover(&config).await?.to_configured(),
        };
        let catalog = filter_catalog(catalog, streams)?;

        let mut writer = output.map(JsonlWriter::new);
        let snapshot = state.snapshot().await;
        let mut messages = source.read(&config, &catalog, Some(&snapshot)).await?;

        let mut stream_results: Vec<JsonValue> = Vec::new();
        let mut total_records = 0usize;

        while let Some(msg) = messages.next().await {
            match &msg {
                Message::Record { stream, data } => {
                    if let Some(writer) = writer.as_mut() {
                        writer.write(stream, data)?;
                    }
                }
                Message::State { stream, data } => {
                    state.set_stream_state(stream, data.clone()).await?;
                }
                Message::StreamStatus {
                    stream,
                    stats,
                    schema,
                    error,
                } => {
                    total_records += stats.records_synced;
                    let mut result = json!({
                        "stream": stream,
                        "status": if error.is_none() { "SUCCESS" } else { "FAILED" },
                        "records_synced": stats.records_synced,
                        "pages_fetched": stats.pages_fetched,
                        "duration_ms": stats.duration_ms,
                        "json_schema": schema
                    });
                    if let Some(error) = error {
                        result["error"] = json!(error);
                    }
                    if let Some(path) = writer.as_ref().and_then(|w| w.path_for(stream)) {
                        result["output_file"] = json!(path.to_string_lossy());
                    }
                    stream_results.push(result);
                }
                Message::Log { .. } => {}
            }

            if let Some(protocol) = protocol_message(&msg) {
                self.output_message(&protocol);
            }
        }

        if let Some(writer) = writer.as_mut() {
            writer.flush()?;
        }

        // Output final state
        let state_file_path: Option<String> = if let Some(state_path) = &self.cli.state {
            state.save_to_file(state_path).await?;
            Some(state_path.to_string_lossy().to_string())
        } else {
            None
        };

        // Always emit final state to stdout so caller can capture it
        self.output_message(&json!({
            "type": "STATE",
            "state": state.snapshot().await
        }));

        let successful_streams = stream_results
            .iter()
            .filter(|r| r["status"] == "SUCCESS")
            .count();
        let failed_streams = stream_results.len() - successful_streams;

        self.output_message(&json!({
            "type": "SYNC_SUMMARY",
            "summary": {
                "status": summary_status(successful_streams, failed_streams),
                "connector": "firestore",
                "total_records": total_records,
                "total_streams": stream_results.len(),
                "successful_streams": successful_streams,
                "failed_streams": failed_streams,
                "duration_ms": sync_start.elapsed().as_millis() as u64,
                "output": {
                    "directory": output.map(|p| p.to_string_lossy().to_string()),
                    "state_file": state_file_path
                },
                "streams": stream_results
            }
        }));

        Ok(())
    }

    /// Print a protocol message on stdout
    fn output_message(&self, msg: &JsonValue) {
        let line = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(msg),
            OutputFormat::Pretty => serde_json::to_string_pretty(msg),
        };
        println!("{}", line.unwrap_or_default());
    }
}

/// Keep only the named streams (comma-separated); all when `None` or empty
fn filter_catalog(catalog: ConfiguredCatalog, streams: Option<&str>) -> Result<ConfiguredCatalog> {
    let Some(filter) = streams.filter(|s| !s.trim().is_empty()) else {
        return Ok(catalog);
    };
    let wanted: Vec<&str> = filter.split(',').map(str::trim).collect();

    if let Some(missing) = wanted
        .iter()
        .find(|name| !catalog.streams.iter().any(|s| s.stream.name == **name))
    {
        return Err(Error::StreamNotFound {
            stream: (*missing).to_string(),
        });
    }

    Ok(ConfiguredCatalog {
        streams: catalog
            .streams
            .into_iter()
            .filter(|s| wanted.contains(&s.stream.name.as_str()))
            .collect(),
    })
}

/// Protocol line for an engine message
///
/// Stream status is folded into the sync summary rather than printed.
fn protocol_message(msg: &Message) -> Option<JsonValue> {
    match msg {
        Message::Record { stream, data } => Some(json!({
            "type": "RECORD",
            "record": {
                "stream": stream,
                "data": data,
                "emitted_at": chrono::Utc::now().timestamp_millis()
            }
        })),
        Message::State { stream, data } => Some(json!({
            "type": "STATE",
            "state": {
                "type": "STREAM",
                "stream": {
                    "stream_descriptor": {
                        "name": stream
                    },
                    "stream_state": data
                }
            }
        })),
        Message::Log { level, message } => Some(log_message(level.as_str(), message)),
        Message::StreamStatus { .. } => None,
    }
}

fn log_message(level: &str, message: &str) -> JsonValue {
    json!({
        "type": "LOG",
        "log": {
            "level": level,
            "message": message
        }
    })
}

fn summary_status(successful: usize, failed: usize) -> &'static str {
    if failed == 0 {
        "SUCCEEDED"
    } else if successful == 0 {
        "FAILED"
    } else {
        "PARTIAL"
    }
}
