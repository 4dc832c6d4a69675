//! State manager implementation
//!
//! Provides file-based state persistence with atomic writes.

use super::types::State;
use crate::error::{Error, Result};
use crate::types::JsonObject;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// State manager for persisting and loading state
#[derive(Debug)]
pub struct StateManager {
    /// Path to the state file (empty for in-memory mode)
    path: PathBuf,
    /// Current state (cached)
    state: Arc<RwLock<State>>,
    /// Whether to save on every update
    auto_save: bool,
}

impl StateManager {
    /// Create an in-memory state manager (no file persistence)
    pub fn in_memory() -> Self {
        Self::with_state(PathBuf::new(), State::new(), false)
    }

    fn with_state(path: PathBuf, state: State, auto_save: bool) -> Self {
        Self {
            path,
            state: Arc::new(RwLock::new(state)),
            auto_save,
        }
    }

    /// Create a state manager from a file, loading existing state if present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::state(format!("Failed to read state file: {e}")))?;
            parse_state(&contents)?
        } else {
            State::new()
        };

        Ok(Self::with_state(path, state, false))
    }

    /// Create a state manager from inline JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::with_state(PathBuf::new(), parse_state(json)?, false))
    }

    /// Save after every stream update
    #[must_use]
    pub fn with_auto_save(mut self, auto_save: bool) -> Self {
        self.auto_save = auto_save;
        self
    }

    /// Save current state to the configured file
    pub async fn save(&self) -> Result<()> {
        if self.is_in_memory() {
            return Ok(());
        }
        self.save_to_file(&self.path).await
    }

    /// Save state to a specific file path
    ///
    /// Writes a temp file next to the target, then renames it into place.
    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let contents = self.to_json_pretty().await?;

        let path = path.as_ref();
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::state(format!("Failed to write state file: {e}")))?;

        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|e| Error::state(format!("Failed to rename state file: {e}")))?;

        debug!("State saved to {}", path.display());
        Ok(())
    }

    /// Snapshot of the current state
    pub async fn snapshot(&self) -> State {
        self.state.read().await.clone()
    }

    /// Persisted cursor mapping of a stream (empty if none)
    pub async fn get_stream_state(&self, stream: &str) -> JsonObject {
        let state = self.state.read().await;
        state.get_stream(stream).cloned().unwrap_or_default()
    }

    /// Replace the cursor mapping of a stream
    pub async fn set_stream_state(&self, stream: &str, stream_state: JsonObject) -> Result<()> {
        {
            let mut state = self.state.write().await;
            state.set_stream(stream, stream_state);
        }

        if self.auto_save {
            self.save().await?;
        }

        Ok(())
    }

    /// Export state as JSON string
    pub async fn to_json(&self) -> Result<String> {
        let state = self.state.read().await;
        serde_json::to_string(&*state)
            .map_err(|e| Error::state(format!("Failed to serialize state: {e}")))
    }

    /// Export state as pretty-printed JSON string
    pub async fn to_json_pretty(&self) -> Result<String> {
        let state = self.state.read().await;
        serde_json::to_string_pretty(&*state)
            .map_err(|e| Error::state(format!("Failed to serialize state: {e}")))
    }

    /// Get the state file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if using in-memory mode
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str().is_empty()
    }
}

fn parse_state(contents: &str) -> Result<State> {
    if contents.trim().is_empty() {
        return Ok(State::new());
    }
    serde_json::from_str(contents).map_err(|e| Error::state(format!("Failed to parse state: {e}")))
}
