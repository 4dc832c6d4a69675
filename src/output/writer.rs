//! JSON-lines record writer

use super::paths::partitioned_dir_for;
use crate::error::{Error, Result};
use crate::types::JsonObject;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Appends records to `{base}/{stream}/dt={date}/data.jsonl`
///
/// The partition date is fixed when the writer is created, so a sync that
/// runs past midnight keeps writing to one partition.
pub struct JsonlWriter {
    base: PathBuf,
    date: NaiveDate,
    files: HashMap<String, (PathBuf, BufWriter<File>)>,
    rows_written: usize,
}

impl JsonlWriter {
    /// Create a writer rooted at `base`
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self::for_date(base, Utc::now().date_naive())
    }

    /// Create a writer for an explicit partition date
    pub fn for_date(base: impl AsRef<Path>, date: NaiveDate) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
            date,
            files: HashMap::new(),
            rows_written: 0,
        }
    }

    /// Append one record for `stream`
    pub fn write(&mut self, stream: &str, record: &JsonObject) -> Result<()> {
        if !self.files.contains_key(stream) {
            let opened = self.open(stream)?;
            self.files.insert(stream.to_string(), opened);
        }
        let Some((path, writer)) = self.files.get_mut(stream) else {
            return Err(Error::output(format!("No output file for {stream}")));
        };

        serde_json::to_writer(&mut *writer, record)?;
        writer
            .write_all(b"\n")
            .map_err(|e| Error::output(format!("Failed to write {}: {e}", path.display())))?;
        self.rows_written += 1;
        Ok(())
    }

    /// Flush every open file
    pub fn flush(&mut self) -> Result<()> {
        for (path, writer) in self.files.values_mut() {
            writer
                .flush()
                .map_err(|e| Error::output(format!("Failed to flush {}: {e}", path.display())))?;
        }
        Ok(())
    }

    /// Path written for `stream`, once it has received a record
    pub fn path_for(&self, stream: &str) -> Option<&Path> {
        self.files.get(stream).map(|(path, _)| path.as_path())
    }

    /// Total records written
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Base directory
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn open(&self, stream: &str) -> Result<(PathBuf, BufWriter<File>)> {
        let dir = PathBuf::from(partitioned_dir_for(
            &self.base.to_string_lossy(),
            stream,
            self.date,
        ));
        fs::create_dir_all(&dir)
            .map_err(|e| Error::output(format!("Failed to create {}: {e}", dir.display())))?;

        let path = dir.join("data.jsonl");
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| Error::output(format!("Failed to open {}: {e}", path.display())))?;
        debug!("Writing {} records to {}", stream, path.display());
        Ok((path, BufWriter::new(file)))
    }
}

impl Drop for JsonlWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

impl std::fmt::Debug for JsonlWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonlWriter")
            .field("base", &self.base)
            .field("date", &self.date)
            .field("streams", &self.files.len())
            .field("rows_written", &self.rows_written)
            .finish()
    }
}
