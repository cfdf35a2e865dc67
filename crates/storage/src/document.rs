//! Server-side document store: a single JSON array in one file.
//!
//! Every create/update/delete reads the whole array, changes it and writes the
//! whole array back. There is no lock and no revision token around that cycle,
//! so two concurrent writers can lose an update. A single write is atomic:
//! the new array goes to a uniquely named sibling temp file which is then
//! renamed over the document.
//!
//! Records are opaque JSON values. Updates and deletes match on the top-level
//! `"id"` field only and know nothing about nested subtopics or questions.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentError {
    #[error("document i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("document could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct JsonDocumentStore {
    path: PathBuf,
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

impl JsonDocumentStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record.
    ///
    /// A missing file is initialized to `[]`. An empty, unreadable or corrupt
    /// file reads as no records; nothing is salvaged from it.
    #[must_use]
    pub fn read_all(&self) -> Vec<Value> {
        if !self.path.exists() {
            if let Err(err) = self.write_all(&[]) {
                tracing::error!(path = %self.path.display(), error = %err, "failed to initialize document");
            }
            return Vec::new();
        }

        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::error!(path = %self.path.display(), error = %err, "document read failed");
                return Vec::new();
            }
        };
        if raw.trim().is_empty() {
            return Vec::new();
        }

        match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(records) => records,
            Err(err) => {
                tracing::error!(path = %self.path.display(), error = %err, "document is corrupt; treating as empty");
                Vec::new()
            }
        }
    }

    /// Replace the whole document.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError` if encoding or any file operation fails; the
    /// previous document is left in place in that case.
    pub fn write_all(&self, records: &[Value]) -> Result<(), DocumentError> {
        let encoded = serde_json::to_string_pretty(records)?;
        let parent = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent)?;
                parent
            }
            None => Path::new("."),
        };
        // One temp file per write, so concurrent writers never rename each other's file.
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(encoded.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }

    /// Append a record and return it unchanged.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError` if the document cannot be rewritten.
    pub fn append(&self, record: Value) -> Result<Value, DocumentError> {
        let mut records = self.read_all();
        records.push(record.clone());
        self.write_all(&records)?;
        Ok(record)
    }

    /// Remove every record whose `id` equals `id`. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError` if the document cannot be rewritten.
    pub fn remove(&self, id: &str) -> Result<usize, DocumentError> {
        let mut records = self.read_all();
        let before = records.len();
        records.retain(|r| record_id(r) != Some(id));
        self.write_all(&records)?;
        Ok(before - records.len())
    }

    /// Replace every record whose `id` equals `id`. Returns how many were replaced.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError` if the document cannot be rewritten.
    pub fn replace(&self, id: &str, record: &Value) -> Result<usize, DocumentError> {
        let mut records = self.read_all();
        let mut replaced = 0;
        for slot in records.iter_mut().filter(|r| record_id(r) == Some(id)) {
            *slot = record.clone();
            replaced += 1;
        }
        self.write_all(&records)?;
        Ok(replaced)
    }
}
