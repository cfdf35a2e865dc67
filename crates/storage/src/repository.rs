use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Cache key holding the serialized topic sequence.
pub const SHEET_KEY: &str = "sheet";
/// Cache key holding the serialized completed-id list.
pub const COMPLETED_KEY: &str = "completedQuestions";
/// Cache key holding the admin display flag (`"true"` / `"false"`).
pub const ADMIN_MODE_KEY: &str = "adminMode";

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Durable client-side key/value cache.
///
/// Values are whole snapshots; every write replaces the previous value.
#[async_trait]
pub trait CacheRepository: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheRepository for InMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Cache backend behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub cache: Arc<dyn CacheRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let cache: Arc<dyn CacheRepository> = Arc::new(InMemoryRepository::new());
        Self { cache }
    }
}
