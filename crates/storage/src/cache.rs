//! Typed snapshots over the client key/value cache.
//!
//! Reads fail open: a missing key, an unreadable backend or a value that does
//! not parse all come back as an empty collection. Writes serialize the whole
//! structure every time.

use std::sync::Arc;

use serde_json::Error as JsonError;
use sheet_core::model::{CompletedSet, Sheet};

use crate::repository::{ADMIN_MODE_KEY, COMPLETED_KEY, CacheRepository, SHEET_KEY, StorageError};

#[derive(Clone)]
pub struct ClientCache {
    repo: Arc<dyn CacheRepository>,
}

fn ser(e: JsonError) -> StorageError {
    StorageError::Serialization(e.to_string())
}

impl ClientCache {
    #[must_use]
    pub fn new(repo: Arc<dyn CacheRepository>) -> Self {
        Self { repo }
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.repo.get(key).await {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(key, error = %err, "cache read failed; using empty value");
                None
            }
        }
    }

    /// Load the cached sheet, or an empty sheet.
    pub async fn load_sheet(&self) -> Sheet {
        let Some(raw) = self.read(SHEET_KEY).await else {
            return Sheet::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            tracing::warn!(key = SHEET_KEY, error = %err, "discarding malformed cached sheet");
            Sheet::new()
        })
    }

    /// Load the cached completed set, or an empty set.
    pub async fn load_completed(&self) -> CompletedSet {
        let Some(raw) = self.read(COMPLETED_KEY).await else {
            return CompletedSet::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            tracing::warn!(key = COMPLETED_KEY, error = %err, "discarding malformed completed set");
            CompletedSet::new()
        })
    }

    /// Load the admin display flag.
    ///
    /// On first run the key is absent; the flag defaults to `true` and that
    /// default is written back.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the first-run default cannot be stored.
    pub async fn load_admin_mode(&self) -> Result<bool, StorageError> {
        match self.read(ADMIN_MODE_KEY).await {
            Some(raw) => Ok(raw == "true"),
            None => {
                self.save_admin_mode(true).await?;
                Ok(true)
            }
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if serialization or the backend write fails.
    pub async fn save_sheet(&self, sheet: &Sheet) -> Result<(), StorageError> {
        let raw = serde_json::to_string(sheet).map_err(ser)?;
        self.repo.put(SHEET_KEY, &raw).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if serialization or the backend write fails.
    pub async fn save_completed(&self, completed: &CompletedSet) -> Result<(), StorageError> {
        let raw = serde_json::to_string(completed).map_err(ser)?;
        self.repo.put(COMPLETED_KEY, &raw).await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the backend write fails.
    pub async fn save_admin_mode(&self, enabled: bool) -> Result<(), StorageError> {
        self.repo
            .put(ADMIN_MODE_KEY, if enabled { "true" } else { "false" })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryRepository;
    use sheet_core::model::{QuestionId, Topic, TopicId};

    fn cache() -> (InMemoryRepository, ClientCache) {
        let repo = InMemoryRepository::new();
        (repo.clone(), ClientCache::new(Arc::new(repo)))
    }

    #[tokio::test]
    async fn missing_keys_load_empty() {
        let (_, cache) = cache();
        assert!(cache.load_sheet().await.is_empty());
        assert!(cache.load_completed().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_values_load_empty() {
        let (repo, cache) = cache();
        repo.put(SHEET_KEY, "{not json").await.unwrap();
        repo.put(COMPLETED_KEY, r#"{"a": 1}"#).await.unwrap();
        assert!(cache.load_sheet().await.is_empty());
        assert!(cache.load_completed().await.is_empty());
    }

    #[tokio::test]
    async fn snapshots_round_trip() {
        let (repo, cache) = cache();
        let sheet = Sheet::from_topics(vec![Topic::new(TopicId::from("t1"), "Arrays")]);
        let completed: CompletedSet = [QuestionId::from("q1")].into_iter().collect();

        cache.save_sheet(&sheet).await.unwrap();
        cache.save_completed(&completed).await.unwrap();

        assert_eq!(cache.load_sheet().await, sheet);
        assert_eq!(cache.load_completed().await, completed);
        assert_eq!(
            repo.get(COMPLETED_KEY).await.unwrap().as_deref(),
            Some(r#"["q1"]"#)
        );
    }

    #[tokio::test]
    async fn admin_mode_defaults_on_and_is_written_back() {
        let (repo, cache) = cache();
        assert!(cache.load_admin_mode().await.unwrap());
        assert_eq!(repo.get(ADMIN_MODE_KEY).await.unwrap().as_deref(), Some("true"));

        cache.save_admin_mode(false).await.unwrap();
        assert!(!cache.load_admin_mode().await.unwrap());
    }
}
