use std::sync::Arc;

use sheet_core::import;
use sheet_core::progress::count_questions;

use crate::remote::TopicRemote;
use crate::sheet_service::SheetService;

/// What a hydration attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrationOutcome {
    /// The sheet was empty and now holds the grouped dataset.
    Hydrated { topics: usize, questions: usize },
    /// The sheet already had topics; nothing was fetched.
    Skipped,
    /// The dataset was fetched but held no records.
    EmptyDataset,
    /// Fetching the dataset failed. The sheet is unchanged.
    Failed(String),
}

/// Seeds an empty sheet from the external question dataset.
pub struct HydrationService {
    remote: Arc<dyn TopicRemote>,
}

impl HydrationService {
    #[must_use]
    pub fn new(remote: Arc<dyn TopicRemote>) -> Self {
        Self { remote }
    }

    /// Fetch and group the dataset when the store has no topics yet.
    ///
    /// Never fails: fetch and cache errors are logged and reported through
    /// the returned outcome. The emptiness check is repeated atomically before
    /// the swap, so a topic added while the fetch was in flight wins.
    pub async fn hydrate_if_empty(&self, store: &SheetService) -> HydrationOutcome {
        if !store.read(|sheet, _| sheet.is_empty()).await {
            return HydrationOutcome::Skipped;
        }

        let records = match self.remote.fetch_dataset().await {
            Ok(dataset) => dataset.into_records(),
            Err(err) => {
                tracing::error!(error = %err, "failed to fetch question dataset");
                return HydrationOutcome::Failed(err.to_string());
            }
        };
        if records.is_empty() {
            tracing::warn!("question dataset is empty; sheet left as is");
            return HydrationOutcome::EmptyDataset;
        }

        let topics = import::group_records(records);
        let topic_count = topics.len();
        let questions: usize = topics.iter().map(count_questions).sum();

        match store.hydrate_if_empty(topics).await {
            Ok(true) => {
                tracing::info!(topics = topic_count, questions, "sheet hydrated from dataset");
                HydrationOutcome::Hydrated {
                    topics: topic_count,
                    questions,
                }
            }
            Ok(false) => HydrationOutcome::Skipped,
            Err(err) => {
                tracing::error!(error = %err, "failed to cache hydrated sheet");
                HydrationOutcome::Failed(err.to_string())
            }
        }
    }
}
