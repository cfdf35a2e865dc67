use async_trait::async_trait;
use reqwest::{Client, Response};
use sheet_core::import::Dataset;
use sheet_core::model::{Topic, TopicId};
use url::Url;

use crate::config::SheetConfig;
use crate::error::RemoteError;

/// Remote CRUD interface over topic-level records.
///
/// The remote side only knows top-level records; nested changes are sent as a
/// full replacement of the owning topic.
#[async_trait]
pub trait TopicRemote: Send + Sync {
    /// `GET /sheet`: the external question dataset.
    async fn fetch_dataset(&self) -> Result<Dataset, RemoteError>;

    /// `POST /topic`: returns the record echoed back by the server.
    async fn create_topic(&self, topic: &Topic) -> Result<Topic, RemoteError>;

    /// `PUT /topic/{id}`
    async fn replace_topic(&self, topic: &Topic) -> Result<(), RemoteError>;

    /// `DELETE /topic/{id}`
    async fn delete_topic(&self, id: &TopicId) -> Result<(), RemoteError>;
}

/// `reqwest` client for the sheet API.
///
/// Requests are bounded by the configured timeout and never retried.
#[derive(Clone)]
pub struct SheetApi {
    client: Client,
    config: SheetConfig,
}

impl SheetApi {
    /// # Errors
    ///
    /// Returns `RemoteError` if the HTTP client cannot be built.
    pub fn new(config: SheetConfig) -> Result<Self, RemoteError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    fn topic_url(&self, id: &TopicId) -> Result<Url, RemoteError> {
        let raw = self.config.endpoint("topic");
        let mut url = Url::parse(&raw).map_err(|e| RemoteError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| RemoteError::InvalidUrl(raw.clone()))?
            .push(id.as_str());
        Ok(url)
    }
}

fn ensure_success(response: Response) -> Result<Response, RemoteError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(RemoteError::HttpStatus(response.status()))
    }
}

#[async_trait]
impl TopicRemote for SheetApi {
    async fn fetch_dataset(&self) -> Result<Dataset, RemoteError> {
        let response = self.client.get(self.config.endpoint("sheet")).send().await?;
        let dataset = ensure_success(response)?.json::<Dataset>().await?;
        Ok(dataset)
    }

    async fn create_topic(&self, topic: &Topic) -> Result<Topic, RemoteError> {
        let response = self
            .client
            .post(self.config.endpoint("topic"))
            .json(topic)
            .send()
            .await?;
        let created = ensure_success(response)?.json::<Topic>().await?;
        Ok(created)
    }

    async fn replace_topic(&self, topic: &Topic) -> Result<(), RemoteError> {
        let response = self
            .client
            .put(self.topic_url(topic.id())?)
            .json(topic)
            .send()
            .await?;
        ensure_success(response)?;
        Ok(())
    }

    async fn delete_topic(&self, id: &TopicId) -> Result<(), RemoteError> {
        let response = self.client.delete(self.topic_url(id)?).send().await?;
        ensure_success(response)?;
        Ok(())
    }
}
