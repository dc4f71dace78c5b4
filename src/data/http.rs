//! HTTP feed source over reqwest.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::data::{FeedSource, FetchError};
use crate::region::Region;

pub struct HttpFeedSource {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFeedSource {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    fn classify(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self, region: &Region) -> Result<String, FetchError> {
        let response = self
            .client
            .get(region.source_url())
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| match self.classify(e) {
            FetchError::Transport(msg) => FetchError::Body(msg),
            other => other,
        })?;

        debug!(region = region.region_id(), bytes = body.len(), "Feed fetched");
        Ok(body)
    }

    fn name(&self) -> &str {
        "http"
    }
}
