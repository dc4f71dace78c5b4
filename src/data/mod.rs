//! Feed retrieval.
//!
//! The aggregator only needs "text in, or a typed failure", so retrieval is
//! a trait and the HTTP client is one implementation of it.

pub mod http;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::region::Region;

pub use http::HttpFeedSource;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unreadable body: {0}")]
    Body(String),
}

/// Anything that can produce the raw feed for a region.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the region's current raw feed.
    async fn fetch(&self, region: &Region) -> Result<String, FetchError>;

    /// Human-readable name of this source.
    fn name(&self) -> &str;
}
