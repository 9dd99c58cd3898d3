// src/page/fetch.rs
// =============================================================================
// This module downloads page markup.
//
// The crawler only knows the PageFetcher trait, so tests can swap the
// network for an in-memory site. HttpFetcher is the real implementation:
// - GET the URL (redirects are followed by reqwest)
// - anything but 200 is an error, the body is left unread
// - the full body is read into memory as text
//
// No retries here. Whether a failure kills the crawl or just one branch is
// the crawler's decision.
// =============================================================================

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

use crate::error::CrawlError;

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Returns the body of `url` as text.
    async fn fetch(&self, url: &Url) -> Result<String, CrawlError>;
}

/// Fetches pages over HTTP with one shared, connection-pooling client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, CrawlError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| CrawlError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        tracing::trace!(%status, "response received");

        // Dropping the response here closes the connection without
        // reading the body
        if status != StatusCode::OK {
            return Err(CrawlError::UnexpectedStatus(status.as_u16()));
        }

        response.text().await.map_err(|source| CrawlError::Read {
            url: url.to_string(),
            source,
        })
    }
}

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
