//! HTTP exposition fetcher.
//!
//! Issues a plain GET per cycle. No timeout applies unless the job sets one.

use reqwest::Client;
use tokio::time::timeout;

use crate::collector::{CollectorError, Fetcher};
use crate::job::Job;

/// Fetches exposition text over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with a fresh HTTP client.
    ///
    /// # Errors
    /// Returns `CollectorError::Config` if the HTTP client cannot be built.
    pub fn new() -> Result<Self, CollectorError> {
        let client = Client::builder()
            .user_agent(concat!("tcp-importer/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CollectorError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Create a fetcher around an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn get(&self, url: &str) -> Result<String, CollectorError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CollectorError::Status(status.as_u16()));
        }
        Ok(response.text().await?)
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, job: &Job) -> Result<String, CollectorError> {
        let body = match job.timeout {
            Some(limit) => timeout(limit, self.get(&job.url))
                .await
                .map_err(|_| CollectorError::Timeout)??,
            None => self.get(&job.url).await?,
        };

        tracing::debug!(job = %job.name, url = %job.url, bytes = body.len(), "Fetched exposition");
        Ok(body)
    }
}
