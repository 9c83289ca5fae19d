// =============================================================================
// HTTP transport — shared reqwest client for the public market-data APIs
// =============================================================================
//
// Only unauthenticated GET requests are needed.  The per-attempt wall-clock
// budget is enforced one level up by the retry loop, so the client itself
// only carries a connect timeout.
// =============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::future::BoxFuture;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde_json::Value;
use tracing::{debug, instrument};

use super::Transport;
use crate::config::FetcherConfig;
use crate::fetcher::FetchError;

/// reqwest-backed [`Transport`].
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport from the fetcher configuration.
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .user_agent(config.user_agent.as_str())
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .build()
            .context("failed to build reqwest client")?;

        debug!(user_agent = %config.user_agent, "HttpTransport initialised");
        Ok(Self { client })
    }

    #[instrument(skip(self), name = "http::get_json")]
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        let resp = self.client.get(url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            debug!(%status, "non-success status");
            return Err(FetchError::Status(status.as_u16()));
        }

        let bytes = resp.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes)?;
        Ok(body)
    }
}

impl Transport for HttpTransport {
    fn get_json<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Value, FetchError>> {
        Box::pin(self.fetch(url))
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport").finish_non_exhaustive()
    }
}
