// =============================================================================
// SafeFetcher — resilient access to the six market-data endpoints
// =============================================================================
//
// Every call follows the same path:
//
//   Idle → Attempting(n) ─┬─ ok ──────────────────────────→ live envelope
//                         ├─ retryable, budget left ──────→ Attempting(n+1)
//                         ├─ exhausted / non-retryable ───→ mock envelope
//                         └─ cancelled ───────────────────→ None
//
// A call never fails: it either yields live data, yields bundled sample data
// with `is_mock = true` and an advisory, or is cancelled by the caller.
// =============================================================================

pub mod cancel;
pub mod error;
pub mod retry;

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

pub use cancel::CancelToken;
pub use error::FetchError;
pub use retry::{with_retry, RetryPolicy};

use crate::config::FetcherConfig;
use crate::mock;
use crate::sources::{
    coingecko, cryptocompare, CoinDetail, CoinGecko, CryptoCompare, GlobalStats, HttpTransport,
    MarketChart, MarketCoin, NewsItem, SearchCoin, Transport,
};

/// Shortest trimmed search query that reaches the network.
pub const MIN_SEARCH_LEN: usize = 2;

const FALLBACK_ADVISORY: &str = "sample data, live API unavailable";

// =============================================================================
// Envelope
// =============================================================================

/// `{ data, isMock, error? }` returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult<T> {
    pub data: T,
    pub is_mock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> FetchResult<T> {
    pub fn live(data: T) -> Self {
        Self {
            data,
            is_mock: false,
            error: None,
        }
    }

    pub fn mock(data: T, advisory: impl Into<String>) -> Self {
        Self {
            data,
            is_mock: true,
            error: Some(advisory.into()),
        }
    }
}

// =============================================================================
// Queries
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketsQuery {
    pub vs_currency: String,
    pub per_page: u32,
    pub page: u32,
    pub order: String,
}

impl Default for MarketsQuery {
    fn default() -> Self {
        Self {
            vs_currency: "usd".to_string(),
            per_page: 25,
            page: 1,
            order: "market_cap_desc".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartQuery {
    pub id: String,
    pub vs_currency: String,
    pub days: u32,
}

impl ChartQuery {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            vs_currency: "usd".to_string(),
            days: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewsQuery {
    /// Feed language; `None` uses the configured default.
    pub lang: Option<String>,
    pub categories: Vec<String>,
    pub exclude_categories: Vec<String>,
    pub page_size: usize,
    /// Drop articles older than this many days.
    pub max_age_days: Option<f64>,
}

impl Default for NewsQuery {
    fn default() -> Self {
        Self {
            lang: None,
            categories: Vec::new(),
            exclude_categories: Vec::new(),
            page_size: 24,
            max_age_days: None,
        }
    }
}

// =============================================================================
// SafeFetcher
// =============================================================================

/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct SafeFetcher {
    transport: Arc<dyn Transport>,
    gecko: CoinGecko,
    compare: CryptoCompare,
    policy: RetryPolicy,
    chart_fallback_days: Option<u32>,
    news_lang: String,
}

impl std::fmt::Debug for SafeFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafeFetcher")
            .field("gecko", &self.gecko)
            .field("compare", &self.compare)
            .field("policy", &self.policy)
            .field("chart_fallback_days", &self.chart_fallback_days)
            .finish_non_exhaustive()
    }
}

impl SafeFetcher {
    /// Fetcher backed by a real HTTP client.
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        let transport = HttpTransport::new(config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: &FetcherConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        Ok(Self {
            transport,
            gecko: CoinGecko::new(&config.coingecko_base_url)?,
            compare: CryptoCompare::new(&config.cryptocompare_base_url)?,
            policy: RetryPolicy::from_config(config),
            chart_fallback_days: config.chart_fallback_days,
            news_lang: config.news_lang.clone(),
        })
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    // -------------------------------------------------------------------------
    // Endpoints
    // -------------------------------------------------------------------------

    /// Ranked market list. The mock fallback is paged like the live endpoint.
    #[instrument(skip(self, cancel), fields(request_id = %Uuid::new_v4()))]
    pub async fn markets(
        &self,
        query: &MarketsQuery,
        cancel: Option<&CancelToken>,
    ) -> Option<FetchResult<Vec<MarketCoin>>> {
        let url = self
            .gecko
            .markets_url(&query.vs_currency, &query.order, query.per_page, query.page);
        let outcome = self
            .get(&self.policy, cancel, "markets", url.as_str(), coingecko::parse_markets)
            .await;
        settle("markets", outcome, || mock::markets(query.per_page, query.page))
    }

    #[instrument(skip(self, cancel), fields(request_id = %Uuid::new_v4()))]
    pub async fn coin_detail(
        &self,
        id: &str,
        cancel: Option<&CancelToken>,
    ) -> Option<FetchResult<CoinDetail>> {
        let url = self.gecko.coin_detail_url(id);
        let outcome = self
            .get(&self.policy, cancel, "coin_detail", url.as_str(), coingecko::parse_coin_detail)
            .await;
        settle("coin_detail", outcome, || mock::coin_detail(id))
    }

    /// Price history. When the requested range keeps failing, one attempt is
    /// made at `chart_fallback_days` before falling back to sample data.
    #[instrument(skip(self, cancel), fields(request_id = %Uuid::new_v4()))]
    pub async fn market_chart(
        &self,
        query: &ChartQuery,
        cancel: Option<&CancelToken>,
    ) -> Option<FetchResult<MarketChart>> {
        let url = self.gecko.market_chart_url(&query.id, &query.vs_currency, query.days);
        let mut outcome = self
            .get(&self.policy, cancel, "market_chart", url.as_str(), coingecko::parse_market_chart)
            .await;

        let fallback_days = match (&outcome, self.chart_fallback_days) {
            (Err(err), Some(days)) if err.is_retryable() && days != query.days => Some(days),
            _ => None,
        };
        if let Some(days) = fallback_days {
            debug!(requested = query.days, fallback = days, "retrying chart with fallback range");
            let url = self.gecko.market_chart_url(&query.id, &query.vs_currency, days);
            outcome = self
                .get(
                    &self.policy.single_attempt(),
                    cancel,
                    "market_chart",
                    url.as_str(),
                    coingecko::parse_market_chart,
                )
                .await;
        }

        settle("market_chart", outcome, || mock::market_chart(query.days, Utc::now()))
    }

    /// Coin search. Queries shorter than two characters (after trimming)
    /// return an empty live result without touching the network.
    #[instrument(skip(self, cancel), fields(request_id = %Uuid::new_v4()))]
    pub async fn search(
        &self,
        query: &str,
        cancel: Option<&CancelToken>,
    ) -> Option<FetchResult<Vec<SearchCoin>>> {
        if query.trim().chars().count() < MIN_SEARCH_LEN {
            return Some(FetchResult::live(Vec::new()));
        }
        let url = self.gecko.search_url(query);
        let outcome = self
            .get(&self.policy, cancel, "search", url.as_str(), coingecko::parse_search)
            .await;
        settle("search", outcome, || mock::search(query))
    }

    /// News feed, shaped by age, recency and page size on both paths.
    #[instrument(skip(self, cancel), fields(request_id = %Uuid::new_v4()))]
    pub async fn news(
        &self,
        query: &NewsQuery,
        cancel: Option<&CancelToken>,
    ) -> Option<FetchResult<Vec<NewsItem>>> {
        let lang = query.lang.as_deref().unwrap_or(&self.news_lang);
        let url = self
            .compare
            .news_url(lang, &query.categories, &query.exclude_categories);
        let now = Utc::now();
        let outcome = self
            .get(&self.policy, cancel, "news", url.as_str(), |body| {
                cryptocompare::parse_news(body, now.timestamp())
            })
            .await;

        let shape = |items| {
            cryptocompare::shape_news(items, query.max_age_days, query.page_size, now.timestamp())
        };
        settle("news", outcome.map(shape), || shape(mock::news(now)))
    }

    #[instrument(skip(self, cancel), fields(request_id = %Uuid::new_v4()))]
    pub async fn global_stats(&self, cancel: Option<&CancelToken>) -> Option<FetchResult<GlobalStats>> {
        let url = self.gecko.global_url();
        let outcome = self
            .get(&self.policy, cancel, "global_stats", url.as_str(), coingecko::parse_global)
            .await;
        settle("global_stats", outcome, || mock::global_stats(Utc::now()))
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    /// GET `url` under `policy` and parse the body with `parse`.
    async fn get<T, P>(
        &self,
        policy: &RetryPolicy,
        cancel: Option<&CancelToken>,
        endpoint: &'static str,
        url: &str,
        parse: P,
    ) -> Result<T, FetchError>
    where
        P: Fn(&serde_json::Value) -> Result<T, FetchError>,
    {
        let transport = self.transport.as_ref();
        let parse = &parse;
        with_retry(policy, cancel, endpoint, move || async move {
            let body = transport.get_json(url).await?;
            parse(&body)
        })
        .await
    }
}

/// Turn the outcome of a call into the envelope handed to callers.
fn settle<T>(
    endpoint: &'static str,
    outcome: Result<T, FetchError>,
    fallback: impl FnOnce() -> T,
) -> Option<FetchResult<T>> {
    match outcome {
        Ok(data) => Some(FetchResult::live(data)),
        Err(err) if err.is_cancelled() => {
            debug!(endpoint, "request cancelled");
            None
        }
        Err(err) => {
            warn!(endpoint, error = %err, "live request failed, serving sample data");
            Some(FetchResult::mock(fallback(), format!("{FALLBACK_ADVISORY} ({err})")))
        }
    }
}
