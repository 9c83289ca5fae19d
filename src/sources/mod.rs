//! Remote market-data sources: the transport seam plus URL building and
//! response parsing for CoinGecko and CryptoCompare.

pub mod client;
pub mod coingecko;
pub mod cryptocompare;
pub mod models;

use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::fetcher::FetchError;

pub use client::HttpTransport;
pub use coingecko::CoinGecko;
pub use cryptocompare::CryptoCompare;
pub use models::{CoinDetail, GlobalStats, MarketChart, MarketCoin, NewsItem, SearchCoin};

/// Something that can GET a URL and hand back parsed JSON.
///
/// The production implementation is [`HttpTransport`]; tests substitute
/// in-memory stubs.
pub trait Transport: Send + Sync {
    fn get_json<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Value, FetchError>>;
}
