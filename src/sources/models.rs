// =============================================================================
// Remote data models — the shapes handed to callers for each endpoint
// =============================================================================
//
// Field names follow the live JSON so that a serialised value is a drop-in
// replacement for the parsed third-party response.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::types::PriceSeries;

/// Currency code (`"usd"`, `"brl"`, ...) to amount.
pub type CurrencyMap = BTreeMap<String, f64>;

/// One row of the `/coins/markets` ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCoin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub total_volume: Option<f64>,
}

/// Flattened `/coins/{id}` detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinDetail {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub current_price: CurrencyMap,
    #[serde(default)]
    pub market_cap: CurrencyMap,
    #[serde(default)]
    pub total_volume: CurrencyMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub sparkline_7d: Vec<f64>,
}

/// `/coins/{id}/market_chart` history; only the price line is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketChart {
    pub prices: PriceSeries,
}

/// One `/search` hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCoin {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb: Option<String>,
}

/// A news article, normalised from the CryptoCompare feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub body: String,
    pub url: String,
    pub imageurl: String,
    pub source: String,
    /// Pipe-separated tags, e.g. `"Bitcoin|Market"`.
    pub tags: String,
    /// Publication time in epoch seconds.
    pub published_on: i64,
}

/// The `data` object of CoinGecko's `/global` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    #[serde(default)]
    pub active_cryptocurrencies: u64,
    #[serde(default)]
    pub upcoming_icos: u64,
    #[serde(default)]
    pub ongoing_icos: u64,
    #[serde(default)]
    pub ended_icos: u64,
    #[serde(default)]
    pub markets: u64,
    #[serde(default)]
    pub total_market_cap: CurrencyMap,
    #[serde(default)]
    pub total_volume: CurrencyMap,
    #[serde(default)]
    pub market_cap_percentage: CurrencyMap,
    #[serde(default, deserialize_with = "null_as_default")]
    pub market_cap_change_percentage_24h_usd: f64,
    #[serde(default)]
    pub updated_at: i64,
}

/// Treat an explicit JSON `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
