// =============================================================================
// CoinGecko — URL building and response parsing
// =============================================================================
//
// Endpoints used:
//   GET /coins/markets             ranked market list
//   GET /coins/{id}                coin detail (flattened here)
//   GET /coins/{id}/market_chart   price history, `prices: [[ms, price], ...]`
//   GET /search                    coin discovery by name / symbol
//   GET /global                    global market totals
//
// Parsers take an already-decoded `serde_json::Value` and return
// `FetchError::Malformed` when a field the caller depends on is missing.
// =============================================================================

use anyhow::{bail, Context, Result};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::models::{CoinDetail, CurrencyMap, GlobalStats, MarketChart, MarketCoin, SearchCoin};
use crate::fetcher::FetchError;
use crate::types::PricePoint;

/// Maximum number of search hits returned to callers.
pub const SEARCH_LIMIT: usize = 10;

/// CoinGecko endpoint builder.
#[derive(Debug, Clone)]
pub struct CoinGecko {
    base: Url,
}

impl CoinGecko {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("invalid CoinGecko base URL '{base_url}'"))?;
        if base.cannot_be_a_base() {
            bail!("CoinGecko base URL '{base_url}' cannot carry a path");
        }
        Ok(Self { base })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    // -------------------------------------------------------------------------
    // URL builders
    // -------------------------------------------------------------------------

    pub fn markets_url(&self, vs_currency: &str, order: &str, per_page: u32, page: u32) -> Url {
        let mut url = self.endpoint(&["coins", "markets"]);
        url.query_pairs_mut()
            .append_pair("vs_currency", vs_currency)
            .append_pair("order", order)
            .append_pair("per_page", &per_page.to_string())
            .append_pair("page", &page.to_string())
            .append_pair("sparkline", "false")
            .append_pair("price_change_percentage", "24h");
        url
    }

    pub fn coin_detail_url(&self, id: &str) -> Url {
        let mut url = self.endpoint(&["coins", id]);
        url.query_pairs_mut()
            .append_pair("localization", "false")
            .append_pair("tickers", "false")
            .append_pair("market_data", "true")
            .append_pair("community_data", "false")
            .append_pair("developer_data", "false")
            .append_pair("sparkline", "true");
        url
    }

    pub fn market_chart_url(&self, id: &str, vs_currency: &str, days: u32) -> Url {
        let mut url = self.endpoint(&["coins", id, "market_chart"]);
        url.query_pairs_mut()
            .append_pair("vs_currency", vs_currency)
            .append_pair("days", &days.to_string());
        url
    }

    pub fn search_url(&self, query: &str) -> Url {
        let mut url = self.endpoint(&["search"]);
        url.query_pairs_mut().append_pair("query", query.trim());
        url
    }

    pub fn global_url(&self) -> Url {
        self.endpoint(&["global"])
    }
}

// =============================================================================
// Parsers
// =============================================================================

pub fn parse_markets(body: &Value) -> Result<Vec<MarketCoin>, FetchError> {
    if !body.is_array() {
        return Err(FetchError::malformed("markets response is not an array"));
    }
    Ok(Vec::<MarketCoin>::deserialize(body)?)
}

pub fn parse_coin_detail(body: &Value) -> Result<CoinDetail, FetchError> {
    let id = body["id"]
        .as_str()
        .ok_or_else(|| FetchError::malformed("coin detail missing 'id'"))?;
    let market_data = &body["market_data"];

    let image = body["image"]["large"]
        .as_str()
        .or_else(|| body["image"]["small"].as_str())
        .unwrap_or_default();

    let description = body["description"]["en"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let market_cap_rank = body["market_cap_rank"]
        .as_u64()
        .or_else(|| market_data["market_cap_rank"].as_u64())
        .map(|r| r as u32);

    let sparkline_7d = market_data["sparkline_7d"]["price"]
        .as_array()
        .map(|arr| arr.iter().filter_map(Value::as_f64).collect())
        .unwrap_or_default();

    Ok(CoinDetail {
        id: id.to_string(),
        symbol: body["symbol"].as_str().unwrap_or_default().to_string(),
        name: body["name"].as_str().unwrap_or_default().to_string(),
        image: image.to_string(),
        description,
        market_cap_rank,
        current_price: currency_map(&market_data["current_price"]),
        market_cap: currency_map(&market_data["market_cap"]),
        total_volume: currency_map(&market_data["total_volume"]),
        price_change_percentage_24h: market_data["price_change_percentage_24h"].as_f64(),
        sparkline_7d,
    })
}

/// Parse `prices: [[ms, price], ...]`. Timestamps may arrive as integers or
/// floats; entries that are not numeric pairs are skipped.
pub fn parse_market_chart(body: &Value) -> Result<MarketChart, FetchError> {
    let raw = body["prices"]
        .as_array()
        .ok_or_else(|| FetchError::malformed("market chart missing 'prices' array"))?;

    let mut prices = Vec::with_capacity(raw.len());
    let mut skipped = 0usize;
    for entry in raw {
        let pair = entry.as_array().and_then(|arr| {
            let ts = arr.first()?.as_f64()?;
            let price = arr.get(1)?.as_f64()?;
            Some(PricePoint(ts as i64, price))
        });
        match pair {
            Some(p) => prices.push(p),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!(skipped, "skipping malformed market chart entries");
    }

    Ok(MarketChart { prices })
}

pub fn parse_search(body: &Value) -> Result<Vec<SearchCoin>, FetchError> {
    let coins = body["coins"]
        .as_array()
        .ok_or_else(|| FetchError::malformed("search response missing 'coins' array"))?;

    Ok(coins
        .iter()
        .filter_map(|c| {
            Some(SearchCoin {
                id: c["id"].as_str()?.to_string(),
                name: c["name"].as_str()?.to_string(),
                symbol: c["symbol"].as_str()?.to_string(),
                thumb: c["thumb"].as_str().map(str::to_string),
            })
        })
        .take(SEARCH_LIMIT)
        .collect())
}

pub fn parse_global(body: &Value) -> Result<GlobalStats, FetchError> {
    let data = body
        .get("data")
        .filter(|d| d.is_object())
        .ok_or_else(|| FetchError::malformed("global response missing 'data' object"))?;
    Ok(GlobalStats::deserialize(data)?)
}

/// Keep the numeric entries of a `{ "usd": 1.0, ... }` object.
fn currency_map(value: &Value) -> CurrencyMap {
    value
        .as_object()
        .map(|obj| {
            obj.iter()
                .filter_map(|(k, v)| v.as_f64().map(|n| (k.clone(), n)))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn gecko() -> CoinGecko {
        CoinGecko::new("https://api.coingecko.com/api/v3").unwrap()
    }

    // ---- URL builders ------------------------------------------------------

    #[test]
    fn markets_url_carries_all_params() {
        let url = gecko().markets_url("usd", "market_cap_desc", 25, 2);
        assert_eq!(url.path(), "/api/v3/coins/markets");
        let q = url.query().unwrap();
        assert!(q.contains("vs_currency=usd"));
        assert!(q.contains("per_page=25"));
        assert!(q.contains("page=2"));
        assert!(q.contains("sparkline=false"));
    }

    #[test]
    fn trailing_slash_base_is_normalised() {
        let g = CoinGecko::new("https://api.coingecko.com/api/v3/").unwrap();
        assert_eq!(g.global_url().path(), "/api/v3/global");
    }

    #[test]
    fn coin_id_is_percent_encoded() {
        let url = gecko().market_chart_url("weird/id", "usd", 7);
        assert_eq!(url.path(), "/api/v3/coins/weird%2Fid/market_chart");
        assert!(url.query().unwrap().contains("days=7"));
    }

    #[test]
    fn search_query_is_trimmed() {
        let url = gecko().search_url("  bit ");
        assert_eq!(url.query(), Some("query=bit"));
    }

    #[test]
    fn rejects_unusable_base() {
        assert!(CoinGecko::new("not a url").is_err());
        assert!(CoinGecko::new("mailto:someone@example.com").is_err());
    }

    // ---- parsers -----------------------------------------------------------

    #[test]
    fn parses_market_chart_with_float_timestamps() {
        let body = json!({ "prices": [[1.7e12, 100.5], [1700000003600000_i64, 101.0], ["bad"]] });
        let chart = parse_market_chart(&body).unwrap();
        assert_eq!(chart.prices.len(), 2);
        assert_eq!(chart.prices[0].ts(), 1_700_000_000_000);
        assert!((chart.prices[1].value() - 101.0).abs() < 1e-12);
    }

    #[test]
    fn market_chart_without_prices_is_malformed() {
        let err = parse_market_chart(&json!({ "error": "rate limited" })).unwrap_err();
        assert!(matches!(err, FetchError::Malformed(_)));
    }

    #[test]
    fn parses_markets_array() {
        let body = json!([{
            "id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "image": "x.png",
            "current_price": 43000.0, "market_cap": 8.4e11, "market_cap_rank": 1,
            "price_change_percentage_24h": 2.4, "total_volume": 2.8e10
        }]);
        let coins = parse_markets(&body).unwrap();
        assert_eq!(coins.len(), 1);
        assert_eq!(coins[0].market_cap_rank, Some(1));
    }

    #[test]
    fn markets_object_is_malformed() {
        assert!(parse_markets(&json!({ "status": "error" })).is_err());
    }

    #[test]
    fn flattens_coin_detail() {
        let body = json!({
            "id": "ethereum", "symbol": "eth", "name": "Ethereum",
            "image": { "small": "s.png" },
            "description": { "en": "" },
            "market_data": {
                "market_cap_rank": 2,
                "current_price": { "usd": 2650.0, "eur": null },
                "market_cap": { "usd": 3.1e11 },
                "total_volume": {},
                "price_change_percentage_24h": -1.2,
                "sparkline_7d": { "price": [1.0, 2.0, 3.0] }
            }
        });
        let d = parse_coin_detail(&body).unwrap();
        assert_eq!(d.image, "s.png");
        assert!(d.description.is_none());
        assert_eq!(d.market_cap_rank, Some(2));
        assert_eq!(d.current_price.len(), 1);
        assert_eq!(d.sparkline_7d, vec![1.0, 2.0, 3.0]);
        assert_eq!(d.price_change_percentage_24h, Some(-1.2));
    }

    #[test]
    fn search_is_capped() {
        let coins: Vec<Value> = (0..15)
            .map(|i| json!({ "id": format!("c{i}"), "name": "N", "symbol": "S" }))
            .collect();
        let hits = parse_search(&json!({ "coins": coins })).unwrap();
        assert_eq!(hits.len(), SEARCH_LIMIT);
        assert!(hits[0].thumb.is_none());
    }

    #[test]
    fn global_requires_data_object() {
        assert!(parse_global(&json!({})).is_err());
        let stats = parse_global(&json!({ "data": { "active_cryptocurrencies": 10 } })).unwrap();
        assert_eq!(stats.active_cryptocurrencies, 10);
    }
}
