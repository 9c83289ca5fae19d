// =============================================================================
// Bundled sample dataset — served when a live endpoint is unavailable
// =============================================================================
//
// Every function here is a pure function of its arguments: "now" is passed in
// and chart noise comes from a fixed integer hash, so two calls with the same
// inputs return identical data.
// =============================================================================

use chrono::{DateTime, Utc};

use crate::sources::models::{
    CoinDetail, CurrencyMap, GlobalStats, MarketChart, MarketCoin, NewsItem, SearchCoin,
};
use crate::types::PricePoint;

const HOUR_MS: i64 = 3_600_000;
const HOUR_SECS: i64 = 3_600;

/// Points in the 7-day hourly sparkline of the sample coin detail.
const SPARKLINE_POINTS: u64 = 168;

/// Longest sample chart, in days.
pub const MAX_CHART_DAYS: u32 = 365;

// =============================================================================
// Static tables
// =============================================================================

// (id, symbol, name, image, price, market cap, 24h change %, volume)
const MARKETS: [(&str, &str, &str, &str, f64, f64, f64, f64); 8] = [
    ("bitcoin", "btc", "Bitcoin", "https://assets.coingecko.com/coins/images/1/large/bitcoin.png", 43_250.75, 847_562_345_678.0, 2.45, 28_456_789_012.0),
    ("ethereum", "eth", "Ethereum", "https://assets.coingecko.com/coins/images/279/large/ethereum.png", 2_650.32, 318_456_789_012.0, -1.23, 15_678_901_234.0),
    ("binancecoin", "bnb", "Binance Coin", "https://assets.coingecko.com/coins/images/825/large/binance-coin-logo.png", 315.67, 48_567_890_123.0, 0.89, 1_234_567_890.0),
    ("cardano", "ada", "Cardano", "https://assets.coingecko.com/coins/images/975/large/cardano.png", 0.485, 17_234_567_890.0, 3.21, 987_654_321.0),
    ("solana", "sol", "Solana", "https://assets.coingecko.com/coins/images/4128/large/solana.png", 98.45, 42_345_678_901.0, -2.67, 2_345_678_901.0),
    ("ripple", "xrp", "XRP", "https://assets.coingecko.com/coins/images/44/large/xrp-symbol-white-128.png", 0.612, 33_456_789_012.0, 1.87, 1_876_543_210.0),
    ("polkadot", "dot", "Polkadot", "https://assets.coingecko.com/coins/images/12171/large/polkadot.png", 7.23, 9_456_789_012.0, -0.45, 345_678_901.0),
    ("dogecoin", "doge", "Dogecoin", "https://assets.coingecko.com/coins/images/5/large/dogecoin.png", 0.087, 12_345_678_901.0, 4.32, 876_543_210.0),
];

// (id, name, symbol, thumb)
const SEARCH: [(&str, &str, &str, &str); 5] = [
    ("bitcoin", "Bitcoin", "BTC", "https://assets.coingecko.com/coins/images/1/thumb/bitcoin.png"),
    ("ethereum", "Ethereum", "ETH", "https://assets.coingecko.com/coins/images/279/thumb/ethereum.png"),
    ("binancecoin", "Binance Coin", "BNB", "https://assets.coingecko.com/coins/images/825/thumb/binance-coin-logo.png"),
    ("cardano", "Cardano", "ADA", "https://assets.coingecko.com/coins/images/975/thumb/cardano.png"),
    ("solana", "Solana", "SOL", "https://assets.coingecko.com/coins/images/4128/thumb/solana.png"),
];

// (title, body, slug, source, tags); article i is published i+1 hours ago.
const NEWS: [(&str, &str, &str, &str, &str); 6] = [
    (
        "Bitcoin hits a new yearly high",
        "Bitcoin pushed past $45,000 for the first time this year on expectations of wider institutional adoption. Analysts expect the uptrend to hold over the coming months.",
        "bitcoin-yearly-high",
        "CryptoNews",
        "Bitcoin|Market|Trading",
    ),
    (
        "Ethereum upgrades keep DeFi builders busy",
        "Ongoing Ethereum upgrades continue to draw investors, and the platform keeps its lead in smart contracts. Developers point to long-term growth potential.",
        "ethereum-upgrades-defi",
        "BlockchainWire",
        "Ethereum|DeFi|Technology",
    ),
    (
        "Crypto regulation moves forward",
        "Lawmakers are debating new rules for the crypto market, aiming to give investors more protection and to open the door to institutional money.",
        "crypto-regulation-advances",
        "PolicyDesk",
        "Regulation|Government",
    ),
    (
        "Solana transactions up 150%",
        "The Solana network keeps posting strong throughput numbers, with a sharp rise in processed transactions drawing new projects to the chain.",
        "solana-transactions",
        "SolanaNews",
        "Solana|Blockchain|Performance",
    ),
    (
        "NFTs find new use cases",
        "The NFT market shows signs of recovery as companies explore uses for non-fungible tokens beyond digital art.",
        "nft-market",
        "NFTDaily",
        "NFT|Market|Digital",
    ),
    (
        "DeFi crosses $100 billion locked",
        "Total value locked across DeFi protocols passed $100 billion, a sign of growing confidence in decentralised finance.",
        "defi-100-billion",
        "DeFiWatch",
        "DeFi|Market|Growth",
    ),
];

// =============================================================================
// Endpoint fallbacks
// =============================================================================

/// The bundled top-coins list, paged the same way as the live endpoint.
/// Pages past the end are empty.
pub fn markets(per_page: u32, page: u32) -> Vec<MarketCoin> {
    let per_page = per_page as usize;
    let start = (page.max(1) as usize - 1).saturating_mul(per_page);

    MARKETS
        .iter()
        .enumerate()
        .skip(start)
        .take(per_page)
        .map(|(i, &(id, symbol, name, image, price, cap, change, volume))| MarketCoin {
            id: id.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            image: image.to_string(),
            current_price: Some(price),
            market_cap: Some(cap),
            market_cap_rank: Some(i as u32 + 1),
            price_change_percentage_24h: Some(change),
            total_volume: Some(volume),
        })
        .collect()
}

/// The bundled Bitcoin detail relabelled as `id`.
pub fn coin_detail(id: &str) -> CoinDetail {
    let symbol: String = id.chars().take(3).collect::<String>().to_lowercase();
    let mut chars = id.chars();
    let name = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };

    CoinDetail {
        id: id.to_string(),
        symbol,
        name,
        image: MARKETS[0].3.to_string(),
        description: Some(
            "Bitcoin is a decentralised cryptocurrency created in 2009 by Satoshi Nakamoto. \
             It is the first and best-known cryptocurrency."
                .to_string(),
        ),
        market_cap_rank: Some(1),
        current_price: currencies(&[("usd", 43_250.75), ("brl", 215_678.90), ("eur", 39_876.45)]),
        market_cap: currencies(&[
            ("usd", 847_562_345_678.0),
            ("brl", 4_234_567_890_123.0),
            ("eur", 781_234_567_890.0),
        ]),
        total_volume: currencies(&[
            ("usd", 28_456_789_012.0),
            ("brl", 141_234_567_890.0),
            ("eur", 26_123_456_789.0),
        ]),
        price_change_percentage_24h: Some(2.45),
        sparkline_7d: (0..SPARKLINE_POINTS)
            .map(|i| 42_000.0 + unit_noise(i) * 3_000.0)
            .collect(),
    }
}

/// `days * 24` hourly points ending at `now`: a sine wave around 42 000 with
/// ±500 of hash noise. The range is clamped to `1..=MAX_CHART_DAYS`.
pub fn market_chart(days: u32, now: DateTime<Utc>) -> MarketChart {
    let n = u64::from(days.clamp(1, MAX_CHART_DAYS)) * 24;
    let end = now.timestamp_millis();

    let prices = (0..n)
        .map(|i| {
            let ts = end - (n - 1 - i) as i64 * HOUR_MS;
            let wave = (i as f64 * 0.1).sin() * 2_000.0;
            let noise = (unit_noise(i) - 0.5) * 1_000.0;
            PricePoint(ts, 42_000.0 + wave + noise)
        })
        .collect();

    MarketChart { prices }
}

/// Bundled coins whose name or symbol contains `query`, case-insensitively.
pub fn search(query: &str) -> Vec<SearchCoin> {
    let needle = query.trim().to_lowercase();
    SEARCH
        .iter()
        .filter(|(_, name, symbol, _)| {
            name.to_lowercase().contains(&needle) || symbol.to_lowercase().contains(&needle)
        })
        .map(|&(id, name, symbol, thumb)| SearchCoin {
            id: id.to_string(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            thumb: Some(thumb.to_string()),
        })
        .collect()
}

/// Six articles published one to six hours before `now`, newest first.
pub fn news(now: DateTime<Utc>) -> Vec<NewsItem> {
    let now_secs = now.timestamp();
    NEWS.iter()
        .enumerate()
        .map(|(i, &(title, body, slug, source, tags))| NewsItem {
            id: (i + 1).to_string(),
            title: title.to_string(),
            body: body.to_string(),
            url: format!("https://example.com/{slug}"),
            imageurl: String::new(),
            source: source.to_string(),
            tags: tags.to_string(),
            published_on: now_secs - (i as i64 + 1) * HOUR_SECS,
        })
        .collect()
}

pub fn global_stats(now: DateTime<Utc>) -> GlobalStats {
    GlobalStats {
        active_cryptocurrencies: 8_500,
        upcoming_icos: 15,
        ongoing_icos: 42,
        ended_icos: 1_250,
        markets: 420,
        total_market_cap: currencies(&[
            ("usd", 1_650_000_000_000.0),
            ("brl", 8_250_000_000_000.0),
            ("eur", 1_510_000_000_000.0),
        ]),
        total_volume: currencies(&[
            ("usd", 65_000_000_000.0),
            ("brl", 325_000_000_000.0),
            ("eur", 59_500_000_000.0),
        ]),
        market_cap_percentage: currencies(&[
            ("btc", 42.5),
            ("eth", 18.3),
            ("usdt", 6.8),
            ("bnb", 4.2),
            ("sol", 3.1),
        ]),
        market_cap_change_percentage_24h_usd: 2.45,
        updated_at: now.timestamp(),
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn currencies(pairs: &[(&str, f64)]) -> CurrencyMap {
    pairs.iter().map(|&(k, v)| (k.to_string(), v)).collect()
}

/// SplitMix64 finaliser mapped to `[0, 1)`.
fn unit_noise(i: u64) -> f64 {
    let mut z = i.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    (z >> 11) as f64 / (1u64 << 53) as f64
}
