// =============================================================================
// coinlens — market data with graceful fallback, plus chart indicators
// =============================================================================
//
// Two independent halves meet only in `analysis` and the binary:
//
//   indicators  pure time-series math over `[timestamp_ms, value]` series
//   fetcher     timeout + retry + cancellation + sample-data fallback around
//               the CoinGecko / CryptoCompare endpoints in `sources`
// =============================================================================

pub mod analysis;
pub mod config;
pub mod fetcher;
pub mod indicators;
pub mod mock;
pub mod sources;
pub mod types;

pub use analysis::{AnalysisReport, Comparison, IndicatorSelection};
pub use config::{FetcherConfig, RuntimeConfig};
pub use fetcher::{CancelToken, ChartQuery, FetchResult, MarketsQuery, NewsQuery, SafeFetcher};
pub use types::{PricePoint, PriceSeries};
