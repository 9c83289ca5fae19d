// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the chart overlays shown on the
// analysis view.  Every function is total: a series that is too short for the
// requested window yields an empty result (or zeroed statistics), never a
// panic or an error.  Output timestamps are always a subsequence of the input
// timestamps.

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stats;

pub use bollinger::{calculate_bollinger, BollingerBands};
pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdResult};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stats::{period_stats, PeriodStats};

/// Default RSI look-back.
pub const RSI_PERIOD: usize = 14;
/// Default MACD fast EMA period.
pub const MACD_FAST: usize = 12;
/// Default MACD slow EMA period.
pub const MACD_SLOW: usize = 26;
/// Default MACD signal EMA period.
pub const MACD_SIGNAL: usize = 9;
/// Default Bollinger window.
pub const BOLLINGER_PERIOD: usize = 20;
/// Default Bollinger band width in standard deviations.
pub const BOLLINGER_MULTIPLIER: f64 = 2.0;
