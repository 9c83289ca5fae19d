// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   macd   = EMA(fast) - EMA(slow)      on timestamps present in both
//   signal = EMA(macd, signal_period)
//   hist   = macd - signal              on timestamps present in both
//
// Series are joined by timestamp rather than by index so that the three
// outputs stay aligned with the input series regardless of seed offsets.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ema::calculate_ema;
use crate::types::{PricePoint, PriceSeries};

/// The three aligned MACD output series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacdResult {
    pub macd: PriceSeries,
    pub signal: PriceSeries,
    pub hist: PriceSeries,
}

impl MacdResult {
    pub fn is_empty(&self) -> bool {
        self.macd.is_empty()
    }
}

/// Compute MACD with the given `fast` / `slow` / `signal` periods.
///
/// If either EMA is empty (series too short), all three outputs are empty.
pub fn calculate_macd(
    points: &[PricePoint],
    fast: usize,
    slow: usize,
    signal: usize,
) -> MacdResult {
    let fast_ema = calculate_ema(points, fast);
    let slow_ema = calculate_ema(points, slow);
    if fast_ema.is_empty() || slow_ema.is_empty() {
        return MacdResult::default();
    }

    let macd = subtract_aligned(&fast_ema, &slow_ema);
    let signal_line = calculate_ema(&macd, signal);
    let hist = subtract_aligned(&macd, &signal_line);

    MacdResult {
        macd,
        signal: signal_line,
        hist,
    }
}

/// `a - b` for every timestamp of `a` that also appears in `b`, in `a`'s order.
fn subtract_aligned(a: &[PricePoint], b: &[PricePoint]) -> PriceSeries {
    let by_ts: HashMap<i64, f64> = b.iter().map(|p| (p.ts(), p.value())).collect();
    a.iter()
        .filter_map(|p| by_ts.get(&p.ts()).map(|&v| PricePoint(p.ts(), p.value() - v)))
        .collect()
}
