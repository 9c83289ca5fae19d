// =============================================================================
// Period Statistics — return, annualised volatility, max drawdown
// =============================================================================
//
// A single reduction over the whole series:
//
//   return      = (last / first - 1) * 100
//   volatility  = stdev(ln(P_i / P_{i-1})) * sqrt(steps_per_year) * 100
//   drawdown    = min over i of (P_i / running_peak - 1) * 100
//
// `steps_per_year` is derived from the average sampling interval, so the same
// function annualises hourly and daily charts correctly.

use serde::{Deserialize, Serialize};

use crate::types::PricePoint;

/// Milliseconds in a 365-day year.
pub const MS_PER_YEAR: f64 = 365.0 * 24.0 * 60.0 * 60.0 * 1000.0;

/// Summary statistics for a whole price series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStats {
    pub return_pct: f64,
    pub vol_ann_pct: f64,
    /// Always `<= 0`.
    pub max_drawdown_pct: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_ts: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_ts: Option<i64>,
}

/// Compute [`PeriodStats`] over `points`.
///
/// Fewer than two points yields all-zero statistics with no timestamps.
/// Any statistic that comes out non-finite (zero or negative prices) is
/// reported as `0.0`.
pub fn period_stats(points: &[PricePoint]) -> PeriodStats {
    let (first, last) = match (points.first(), points.last()) {
        (Some(f), Some(l)) if points.len() >= 2 => (*f, *l),
        _ => return PeriodStats::default(),
    };

    let return_pct = finite_or_zero((last.value() / first.value() - 1.0) * 100.0);

    // --- Annualised volatility of log returns --------------------------------
    let log_returns: Vec<f64> = points
        .windows(2)
        .map(|w| (w[1].value() / w[0].value()).ln())
        .collect();
    let n = log_returns.len() as f64;
    let mean = log_returns.iter().sum::<f64>() / n;
    let var_sum = log_returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>();
    let stdev = (var_sum / (n - 1.0).max(1.0)).sqrt();

    let avg_step_ms = (last.ts() - first.ts()) as f64 / (points.len() - 1) as f64;
    let steps_per_year = MS_PER_YEAR / avg_step_ms.max(1.0);
    let vol_ann_pct = finite_or_zero(stdev * steps_per_year.sqrt() * 100.0);

    // --- Max drawdown ---------------------------------------------------------
    let mut peak = first.value();
    let mut max_dd = 0.0_f64;
    for p in &points[1..] {
        if p.value() > peak {
            peak = p.value();
        }
        let dd = p.value() / peak - 1.0;
        if dd < max_dd {
            max_dd = dd;
        }
    }
    let max_drawdown_pct = finite_or_zero(max_dd * 100.0).min(0.0);

    PeriodStats {
        return_pct,
        vol_ann_pct,
        max_drawdown_pct,
        start_ts: Some(first.ts()),
        end_ts: Some(last.ts()),
    }
}

#[inline]
fn finite_or_zero(x: f64) -> f64 {
    if x.is_finite() {
        x
    } else {
        0.0
    }
}
