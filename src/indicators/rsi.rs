// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing
// =============================================================================
//
// Step 1 — Compute price changes (deltas) from consecutive points.
// Step 2 — Seed average gain / average loss with the simple average of the
//          first `period` gains / losses.
// Step 3 — Apply Wilder's smoothing for every later delta:
//            avg_gain = (prev_avg_gain * (period - 1) + gain) / period
//            avg_loss = (prev_avg_loss * (period - 1) + loss) / period
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS),  or 100 when avg_loss == 0
// =============================================================================

use crate::types::{PricePoint, PriceSeries};

/// Compute the RSI series for `points` and `period`.
///
/// The first value is stamped with the timestamp of `points[period]` (the
/// first `period + 1` points are consumed to seed the averages); every later
/// point produces one value.
///
/// # Edge cases
/// - `period == 0` => empty vec
/// - `points.len() < period + 1` => empty vec
/// - No down moves in the averaging window => 100.0 (flat series included)
pub fn calculate_rsi(points: &[PricePoint], period: usize) -> PriceSeries {
    if period == 0 || points.len() < period + 1 {
        return Vec::new();
    }

    let period_f = period as f64;

    // --- Seed averages over the first `period` deltas ------------------------
    let (sum_gain, sum_loss) = points[..=period]
        .windows(2)
        .map(|w| w[1].value() - w[0].value())
        .fold((0.0_f64, 0.0_f64), |(g, l), d| {
            if d >= 0.0 {
                (g + d, l)
            } else {
                (g, l - d)
            }
        });

    let mut avg_gain = sum_gain / period_f;
    let mut avg_loss = sum_loss / period_f;

    let mut result = Vec::with_capacity(points.len() - period);
    result.push(PricePoint(points[period].ts(), rsi_from_averages(avg_gain, avg_loss)));

    // --- Wilder's smoothing for subsequent values ----------------------------
    for i in (period + 1)..points.len() {
        let delta = points[i].value() - points[i - 1].value();
        let gain = if delta > 0.0 { delta } else { 0.0 };
        let loss = if delta < 0.0 { -delta } else { 0.0 };

        avg_gain = (avg_gain * (period_f - 1.0) + gain) / period_f;
        avg_loss = (avg_loss * (period_f - 1.0) + loss) / period_f;

        result.push(PricePoint(points[i].ts(), rsi_from_averages(avg_gain, avg_loss)));
    }

    result
}

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    // Clamp so float rounding on extreme ratios never escapes the band.
    (100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0)
}
