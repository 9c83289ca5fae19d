// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// EMA gives more weight to recent prices, making it more responsive to new
// information than the Simple Moving Average (SMA).
//
// Formula:
//   k      = 2 / (period + 1)
//   EMA_t  = price_t * k + EMA_{t-1} * (1 - k)
//
// The very first EMA value is seeded with the SMA of the first `period`
// prices and stamped with the timestamp of the `period`-th point.
// =============================================================================

use crate::types::{PricePoint, PriceSeries};

/// Compute the EMA series for `points` and look-back `period`.
///
/// Returns an empty `Vec` when the input is too short or the period is zero.
/// Output element `i` corresponds to input element `period - 1 + i`.
pub fn calculate_ema(points: &[PricePoint], period: usize) -> PriceSeries {
    if period == 0 || points.len() < period {
        return Vec::new();
    }

    let k = 2.0 / (period + 1) as f64;

    // Seed: SMA of the first `period` values.
    let seed = points[..period].iter().map(PricePoint::value).sum::<f64>() / period as f64;

    let mut result = Vec::with_capacity(points.len() - period + 1);
    result.push(PricePoint(points[period - 1].ts(), seed));

    let mut prev = seed;
    for point in &points[period..] {
        let next = point.value() * k + prev * (1.0 - k);
        result.push(PricePoint(point.ts(), next));
        prev = next;
    }

    result
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: ascending series 1..=n stamped 0..n.
    fn ascending(n: usize) -> PriceSeries {
        (1..=n).map(|i| PricePoint((i - 1) as i64, i as f64)).collect()
    }

    // ---- calculate_ema ---------------------------------------------------

    #[test]
    fn ema_empty_input() {
        assert!(calculate_ema(&[], 5).is_empty());
    }

    #[test]
    fn ema_period_zero() {
        assert!(calculate_ema(&ascending(3), 0).is_empty());
    }

    #[test]
    fn ema_insufficient_data() {
        assert!(calculate_ema(&ascending(2), 5).is_empty());
    }

    #[test]
    fn ema_period_equals_length() {
        let points = vec![PricePoint(10, 2.0), PricePoint(20, 4.0), PricePoint(30, 6.0)];
        let ema = calculate_ema(&points, 3);
        assert_eq!(ema.len(), 1);
        // Seed is the SMA = (2+4+6)/3 = 4.0, stamped at the 3rd point.
        assert_eq!(ema[0].ts(), 30);
        assert!((ema[0].value() - 4.0).abs() < 1e-10);
    }

    #[test]
    fn ema_known_values() {
        // 5-period EMA of [1..=10]: seed = 3.0, k = 1/3.
        let points = ascending(10);
        let ema = calculate_ema(&points, 5);
        assert_eq!(ema.len(), 6);

        let k = 2.0 / 6.0;
        let mut expected = 3.0;
        assert!((ema[0].value() - expected).abs() < 1e-10);
        for (i, p) in points[5..].iter().enumerate() {
            expected = p.value() * k + expected * (1.0 - k);
            assert_eq!(ema[i + 1].ts(), p.ts());
            assert!((ema[i + 1].value() - expected).abs() < 1e-10);
        }
    }

    #[test]
    fn ema_flat_series_stays_flat() {
        let points: PriceSeries = (0..30).map(|i| PricePoint(i, 100.0)).collect();
        for p in calculate_ema(&points, 12) {
            assert!((p.value() - 100.0).abs() < 1e-10);
        }
    }
}
