// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// Unweighted mean over a sliding window.  Computed with a running sum so the
// whole series costs O(n) regardless of window size.

use crate::types::{PricePoint, PriceSeries};

/// Compute the SMA series of `points` over `window` samples.
///
/// The output has `len - window + 1` points; each is stamped with the
/// timestamp of the last sample in its window.
///
/// # Edge cases
/// - `window == 0` => empty vec
/// - `points.len() < window` => empty vec
pub fn calculate_sma(points: &[PricePoint], window: usize) -> PriceSeries {
    if window == 0 || points.len() < window {
        return Vec::new();
    }

    let window_f = window as f64;
    let mut result = Vec::with_capacity(points.len() - window + 1);
    let mut sum = 0.0_f64;

    for (i, point) in points.iter().enumerate() {
        sum += point.value();
        if i >= window {
            sum -= points[i - window].value();
        }
        if i + 1 >= window {
            result.push(PricePoint(point.ts(), sum / window_f));
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::series_from_pairs;

    #[test]
    fn sma_known_example() {
        let points = series_from_pairs(&[(0, 10.0), (1, 20.0), (2, 30.0)]);
        let sma = calculate_sma(&points, 2);
        assert_eq!(sma, vec![PricePoint(1, 15.0), PricePoint(2, 25.0)]);
    }

    #[test]
    fn sma_window_zero() {
        let points = series_from_pairs(&[(0, 1.0), (1, 2.0)]);
        assert!(calculate_sma(&points, 0).is_empty());
    }

    #[test]
    fn sma_insufficient_data() {
        let points = series_from_pairs(&[(0, 1.0), (1, 2.0)]);
        assert!(calculate_sma(&points, 3).is_empty());
    }

    #[test]
    fn sma_window_one_is_identity() {
        let points = series_from_pairs(&[(0, 3.0), (5, 4.0), (9, 8.0)]);
        assert_eq!(calculate_sma(&points, 1), points);
    }

    #[test]
    fn sma_window_equals_length() {
        let points = series_from_pairs(&[(0, 2.0), (1, 4.0), (2, 6.0)]);
        let sma = calculate_sma(&points, 3);
        assert_eq!(sma.len(), 1);
        assert_eq!(sma[0].ts(), 2);
        assert!((sma[0].value() - 4.0).abs() < 1e-10);
    }
}
