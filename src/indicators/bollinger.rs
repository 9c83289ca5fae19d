// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the population standard deviation
// of the window.  One triple is emitted for every full window, stamped with
// the window's last timestamp.

use serde::{Deserialize, Serialize};

use crate::types::{PricePoint, PriceSeries};

/// Three aligned band series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub mid: PriceSeries,
    pub upper: PriceSeries,
    pub lower: PriceSeries,
}

impl BollingerBands {
    pub fn is_empty(&self) -> bool {
        self.mid.is_empty()
    }
}

/// Calculate rolling Bollinger Bands over `points`.
///
/// Returns empty bands when `period == 0` or fewer than `period` points.
pub fn calculate_bollinger(points: &[PricePoint], period: usize, multiplier: f64) -> BollingerBands {
    if period == 0 || points.len() < period {
        return BollingerBands::default();
    }

    let period_f = period as f64;
    let capacity = points.len() - period + 1;
    let mut bands = BollingerBands {
        mid: Vec::with_capacity(capacity),
        upper: Vec::with_capacity(capacity),
        lower: Vec::with_capacity(capacity),
    };

    for window in points.windows(period) {
        let mean = window.iter().map(PricePoint::value).sum::<f64>() / period_f;
        let variance = window
            .iter()
            .map(|p| (p.value() - mean).powi(2))
            .sum::<f64>()
            / period_f;
        let std_dev = variance.sqrt();
        let ts = window[period - 1].ts();

        bands.mid.push(PricePoint(ts, mean));
        bands.upper.push(PricePoint(ts, mean + multiplier * std_dev));
        bands.lower.push(PricePoint(ts, mean - multiplier * std_dev));
    }

    bands
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: i64) -> PriceSeries {
        (1..=n).map(|x| PricePoint(x, x as f64)).collect()
    }

    #[test]
    fn bollinger_basic() {
        let bands = calculate_bollinger(&ramp(20), 20, 2.0);
        assert_eq!(bands.mid.len(), 1);
        let (mid, upper, lower) = (bands.mid[0], bands.upper[0], bands.lower[0]);
        assert_eq!(mid.ts(), 20);
        assert!((mid.value() - 10.5).abs() < 1e-10);
        assert!(upper.value() > mid.value());
        assert!(lower.value() < mid.value());
    }

    #[test]
    fn bollinger_population_std() {
        // Window [2, 4, 4, 4, 5, 5, 7, 9] has mean 5 and population σ 2.
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let points: PriceSeries = values
            .iter()
            .enumerate()
            .map(|(i, &v)| PricePoint(i as i64, v))
            .collect();
        let bands = calculate_bollinger(&points, 8, 2.0);
        assert!((bands.mid[0].value() - 5.0).abs() < 1e-10);
        assert!((bands.upper[0].value() - 9.0).abs() < 1e-10);
        assert!((bands.lower[0].value() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn bollinger_insufficient_data() {
        assert!(calculate_bollinger(&ramp(3), 20, 2.0).is_empty());
    }

    #[test]
    fn bollinger_period_zero() {
        assert!(calculate_bollinger(&ramp(30), 0, 2.0).is_empty());
    }

    #[test]
    fn bollinger_flat_collapses_bands() {
        let flat: PriceSeries = (0..25).map(|i| PricePoint(i, 100.0)).collect();
        let bands = calculate_bollinger(&flat, 20, 2.0);
        assert_eq!(bands.mid.len(), 6);
        for ((m, u), l) in bands.mid.iter().zip(&bands.upper).zip(&bands.lower) {
            assert!((u.value() - m.value()).abs() < 1e-10);
            assert!((m.value() - l.value()).abs() < 1e-10);
        }
    }
}
