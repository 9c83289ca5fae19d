// =============================================================================
// Shared types used across the indicator engine and the data layer
// =============================================================================

use serde::{Deserialize, Serialize};

/// One sample of a price (or derived metric) series.
///
/// Serialises as a two-element array `[timestamp_ms, value]`, the shape chart
/// renderers consume directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint(pub i64, pub f64);

impl PricePoint {
    pub fn new(ts: i64, value: f64) -> Self {
        Self(ts, value)
    }

    /// Timestamp in milliseconds since the UNIX epoch.
    #[inline]
    pub fn ts(&self) -> i64 {
        self.0
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.1
    }
}

impl From<(i64, f64)> for PricePoint {
    fn from((ts, value): (i64, f64)) -> Self {
        Self(ts, value)
    }
}

/// A chronologically ordered price series. Transformations never mutate a
/// series in place; they always return a fresh one.
pub type PriceSeries = Vec<PricePoint>;

/// Build a series from `(ts, value)` pairs.
pub fn series_from_pairs(pairs: &[(i64, f64)]) -> PriceSeries {
    pairs.iter().copied().map(PricePoint::from).collect()
}
