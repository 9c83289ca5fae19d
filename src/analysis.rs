// =============================================================================
// Chart Analysis — selected overlays and two-coin comparison
// =============================================================================
//
// Glue between a fetched price series and the indicator engine:
//
//   "sma7,rsi,macd"  ──parse──▶  IndicatorSelection
//   series + selection ──────▶  AnalysisReport (only selected overlays)
//   base + other ────────────▶  Comparison (aligned by timestamp, rebased to 100)

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::{
    calculate_bollinger, calculate_ema, calculate_macd, calculate_rsi, calculate_sma,
    period_stats, BollingerBands, MacdResult, PeriodStats, BOLLINGER_MULTIPLIER,
    BOLLINGER_PERIOD, MACD_FAST, MACD_SIGNAL, MACD_SLOW, RSI_PERIOD,
};
use crate::types::{PricePoint, PriceSeries};

/// Rebased value of the first point of a normalised series.
pub const NORMALIZE_BASE: f64 = 100.0;

// =============================================================================
// Indicator selection
// =============================================================================

/// Which overlays to compute.
///
/// Parsed from a comma or whitespace separated token list. Tokens are
/// case-insensitive and unknown tokens are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorSelection {
    pub sma7: bool,
    pub sma30: bool,
    pub rsi: bool,
    pub ema12: bool,
    pub ema26: bool,
    pub macd: bool,
    pub bb: bool,
    pub stats: bool,
}

impl IndicatorSelection {
    pub const TOKENS: [&'static str; 8] = ["sma7", "sma30", "rsi", "ema12", "ema26", "macd", "bb", "stats"];

    pub fn all() -> Self {
        Self {
            sma7: true,
            sma30: true,
            rsi: true,
            ema12: true,
            ema26: true,
            macd: true,
            bb: true,
            stats: true,
        }
    }

    pub fn none() -> Self {
        Self {
            sma7: false,
            sma30: false,
            rsi: false,
            ema12: false,
            ema26: false,
            macd: false,
            bb: false,
            stats: false,
        }
    }

    pub fn parse(s: &str) -> Self {
        let mut sel = Self::none();
        for token in s.split(|c: char| c == ',' || c.is_whitespace()) {
            if let Some(flag) = sel.flag_mut(&token.to_ascii_lowercase()) {
                *flag = true;
            } else if !token.is_empty() {
                debug!(token, "ignoring unknown indicator token");
            }
        }
        sel
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::none()
    }

    fn flag(&self, token: &str) -> bool {
        match token {
            "sma7" => self.sma7,
            "sma30" => self.sma30,
            "rsi" => self.rsi,
            "ema12" => self.ema12,
            "ema26" => self.ema26,
            "macd" => self.macd,
            "bb" => self.bb,
            "stats" => self.stats,
            _ => false,
        }
    }

    fn flag_mut(&mut self, token: &str) -> Option<&mut bool> {
        match token {
            "sma7" => Some(&mut self.sma7),
            "sma30" => Some(&mut self.sma30),
            "rsi" => Some(&mut self.rsi),
            "ema12" => Some(&mut self.ema12),
            "ema26" => Some(&mut self.ema26),
            "macd" => Some(&mut self.macd),
            "bb" => Some(&mut self.bb),
            "stats" => Some(&mut self.stats),
            _ => None,
        }
    }
}

/// Everything selected.
impl Default for IndicatorSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl FromStr for IndicatorSelection {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Canonical form: selected tokens in fixed order, comma separated.
impl fmt::Display for IndicatorSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tokens: Vec<&str> = Self::TOKENS
            .iter()
            .copied()
            .filter(|t| self.flag(t))
            .collect();
        f.write_str(&tokens.join(","))
    }
}

// =============================================================================
// Analysis report
// =============================================================================

/// The selected overlays for one price series. Unselected overlays are `None`
/// and omitted from the JSON form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub selection: String,
    pub points: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sma7: Option<PriceSeries>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sma30: Option<PriceSeries>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsi: Option<PriceSeries>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ema12: Option<PriceSeries>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ema26: Option<PriceSeries>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub macd: Option<MacdResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bollinger: Option<BollingerBands>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<PeriodStats>,
}

impl AnalysisReport {
    pub fn compute(series: &[PricePoint], selection: &IndicatorSelection) -> Self {
        let report = Self {
            selection: selection.to_string(),
            points: series.len(),
            sma7: selection.sma7.then(|| calculate_sma(series, 7)),
            sma30: selection.sma30.then(|| calculate_sma(series, 30)),
            rsi: selection.rsi.then(|| calculate_rsi(series, RSI_PERIOD)),
            ema12: selection.ema12.then(|| calculate_ema(series, 12)),
            ema26: selection.ema26.then(|| calculate_ema(series, 26)),
            macd: selection
                .macd
                .then(|| calculate_macd(series, MACD_FAST, MACD_SLOW, MACD_SIGNAL)),
            bollinger: selection
                .bb
                .then(|| calculate_bollinger(series, BOLLINGER_PERIOD, BOLLINGER_MULTIPLIER)),
            stats: selection.stats.then(|| period_stats(series)),
        };

        debug!(points = report.points, selection = %report.selection, "analysis computed");
        report
    }

    /// Most recent RSI reading, if RSI was selected and the series was long
    /// enough.
    pub fn latest_rsi(&self) -> Option<f64> {
        self.rsi.as_ref()?.last().map(PricePoint::value)
    }
}

// =============================================================================
// Comparison
// =============================================================================

/// Keep the points of `a` whose timestamp also appears in `b`.
///
/// Returns the two value series on the shared timestamps, in `a`'s order.
pub fn align_by_timestamp(a: &[PricePoint], b: &[PricePoint]) -> (PriceSeries, PriceSeries) {
    let lookup: HashMap<i64, f64> = b.iter().map(|p| (p.ts(), p.value())).collect();
    a.iter()
        .filter_map(|p| {
            lookup
                .get(&p.ts())
                .map(|&other| (*p, PricePoint(p.ts(), other)))
        })
        .unzip()
}

/// Rebase `series` so its first value is 100.
///
/// Empty input, or a first value that is not a positive finite number,
/// yields an empty series.
pub fn normalize(series: &[PricePoint]) -> PriceSeries {
    let Some(base) = series.first().map(PricePoint::value) else {
        return Vec::new();
    };
    if !(base.is_finite() && base > 0.0) {
        return Vec::new();
    }
    series
        .iter()
        .map(|p| PricePoint(p.ts(), p.value() / base * NORMALIZE_BASE))
        .collect()
}

/// Two series on shared timestamps, both rebased to 100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub base: PriceSeries,
    pub other: PriceSeries,
    /// Final normalised value of `other` minus that of `base`, in percentage
    /// points. Zero when the series share no usable timestamps.
    pub spread_pct: f64,
}

impl Comparison {
    pub fn compute(base: &[PricePoint], other: &[PricePoint]) -> Self {
        let (a, b) = align_by_timestamp(base, other);
        let (a, b) = (normalize(&a), normalize(&b));
        if a.is_empty() || b.is_empty() {
            return Self::default();
        }

        let spread_pct = match (a.last(), b.last()) {
            (Some(x), Some(y)) => y.value() - x.value(),
            _ => 0.0,
        };
        Self {
            base: a,
            other: b,
            spread_pct,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::series_from_pairs;

    fn ramp(n: i64) -> PriceSeries {
        (0..n).map(|i| PricePoint(i * 1_000, 100.0 + i as f64)).collect()
    }

    // ---- selection ---------------------------------------------------------

    #[test]
    fn parses_mixed_separators_and_case() {
        let sel = IndicatorSelection::parse("SMA7, rsi  macd,bogus,,BB");
        assert!(sel.sma7 && sel.rsi && sel.macd && sel.bb);
        assert!(!sel.sma30 && !sel.ema12 && !sel.ema26 && !sel.stats);
    }

    #[test]
    fn display_is_canonical() {
        let sel: IndicatorSelection = "stats bb sma7".parse().unwrap();
        assert_eq!(sel.to_string(), "sma7,bb,stats");
        assert_eq!(IndicatorSelection::all().to_string(), IndicatorSelection::TOKENS.join(","));
        assert_eq!(IndicatorSelection::none().to_string(), "");
    }

    #[test]
    fn display_round_trips_through_parse() {
        let sel = IndicatorSelection::parse("ema26,rsi");
        assert_eq!(IndicatorSelection::parse(&sel.to_string()), sel);
    }

    #[test]
    fn unknown_only_is_empty() {
        assert!(IndicatorSelection::parse("foo bar").is_empty());
        assert!(IndicatorSelection::parse("").is_empty());
    }

    // ---- report ------------------------------------------------------------

    #[test]
    fn report_computes_only_selected() {
        let series = ramp(60);
        let report = AnalysisReport::compute(&series, &IndicatorSelection::parse("sma7,stats"));

        assert_eq!(report.points, 60);
        assert_eq!(report.sma7.as_ref().map(Vec::len), Some(54));
        assert!(report.stats.is_some());
        assert!(report.sma30.is_none());
        assert!(report.macd.is_none());
        assert!(report.rsi.is_none());

        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("sma30").is_none());
        assert!(json.get("sma7").is_some());
        assert_eq!(json["selection"], "sma7,stats");
    }

    #[test]
    fn report_on_short_series_is_empty_not_absent() {
        let series = ramp(5);
        let report = AnalysisReport::compute(&series, &IndicatorSelection::all());
        assert_eq!(report.sma30, Some(Vec::new()));
        assert!(report.macd.as_ref().is_some_and(MacdResult::is_empty));
        assert!(report.bollinger.as_ref().is_some_and(BollingerBands::is_empty));
        assert_eq!(report.latest_rsi(), None);
    }

    #[test]
    fn latest_rsi_of_rising_series_is_100() {
        let report = AnalysisReport::compute(&ramp(30), &IndicatorSelection::parse("rsi"));
        assert_eq!(report.latest_rsi(), Some(100.0));
    }

    // ---- comparison --------------------------------------------------------

    #[test]
    fn align_keeps_shared_timestamps_in_a_order() {
        let a = series_from_pairs(&[(1, 10.0), (2, 20.0), (3, 30.0)]);
        let b = series_from_pairs(&[(3, 300.0), (1, 100.0), (4, 400.0)]);
        let (x, y) = align_by_timestamp(&a, &b);
        assert_eq!(x, series_from_pairs(&[(1, 10.0), (3, 30.0)]));
        assert_eq!(y, series_from_pairs(&[(1, 100.0), (3, 300.0)]));
    }

    #[test]
    fn normalize_rebases_to_100() {
        let s = series_from_pairs(&[(1, 50.0), (2, 75.0), (3, 25.0)]);
        let n = normalize(&s);
        assert_eq!(n, series_from_pairs(&[(1, 100.0), (2, 150.0), (3, 50.0)]));
    }

    #[test]
    fn normalize_degenerate_inputs() {
        assert!(normalize(&[]).is_empty());
        assert!(normalize(&series_from_pairs(&[(1, 0.0), (2, 5.0)])).is_empty());
        assert!(normalize(&series_from_pairs(&[(1, -3.0)])).is_empty());
    }

    #[test]
    fn comparison_reports_spread() {
        let base = series_from_pairs(&[(1, 100.0), (2, 110.0), (3, 120.0)]);
        let other = series_from_pairs(&[(1, 10.0), (3, 15.0)]);
        let cmp = Comparison::compute(&base, &other);
        assert_eq!(cmp.base.len(), 2);
        assert_eq!(cmp.other.len(), 2);
        assert!((cmp.spread_pct - 30.0).abs() < 1e-9);
    }

    #[test]
    fn comparison_without_overlap_is_empty() {
        let base = series_from_pairs(&[(1, 1.0)]);
        let other = series_from_pairs(&[(2, 1.0)]);
        assert_eq!(Comparison::compute(&base, &other), Comparison::default());
    }
}
