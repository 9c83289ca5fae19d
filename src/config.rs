// =============================================================================
// Runtime Configuration — fetcher tuning and analysis defaults
// =============================================================================
//
// Every tunable constant of the data layer lives here (retry budget, backoff
// base, per-attempt timeout, base URLs) so none of them is a literal in the
// fetch path.  All fields carry `#[serde(default)]` so a partial JSON file,
// or `{}`, still loads.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_max_retries() -> u32 {
    2
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_timeout_ms() -> u64 {
    8000
}

fn default_connect_timeout_ms() -> u64 {
    5000
}

fn default_coingecko_base_url() -> String {
    "https://api.coingecko.com/api/v3".to_string()
}

fn default_cryptocompare_base_url() -> String {
    "https://min-api.cryptocompare.com".to_string()
}

fn default_user_agent() -> String {
    concat!("coinlens/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_chart_fallback_days() -> Option<u32> {
    Some(30)
}

fn default_news_lang() -> String {
    "EN".to_string()
}

fn default_vs_currency() -> String {
    "usd".to_string()
}

fn default_days() -> u32 {
    90
}

fn default_top_markets() -> u32 {
    12
}

// =============================================================================
// FetcherConfig
// =============================================================================

/// Retry, timeout, and endpoint settings for the resilient fetcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Retries after the first failed attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry; doubled for each further retry.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Wall-clock budget of a single attempt.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// TCP/TLS connect timeout of the HTTP client.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_coingecko_base_url")]
    pub coingecko_base_url: String,

    #[serde(default = "default_cryptocompare_base_url")]
    pub cryptocompare_base_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// History range retried once after the requested range keeps failing.
    /// `null` disables the extra attempt.
    #[serde(default = "default_chart_fallback_days")]
    pub chart_fallback_days: Option<u32>,

    /// Language of the news feed when the caller does not pick one.
    #[serde(default = "default_news_lang")]
    pub news_lang: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            coingecko_base_url: default_coingecko_base_url(),
            cryptocompare_base_url: default_cryptocompare_base_url(),
            user_agent: default_user_agent(),
            chart_fallback_days: default_chart_fallback_days(),
            news_lang: default_news_lang(),
        }
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Quote currency used when none is requested.
    #[serde(default = "default_vs_currency")]
    pub default_vs_currency: String,

    /// Chart range in days used when none is requested.
    #[serde(default = "default_days")]
    pub default_days: u32,

    /// Size of the "top coins" list fetched alongside a chart.
    #[serde(default = "default_top_markets")]
    pub top_markets: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            fetcher: FetcherConfig::default(),
            default_vs_currency: default_vs_currency(),
            default_days: default_days(),
            top_markets: default_top_markets(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults
    /// with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;

        info!(
            path = %path.display(),
            max_retries = config.fetcher.max_retries,
            timeout_ms = config.fetcher.timeout_ms,
            "config loaded"
        );

        Ok(config)
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.fetcher.max_retries, 2);
        assert_eq!(cfg.fetcher.base_delay_ms, 1000);
        assert_eq!(cfg.fetcher.timeout_ms, 8000);
        assert_eq!(cfg.fetcher.chart_fallback_days, Some(30));
        assert_eq!(cfg.default_vs_currency, "usd");
        assert_eq!(cfg.default_days, 90);
        assert!(cfg.fetcher.user_agent.starts_with("coinlens/"));
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, RuntimeConfig::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "fetcher": { "max_retries": 5, "chart_fallback_days": null }, "top_markets": 3 }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.fetcher.max_retries, 5);
        assert_eq!(cfg.fetcher.chart_fallback_days, None);
        assert_eq!(cfg.fetcher.timeout_ms, 8000);
        assert_eq!(cfg.top_markets, 3);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = RuntimeConfig::load("/definitely/not/here/coinlens.json").unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }

    #[test]
    fn load_reads_file() {
        let path = std::env::temp_dir().join(format!("coinlens-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, r#"{ "default_days": 30 }"#).unwrap();
        let cfg = RuntimeConfig::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(cfg.default_days, 30);
    }
}
