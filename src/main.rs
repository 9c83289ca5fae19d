// =============================================================================
// coinlens — Main Entry Point
// =============================================================================
//
// Fetches the top markets and one price chart (optionally a second chart to
// compare against), runs the selected indicators, and prints the result as
// JSON on stdout.  Logs go to stderr.  Ctrl+C cancels in-flight requests.
// =============================================================================

use anyhow::{bail, Context, Result};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use coinlens::{
    AnalysisReport, CancelToken, ChartQuery, Comparison, IndicatorSelection, MarketsQuery,
    RuntimeConfig, SafeFetcher,
};

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = env_or("COINLENS_CONFIG", "coinlens.json");
    let config = RuntimeConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        RuntimeConfig::default()
    });

    let coin = env_or("COINLENS_COIN", "bitcoin");
    let vs_currency = env_or("COINLENS_VS", &config.default_vs_currency);
    let days = match std::env::var("COINLENS_DAYS") {
        Ok(raw) => raw
            .trim()
            .parse::<u32>()
            .with_context(|| format!("COINLENS_DAYS must be a whole number of days, got '{raw}'"))?,
        Err(_) => config.default_days,
    };
    let selection = std::env::var("COINLENS_INDICATORS")
        .map(|raw| IndicatorSelection::parse(&raw))
        .unwrap_or_default();
    let compare = std::env::var("COINLENS_COMPARE")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    info!(%coin, %vs_currency, days, indicators = %selection, compare = ?compare, "coinlens starting");

    // ── 2. Fetcher + cancellation ────────────────────────────────────────
    let fetcher = SafeFetcher::new(&config.fetcher)?;
    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, cancelling requests");
                cancel.cancel();
            }
        });
    }

    // ── 3. Fetch concurrently ────────────────────────────────────────────
    let markets_query = MarketsQuery {
        vs_currency: vs_currency.clone(),
        per_page: config.top_markets,
        ..MarketsQuery::default()
    };
    let chart_query = ChartQuery {
        id: coin.clone(),
        vs_currency: vs_currency.clone(),
        days,
    };
    let compare_query = compare.as_ref().map(|id| ChartQuery {
        id: id.clone(),
        ..chart_query.clone()
    });

    let (markets, chart, compare_chart) = tokio::join!(
        fetcher.markets(&markets_query, Some(&cancel)),
        fetcher.market_chart(&chart_query, Some(&cancel)),
        async {
            match &compare_query {
                Some(q) => fetcher.market_chart(q, Some(&cancel)).await,
                None => None,
            }
        }
    );

    let (Some(markets), Some(chart)) = (markets, chart) else {
        bail!("requests cancelled before completion");
    };
    if compare_query.is_some() && compare_chart.is_none() {
        bail!("comparison request cancelled before completion");
    }

    // ── 4. Analysis ──────────────────────────────────────────────────────
    let report = AnalysisReport::compute(&chart.data.prices, &selection);
    let comparison = compare_chart
        .as_ref()
        .map(|other| Comparison::compute(&chart.data.prices, &other.data.prices));

    if markets.is_mock || chart.is_mock {
        warn!("Some data is sample data; live APIs were unavailable");
    }

    let output = json!({
        "markets": markets,
        "chart": {
            "id": chart_query.id,
            "vsCurrency": chart_query.vs_currency,
            "days": chart_query.days,
            "points": chart.data.prices.len(),
            "isMock": chart.is_mock,
            "error": chart.error,
        },
        "analysis": report,
        "comparison": comparison.map(|c| json!({
            "id": compare,
            "isMock": compare_chart.as_ref().map(|r| r.is_mock),
            "series": c,
        })),
    });

    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("failed to serialise report")?
    );
    info!(
        points = chart.data.prices.len(),
        latest_rsi = ?report.latest_rsi(),
        "coinlens finished"
    );
    Ok(())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}
