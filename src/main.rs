use std::collections::BTreeMap;
use std::fs;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use dotenv::dotenv;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use pe_band_engine::config::Settings;
use pe_band_engine::models::{AssumedPeBand, ComparisonSeries, PeBandModel, PriceBandModel, TickerHistory};
use pe_band_engine::services::bands::{build_pe_band_model, build_price_band_model, rebuild_price_estimates};
use pe_band_engine::services::calculations::market_today;
use pe_band_engine::services::comparison::compare_tickers;
use pe_band_engine::services::scenario::{build_scenarios, ScenarioView};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TickerEntry {
    #[serde(flatten)]
    history: TickerHistory,
    /// User-chosen PE band; re-prices the estimate columns before banding.
    assumed_pe: Option<AssumedPeBand>,
}

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    tickers: BTreeMap<String, TickerEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TickerReport {
    ticker: String,
    pe_band: PeBandModel,
    price_band: PriceBandModel,
    scenario: Option<ScenarioView>,
    comparison: Option<ComparisonSeries>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();
    info!("Logger initialized. Starting the projection run...");

    let settings = Settings::from_env()?;
    let today = market_today();
    let comparison_start = settings.comparison_start_or(today);
    info!(
        "Today is {}, comparing from {}, projecting {} quarters",
        today, comparison_start, settings.projection_quarters
    );

    let raw = fs::read_to_string(&settings.scenario_file)
        .with_context(|| format!("reading {}", settings.scenario_file.display()))?;
    let file: ScenarioFile = serde_json::from_str(&raw)
        .with_context(|| format!("parsing {}", settings.scenario_file.display()))?;

    let mut entries: BTreeMap<String, TickerEntry> = BTreeMap::new();
    for (ticker, mut entry) in file.tickers {
        if let Some(band) = entry.assumed_pe {
            entry.history.rows = rebuild_price_estimates(&entry.history.rows, band);
        }
        entries.insert(ticker.trim().to_uppercase(), entry);
    }
    if entries.is_empty() {
        warn!("No tickers in {}", settings.scenario_file.display());
    }

    let tickers: Vec<String> = entries.keys().cloned().collect();
    let store: Arc<BTreeMap<String, TickerHistory>> = Arc::new(
        entries.iter().map(|(t, e)| (t.clone(), e.history.clone())).collect(),
    );

    let history_store = Arc::clone(&store);
    let fetch_history = move |ticker: String| {
        let store = Arc::clone(&history_store);
        async move {
            store
                .get(&ticker)
                .cloned()
                .ok_or_else(|| anyhow!("no data loaded for {}", ticker))
        }
    };
    let fetch_rows = {
        let fetch_history = fetch_history.clone();
        move |ticker: String| {
            let history = fetch_history(ticker);
            async move { history.await.map(|h| h.rows) }
        }
    };

    let (scenarios, comparisons) = tokio::join!(
        build_scenarios(&tickers, today, settings.projection_quarters, fetch_history),
        compare_tickers(&tickers, comparison_start, fetch_rows),
    );
    let mut scenarios: BTreeMap<String, Option<ScenarioView>> = scenarios.into_iter().collect();
    let mut comparisons: BTreeMap<String, Option<ComparisonSeries>> = comparisons.into_iter().collect();

    let reports: Vec<TickerReport> = entries
        .iter()
        .map(|(ticker, entry)| TickerReport {
            ticker: ticker.clone(),
            pe_band: build_pe_band_model(&entry.history.rows),
            price_band: build_price_band_model(&entry.history.rows),
            scenario: scenarios.remove(ticker).flatten(),
            comparison: comparisons.remove(ticker).flatten(),
        })
        .collect();

    info!("Built reports for {} tickers", reports.len());
    println!("{}", serde_json::to_string_pretty(&reports)?);
    Ok(())
}
