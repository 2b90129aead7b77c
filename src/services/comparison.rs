// src/services/comparison.rs
use std::future::Future;
use chrono::NaiveDate;
use log::{error, warn};

use crate::models::{ComparisonSeries, DailyRow, NormalizedPoint};
use super::batch::{fan_out, normalize_ticker};
use super::calculations::{finite_or_none, parse_row_date};

/// Percentage-return series for one ticker, anchored at its first actual
/// close on or after `start_date`. Needs at least two qualifying rows.
pub fn build_comparison_series(ticker: &str, rows: &[DailyRow], start_date: NaiveDate) -> Option<ComparisonSeries> {
    let mut qualifying: Vec<(NaiveDate, f64, &DailyRow)> = rows
        .iter()
        .filter(|r| !r.is_forecast_point)
        .filter_map(|r| {
            let date = parse_row_date(&r.date)?;
            let close = finite_or_none(r.close)?;
            (date >= start_date).then_some((date, close, r))
        })
        .collect();
    qualifying.sort_by_key(|(date, _, _)| *date);

    if qualifying.len() < 2 {
        warn!(
            "{}: only {} usable rows since {}, need at least 2",
            ticker,
            qualifying.len(),
            start_date
        );
        return None;
    }

    let start_price = qualifying[0].1;
    let end_price = qualifying[qualifying.len() - 1].1;

    let normalized_points = qualifying
        .iter()
        .map(|(date, close, _)| NormalizedPoint {
            date: *date,
            pct_return: (close / start_price - 1.0) * 100.0,
        })
        .collect();

    Some(ComparisonSeries {
        ticker: ticker.to_string(),
        raw_rows: qualifying.iter().map(|(_, _, row)| (*row).clone()).collect(),
        normalized_points,
        start_price,
        end_price,
        total_return_pct: (end_price / start_price - 1.0) * 100.0,
    })
}

/// Loads one ticker's rows through `fetch_rows` and normalizes them.
/// A malformed ticker or a failed fetch yields `None`.
pub async fn fetch_stock_series_for_comparison<F, Fut>(
    ticker: &str,
    start_date: NaiveDate,
    fetch_rows: F,
) -> Option<ComparisonSeries>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = anyhow::Result<Vec<DailyRow>>>,
{
    let ticker = normalize_ticker(ticker)?;
    match fetch_rows(ticker.clone()).await {
        Ok(rows) => build_comparison_series(&ticker, &rows, start_date),
        Err(e) => {
            error!("Failed to fetch rows for {}: {}", ticker, e);
            None
        }
    }
}

/// Comparison series for several tickers, fetched concurrently. Each entry is
/// `None` when that ticker failed or had too little data.
pub async fn compare_tickers<F, Fut>(
    tickers: &[String],
    start_date: NaiveDate,
    fetch_rows: F,
) -> Vec<(String, Option<ComparisonSeries>)>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = anyhow::Result<Vec<DailyRow>>> + Send + 'static,
{
    fan_out(tickers, |ticker| {
        let rows = fetch_rows(ticker.clone());
        async move {
            let rows = rows.await?;
            Ok(build_comparison_series(&ticker, &rows, start_date))
        }
    })
    .await
}
