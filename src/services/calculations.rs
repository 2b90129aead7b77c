// src/services/calculations.rs
use chrono::{NaiveDate, NaiveDateTime, Utc};
use chrono_tz::US::Eastern;
use log::warn;

use crate::models::{DailyRow, FinanceRow};

/// Converts an annual growth percentage to the equivalent quarterly percentage:
/// `(1 + annual)^(1/4) - 1`. Rates at or below -100% clamp to -100%.
pub fn annual_to_quarterly(annual_pct: f64) -> f64 {
    let base = (1.0 + annual_pct / 100.0).max(0.0);
    (base.powf(0.25) - 1.0) * 100.0
}

/// Inverse of [`annual_to_quarterly`]: `(1 + quarterly)^4 - 1`.
pub fn quarterly_to_annual(quarterly_pct: f64) -> f64 {
    let base = (1.0 + quarterly_pct / 100.0).max(0.0);
    (base.powi(4) - 1.0) * 100.0
}

pub fn finite_or_none(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// `numerator / denominator`, or 0 when the result would not be finite.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let ratio = numerator / denominator;
    if ratio.is_finite() { ratio } else { 0.0 }
}

/// Scans from the end and returns the first selected value that is present.
pub fn last_non_null<T, U, F>(items: &[T], selector: F) -> Option<U>
where
    F: Fn(&T) -> Option<U>,
{
    items.iter().rev().find_map(selector)
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part (`T...` or ` ...`).
pub fn parse_row_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    trimmed
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// Current calendar date on the US market clock.
pub fn market_today() -> NaiveDate {
    Utc::now().with_timezone(&Eastern).date_naive()
}

/// Latest actual close, ignoring forecast rows and rows without a usable close.
pub fn current_price(rows: &[DailyRow]) -> Option<(NaiveDate, f64)> {
    let mut dated: Vec<(NaiveDate, f64)> = rows
        .iter()
        .filter(|r| !r.is_forecast_point)
        .filter_map(|r| Some((parse_row_date(&r.date)?, finite_or_none(r.close)?)))
        .collect();
    dated.sort_by_key(|(date, _)| *date);
    last_non_null(&dated, |entry| Some(*entry))
}

fn reported_eps_history(finance_rows: &[FinanceRow]) -> Vec<f64> {
    let mut dated: Vec<(NaiveDate, f64)> = finance_rows
        .iter()
        .filter_map(|r| Some((parse_row_date(&r.reported_date)?, finite_or_none(r.reported_eps)?)))
        .collect();
    dated.sort_by_key(|(date, _)| *date);
    dated.into_iter().map(|(_, eps)| eps).collect()
}

/// Trailing-twelve-month EPS: the sum of the last four reported quarters.
pub fn trailing_eps(finance_rows: &[FinanceRow]) -> Option<f64> {
    let history = reported_eps_history(finance_rows);
    if history.len() < 4 {
        warn!("Only {} reported quarters available, need 4 for trailing EPS", history.len());
        return None;
    }
    Some(history[history.len() - 4..].iter().sum())
}

/// Mean year-over-year growth (annual %) of the latest four quarters, each
/// compared to the quarter four reports earlier.
///
/// Averaging per-quarter ratios lets a quarter with a non-positive prior be
/// dropped on its own; a single ratio of two four-quarter sums would have to
/// be discarded whole whenever the earlier sum is not positive.
pub fn average_annual_growth(finance_rows: &[FinanceRow]) -> Option<f64> {
    let history = reported_eps_history(finance_rows);
    if history.len() < 5 {
        warn!("Only {} reported quarters available, need 5+ for growth", history.len());
        return None;
    }

    let first = history.len().saturating_sub(4).max(4);
    let growths: Vec<f64> = (first..history.len())
        .filter_map(|i| {
            let prior = history[i - 4];
            if prior <= 0.0 {
                None
            } else {
                Some((history[i] / prior - 1.0) * 100.0)
            }
        })
        .collect();

    if growths.is_empty() {
        warn!("No quarter pair with positive prior EPS, cannot derive growth");
        return None;
    }
    Some(growths.iter().sum::<f64>() / growths.len() as f64)
}
