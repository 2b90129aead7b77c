// src/models.rs
use serde::{Serialize, Deserialize};
use chrono::NaiveDate;

/// One trading day for one ticker, as handed over by the row loader.
///
/// Numeric fields are already coerced: "nan"/"null"/"none" cells arrive as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyRow {
    /// ISO date, optionally with a time part. Empty when the loader had nothing.
    pub date: String,
    pub close: Option<f64>,
    #[serde(rename = "trailingEPS4Q")]
    pub trailing_eps_4q: Option<f64>,
    pub pe_ratio: Option<f64>,
    #[serde(default)]
    pub is_forecast_point: bool,
    // Assumed PE band, constant across a ticker's series
    pub low: Option<f64>,
    pub mid: Option<f64>,
    pub high: Option<f64>,
    pub price_est_low: Option<f64>,
    pub price_est_mid: Option<f64>,
    pub price_est_high: Option<f64>,
}

/// One reported quarter from the finance history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceRow {
    pub reported_date: String,
    #[serde(rename = "reportedEPS")]
    pub reported_eps: Option<f64>,
    pub net_income: Option<f64>,
    pub total_revenue: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeBandPoint {
    pub date: NaiveDate,
    pub pe_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBandPoint {
    pub date: NaiveDate,
    pub close: Option<f64>,
    pub low: Option<f64>,
    pub mid: Option<f64>,
    pub high: Option<f64>,
    pub pe_ratio: Option<f64>,
}

/// Low/mid/high PE multiples (5th/50th/95th percentile, fitted upstream).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AssumedPeBand {
    pub low: Option<f64>,
    pub mid: Option<f64>,
    pub high: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeBandModel {
    pub points: Vec<PeBandPoint>,
    pub assumed: AssumedPeBand,
    pub y_min: f64,
    pub y_max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LastClose {
    pub date: NaiveDate,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBandModel {
    pub points: Vec<PriceBandPoint>,
    pub y_min: f64,
    pub y_max: f64,
    pub last_close: Option<LastClose>,
    /// Boundary between history and forecast; same date as `last_close`.
    pub split_date: Option<NaiveDate>,
}

/// A forward earnings-date anchor.
///
/// `growth_rate` is a QUARTERLY percentage. Annual figures only exist at the
/// edges, see `services::calculations::annual_to_quarterly`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FutureAssumption {
    pub date: NaiveDate,
    pub eps: f64,
    pub growth_rate: f64,
    pub is_estimate: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPoint {
    pub date: NaiveDate,
    #[serde(rename = "impliedEPS")]
    pub implied_eps: f64,
    pub pe_ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPoint {
    pub date: NaiveDate,
    pub pct_return: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSeries {
    pub ticker: String,
    pub raw_rows: Vec<DailyRow>,
    pub normalized_points: Vec<NormalizedPoint>,
    pub start_price: f64,
    pub end_price: f64,
    pub total_return_pct: f64,
}

/// Everything the loaders hand over for one ticker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerHistory {
    #[serde(default)]
    pub rows: Vec<DailyRow>,
    #[serde(default)]
    pub finance_rows: Vec<FinanceRow>,
    pub next_earnings_date: Option<NaiveDate>,
}
