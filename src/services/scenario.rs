// src/services/scenario.rs
use std::future::Future;
use chrono::NaiveDate;
use log::warn;
use serde::Serialize;

use crate::models::{FutureAssumption, ProjectionPoint, TickerHistory};
use super::batch::fan_out;
use super::calculations::{average_annual_growth, current_price, trailing_eps};
use super::cascade::AssumptionCascade;
use super::projection::calculate_pe_projection;
use super::schedule::earnings_schedule;

/// Starting inputs of a Future PE scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSeed {
    pub ticker: String,
    pub price: f64,
    pub current_eps: f64,
    pub annual_growth_pct: f64,
    pub next_earnings_date: Option<NaiveDate>,
}

impl ScenarioSeed {
    /// Price is the latest actual close, EPS the trailing four reported
    /// quarters, growth the recent year-over-year average.
    pub fn from_history(ticker: &str, history: &TickerHistory) -> Option<Self> {
        let Some((_, price)) = current_price(&history.rows) else {
            warn!("{}: no actual close available", ticker);
            return None;
        };

        let Some(current_eps) = trailing_eps(&history.finance_rows) else {
            warn!("{}: no trailing EPS available", ticker);
            return None;
        };

        let Some(annual_growth_pct) = average_annual_growth(&history.finance_rows) else {
            warn!("{}: not enough finance history for a growth seed", ticker);
            return None;
        };

        Some(ScenarioSeed {
            ticker: ticker.to_string(),
            price,
            current_eps,
            annual_growth_pct,
            next_earnings_date: history.next_earnings_date,
        })
    }
}

/// One user-editable scenario: fixed seed plus the mutable assumption chain.
#[derive(Debug, Clone)]
pub struct FuturePeScenario {
    seed: ScenarioSeed,
    cascade: AssumptionCascade,
}

impl FuturePeScenario {
    pub fn new(seed: ScenarioSeed, today: NaiveDate, quarters: usize) -> Self {
        let dates = earnings_schedule(today, seed.next_earnings_date, quarters);
        let cascade = AssumptionCascade::seed(seed.current_eps, seed.annual_growth_pct, dates);
        FuturePeScenario { seed, cascade }
    }

    pub fn seed(&self) -> &ScenarioSeed {
        &self.seed
    }

    pub fn cascade(&self) -> &AssumptionCascade {
        &self.cascade
    }

    pub fn cascade_mut(&mut self) -> &mut AssumptionCascade {
        &mut self.cascade
    }

    /// Recomputed from scratch on every call.
    pub fn projection(&self, start_date: NaiveDate) -> Vec<ProjectionPoint> {
        calculate_pe_projection(
            self.seed.price,
            self.seed.current_eps,
            self.cascade.assumptions(),
            start_date,
        )
    }

    pub fn view(&self, start_date: NaiveDate) -> ScenarioView {
        ScenarioView {
            seed: self.seed.clone(),
            assumptions: self.cascade.assumptions().to_vec(),
            projection: self.projection(start_date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioView {
    pub seed: ScenarioSeed,
    pub assumptions: Vec<FutureAssumption>,
    pub projection: Vec<ProjectionPoint>,
}

/// Seeded scenarios for several tickers, loaded concurrently.
pub async fn build_scenarios<F, Fut>(
    tickers: &[String],
    today: NaiveDate,
    quarters: usize,
    fetch_history: F,
) -> Vec<(String, Option<ScenarioView>)>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = anyhow::Result<TickerHistory>> + Send + 'static,
{
    fan_out(tickers, |ticker| {
        let history = fetch_history(ticker.clone());
        async move {
            let history = history.await?;
            Ok(ScenarioSeed::from_history(&ticker, &history)
                .map(|seed| FuturePeScenario::new(seed, today, quarters).view(today)))
        }
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DailyRow, FinanceRow};
    use crate::services::cascade::AssumptionEdit;
    use anyhow::anyhow;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn history() -> TickerHistory {
        let eps = [1.0, 1.0, 1.0, 1.0, 1.1, 1.1, 1.1, 1.1];
        let dates = [
            "2022-01-30", "2022-04-30", "2022-07-30", "2022-10-30",
            "2023-01-30", "2023-04-30", "2023-07-30", "2023-10-30",
        ];
        TickerHistory {
            rows: vec![
                DailyRow {
                    date: "2023-12-28".into(),
                    close: Some(80.0),
                    trailing_eps_4q: Some(4.4),
                    ..Default::default()
                },
                DailyRow {
                    date: "2023-12-29".into(),
                    close: Some(88.0),
                    trailing_eps_4q: Some(4.4),
                    ..Default::default()
                },
                DailyRow {
                    date: "2024-03-29".into(),
                    close: Some(120.0),
                    is_forecast_point: true,
                    ..Default::default()
                },
            ],
            finance_rows: dates
                .iter()
                .zip(eps)
                .map(|(date, eps)| FinanceRow {
                    reported_date: date.to_string(),
                    reported_eps: Some(eps),
                    ..Default::default()
                })
                .collect(),
            next_earnings_date: Some(d(2024, 1, 30)),
        }
    }

    #[test]
    fn test_seed_from_history() {
        let seed = ScenarioSeed::from_history("AAA", &history()).unwrap();
        assert_eq!(seed.price, 88.0);
        assert!((seed.current_eps - 4.4).abs() < 1e-9);
        assert!((seed.annual_growth_pct - 10.0).abs() < 1e-9);
        assert_eq!(seed.next_earnings_date, Some(d(2024, 1, 30)));
    }

    #[test]
    fn test_seed_needs_finance_history() {
        let mut h = history();
        h.finance_rows.clear();
        assert_eq!(ScenarioSeed::from_history("AAA", &h), None);

        // five quarters: growth from a single pair, EPS from the last four
        let mut h = history();
        h.finance_rows = h.finance_rows.split_off(3);
        let seed = ScenarioSeed::from_history("AAA", &h).unwrap();
        assert!((seed.current_eps - 4.4).abs() < 1e-9);
        assert!((seed.annual_growth_pct - 10.0).abs() < 1e-9);

        let mut h = history();
        h.rows.retain(|r| r.is_forecast_point);
        assert_eq!(ScenarioSeed::from_history("AAA", &h), None);
    }

    #[test]
    fn test_scenario_projection_follows_edits() {
        let today = d(2024, 1, 2);
        let seed = ScenarioSeed::from_history("AAA", &history()).unwrap();
        let mut scenario = FuturePeScenario::new(seed, today, 4);

        let dates: Vec<NaiveDate> = scenario.cascade().assumptions().iter().map(|a| a.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 30), d(2024, 4, 30), d(2024, 7, 30), d(2024, 10, 30)]);

        let before = scenario.projection(today);
        assert!((before[0].pe_ratio - 20.0).abs() < 1e-9);
        assert_eq!(before.last().unwrap().date, d(2024, 10, 30));

        scenario.cascade_mut().apply_edit(3, AssumptionEdit::Eps(8.8));
        let after = scenario.projection(today);
        assert_eq!(after.len(), before.len());
        assert!((after.last().unwrap().pe_ratio - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_report_due_today_still_hits_every_anchor() {
        let today = d(2024, 1, 2);
        let seed = ScenarioSeed {
            ticker: "AAA".to_string(),
            price: 80.0,
            current_eps: 4.0,
            annual_growth_pct: 20.0,
            next_earnings_date: Some(today),
        };
        let scenario = FuturePeScenario::new(seed, today, 3);
        let assumptions = scenario.cascade().assumptions();
        assert!(assumptions.iter().all(|a| a.date > today));

        let projection = scenario.projection(today);
        assert_eq!(projection[0].implied_eps, 4.0);
        for a in assumptions {
            let hit = projection.iter().find(|p| p.date == a.date).unwrap();
            assert!((hit.implied_eps - a.eps).abs() < 1e-6, "{} vs {}", hit.implied_eps, a.eps);
        }
    }

    #[tokio::test]
    async fn test_build_scenarios_concurrently() {
        let tickers = vec!["AAA".to_string(), "BBB".to_string(), "CCC".to_string()];
        let today = d(2024, 1, 2);
        let results = build_scenarios(&tickers, today, 2, |ticker: String| async move {
            match ticker.as_str() {
                "AAA" => Ok(history()),
                "BBB" => Err(anyhow!("no file for BBB")),
                _ => Ok(TickerHistory::default()),
            }
        })
        .await;

        let view = results[0].1.as_ref().unwrap();
        assert_eq!(view.assumptions.len(), 2);
        assert_eq!(view.projection[0].date, today);
        assert!(results[1].1.is_none());
        assert!(results[2].1.is_none());
    }
}
