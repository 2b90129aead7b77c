// src/bin/test_cascade.rs
// Usage: test_cascade <current_eps> <annual_growth_pct> [quarters] [delta_pct]
use std::env;

use anyhow::Context;
use dotenv::dotenv;
use pe_band_engine::services::calculations::{market_today, quarterly_to_annual};
use pe_band_engine::services::cascade::AssumptionCascade;
use pe_band_engine::services::schedule::quarterly_dates;

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let current_eps: f64 = args.first().context("missing current EPS")?.parse()?;
    let annual_growth: f64 = args.get(1).context("missing annual growth %")?.parse()?;
    let quarters: usize = args.get(2).map(|s| s.parse()).transpose()?.unwrap_or(4);
    let delta: Option<f64> = args.get(3).map(|s| s.parse()).transpose()?;

    let mut cascade = AssumptionCascade::seed(current_eps, annual_growth, quarterly_dates(market_today(), quarters));
    if let Some(delta) = delta {
        cascade.apply_global_delta(delta);
    }

    println!("{:<12} {:>10} {:>12} {:>12}", "date", "eps", "q growth %", "ann growth %");
    for node in cascade.assumptions() {
        println!(
            "{:<12} {:>10.4} {:>12.4} {:>12.4}",
            node.date.to_string(),
            node.eps,
            node.growth_rate,
            quarterly_to_annual(node.growth_rate)
        );
    }
    Ok(())
}
