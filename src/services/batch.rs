// src/services/batch.rs
use std::future::Future;
use std::sync::OnceLock;
use log::{error, info, warn};
use regex::Regex;
use tokio::task::JoinSet;

static TICKER_RE: OnceLock<Option<Regex>> = OnceLock::new();

/// Trims and upper-cases a ticker; `None` if it does not look like a symbol.
pub fn normalize_ticker(raw: &str) -> Option<String> {
    let re = TICKER_RE
        .get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9.\-]{0,9}$").ok())
        .as_ref()?;
    let ticker = raw.trim().to_uppercase();
    if re.is_match(&ticker) {
        Some(ticker)
    } else {
        warn!("Rejecting malformed ticker '{}'", raw);
        None
    }
}

/// Runs `task` for every ticker on its own tokio task and returns the results
/// in input order. A ticker whose task errors or panics yields `None` without
/// affecting the others.
pub async fn fan_out<T, F, Fut>(tickers: &[String], task: F) -> Vec<(String, Option<T>)>
where
    T: Send + 'static,
    F: Fn(String) -> Fut,
    Fut: Future<Output = anyhow::Result<Option<T>>> + Send + 'static,
{
    info!("Fanning out over {} tickers", tickers.len());

    let mut set = JoinSet::new();
    let mut results: Vec<(String, Option<T>)> = Vec::with_capacity(tickers.len());

    for (idx, raw) in tickers.iter().enumerate() {
        results.push((raw.clone(), None));
        let Some(ticker) = normalize_ticker(raw) else {
            continue;
        };
        results[idx].0 = ticker.clone();
        let fut = task(ticker);
        set.spawn(async move { (idx, fut.await) });
    }

    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((idx, Ok(value))) => results[idx].1 = value,
            Ok((idx, Err(e))) => error!("Request for {} failed: {}", results[idx].0, e),
            Err(e) => error!("Ticker task aborted: {}", e),
        }
    }

    info!(
        "Fan-out finished: {}/{} tickers produced a result",
        results.iter().filter(|(_, r)| r.is_some()).count(),
        results.len()
    );
    results
}
