// src/services/bands.rs
use log::debug;

use crate::models::{
    AssumedPeBand, DailyRow, LastClose, PeBandModel, PeBandPoint, PriceBandModel, PriceBandPoint,
};
use super::calculations::{finite_or_none, last_non_null, parse_row_date};

const PE_PADDING: f64 = 0.08;
const PRICE_PADDING: f64 = 0.05;
const DEGENERATE_PADDING: f64 = 1.0;

fn pool_bounds(pool: &[f64]) -> Option<(f64, f64)> {
    let mut values = pool.iter().copied().filter(|v| v.is_finite());
    let first = values.next()?;
    Some(values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

fn padding_for(range: f64, fraction: f64) -> f64 {
    if range > 0.0 && range.is_finite() {
        range * fraction
    } else {
        DEGENERATE_PADDING
    }
}

/// PE series plus display range. Rows are taken in caller order.
pub fn build_pe_band_model(rows: &[DailyRow]) -> PeBandModel {
    let points: Vec<PeBandPoint> = rows
        .iter()
        .filter_map(|row| {
            let date = parse_row_date(&row.date)?;
            Some(PeBandPoint {
                date,
                pe_ratio: finite_or_none(row.pe_ratio),
            })
        })
        .collect();

    let assumed = AssumedPeBand {
        low: last_non_null(rows, |r| finite_or_none(r.low)),
        mid: last_non_null(rows, |r| finite_or_none(r.mid)),
        high: last_non_null(rows, |r| finite_or_none(r.high)),
    };

    let pool: Vec<f64> = points
        .iter()
        .filter_map(|p| p.pe_ratio)
        .chain([assumed.low, assumed.mid, assumed.high].into_iter().flatten())
        .collect();

    let (y_min, y_max) = match pool_bounds(&pool) {
        Some((lo, hi)) => {
            // Ratios below zero are not charted
            let lo = lo.max(0.0);
            let hi = hi.max(lo);
            let pad = padding_for(hi - lo, PE_PADDING);
            ((lo - pad).max(0.0), hi + pad)
        }
        None => {
            debug!("No finite PE values in {} rows, using unit range", rows.len());
            (0.0, 1.0)
        }
    };

    PeBandModel {
        points,
        assumed,
        y_min,
        y_max,
    }
}

/// Price series with low/mid/high estimates, sorted by date.
pub fn build_price_band_model(rows: &[DailyRow]) -> PriceBandModel {
    let mut points: Vec<PriceBandPoint> = rows
        .iter()
        .filter_map(|row| {
            let date = parse_row_date(&row.date)?;
            Some(PriceBandPoint {
                date,
                close: finite_or_none(row.close),
                low: finite_or_none(row.price_est_low),
                mid: finite_or_none(row.price_est_mid),
                high: finite_or_none(row.price_est_high),
                pe_ratio: finite_or_none(row.pe_ratio),
            })
        })
        .collect();
    points.sort_by_key(|p| p.date);

    let pool: Vec<f64> = points
        .iter()
        .flat_map(|p| [p.close, p.low, p.high, p.mid])
        .flatten()
        .collect();

    let (y_min, y_max) = match pool_bounds(&pool) {
        Some((lo, hi)) => {
            let pad = padding_for(hi - lo, PRICE_PADDING);
            (lo - pad, hi + pad)
        }
        None => {
            debug!("No finite price values in {} rows, using unit range", rows.len());
            (0.0, 1.0)
        }
    };

    let last_close = last_non_null(&points, |p| {
        p.close.map(|close| LastClose { date: p.date, close })
    });

    PriceBandModel {
        points,
        y_min,
        y_max,
        split_date: last_close.map(|lc| lc.date),
        last_close,
    }
}

/// New row set priced off a user-chosen PE band: `price_est_* = trailing EPS x PE`.
pub fn rebuild_price_estimates(rows: &[DailyRow], band: AssumedPeBand) -> Vec<DailyRow> {
    let estimate = |eps: Option<f64>, pe: Option<f64>| -> Option<f64> {
        let value = finite_or_none(eps)? * finite_or_none(pe)?;
        value.is_finite().then_some(value)
    };

    rows.iter()
        .map(|row| DailyRow {
            low: band.low,
            mid: band.mid,
            high: band.high,
            price_est_low: estimate(row.trailing_eps_4q, band.low),
            price_est_mid: estimate(row.trailing_eps_4q, band.mid),
            price_est_high: estimate(row.trailing_eps_4q, band.high),
            ..row.clone()
        })
        .collect()
}
