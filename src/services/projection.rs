// src/services/projection.rs
use chrono::{Duration, NaiveDate};
use log::debug;

use crate::models::{FutureAssumption, ProjectionPoint};
use super::calculations::safe_ratio;

/// Daily implied PE from `start_date` through the last assumption, holding
/// `price` fixed and interpolating EPS linearly between anchors.
///
/// A pair of anchors on the same day emits nothing, but the next segment
/// starts from the later anchor's EPS. An anchor dated before the previous
/// one is skipped, so dates stay strictly ascending with one point per day.
pub fn calculate_pe_projection(
    price: f64,
    current_eps: f64,
    assumptions: &[FutureAssumption],
    start_date: NaiveDate,
) -> Vec<ProjectionPoint> {
    let mut points = vec![ProjectionPoint {
        date: start_date,
        implied_eps: current_eps,
        pe_ratio: safe_ratio(price, current_eps),
    }];

    let mut anchor_date = start_date;
    let mut anchor_eps = current_eps;

    for assumption in assumptions {
        let days = (assumption.date - anchor_date).num_days();
        if days < 0 {
            debug!(
                "Skipping projection anchor {} (before {})",
                assumption.date, anchor_date
            );
            continue;
        }
        if days == 0 {
            anchor_eps = assumption.eps;
            continue;
        }

        let eps_delta = assumption.eps - anchor_eps;
        for d in 1..=days {
            let t = d as f64 / days as f64;
            let eps = anchor_eps + eps_delta * t;
            points.push(ProjectionPoint {
                date: anchor_date + Duration::days(d),
                implied_eps: eps,
                pe_ratio: safe_ratio(price, eps),
            });
        }

        anchor_date = assumption.date;
        anchor_eps = assumption.eps;
    }

    points
}
