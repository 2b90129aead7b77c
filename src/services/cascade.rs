// src/services/cascade.rs
//! Forward EPS assumptions for the Future PE simulator.
//!
//! Every node stores a quarterly growth rate. Editing one node rewrites its
//! EPS and lets the EPS of every later node ripple forward through that node's
//! own (unchanged) growth rate. State is swapped wholesale on each edit, so a
//! snapshot taken before an edit never changes underneath its holder.

use std::sync::Arc;
use chrono::NaiveDate;
use log::debug;

use crate::models::FutureAssumption;
use super::calculations::{annual_to_quarterly, quarterly_to_annual};

/// A single-node edit, expressed the way the user typed it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssumptionEdit {
    /// Annual growth percentage; stored as quarterly.
    AnnualGrowth(f64),
    Eps(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    AnnualGrowth,
    Eps,
}

impl AssumptionEdit {
    /// `None` for anything that is not a finite number.
    pub fn parse(kind: EditKind, text: &str) -> Option<Self> {
        let value: f64 = text.trim().trim_end_matches('%').trim().parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        Some(match kind {
            EditKind::AnnualGrowth => AssumptionEdit::AnnualGrowth(value),
            EditKind::Eps => AssumptionEdit::Eps(value),
        })
    }
}

/// Seed chain: each date compounds the previous EPS by the quarterly
/// equivalent of `annual_growth_pct`.
pub fn seed_assumptions(current_eps: f64, annual_growth_pct: f64, dates: &[NaiveDate]) -> Vec<FutureAssumption> {
    let quarterly = annual_to_quarterly(annual_growth_pct);
    let mut prev_eps = current_eps;
    dates
        .iter()
        .map(|&date| {
            let eps = prev_eps * (1.0 + quarterly / 100.0);
            prev_eps = eps;
            FutureAssumption {
                date,
                eps,
                growth_rate: quarterly,
                is_estimate: true,
            }
        })
        .collect()
}

/// Recomputes EPS for `nodes[from..]` from each node's stored growth rate.
fn ripple_forward(nodes: &mut [FutureAssumption], from: usize, base_eps: f64) {
    for i in from..nodes.len() {
        let prev_eps = if i == 0 { base_eps } else { nodes[i - 1].eps };
        nodes[i].eps = prev_eps * (1.0 + nodes[i].growth_rate / 100.0);
    }
}

#[derive(Debug, Clone)]
pub struct AssumptionCascade {
    base_eps: f64,
    base_annual_growth: f64,
    dates: Vec<NaiveDate>,
    nodes: Arc<Vec<FutureAssumption>>,
}

impl AssumptionCascade {
    pub fn seed(current_eps: f64, annual_growth_pct: f64, mut dates: Vec<NaiveDate>) -> Self {
        dates.sort();
        let nodes = seed_assumptions(current_eps, annual_growth_pct, &dates);
        AssumptionCascade {
            base_eps: current_eps,
            base_annual_growth: annual_growth_pct,
            dates,
            nodes: Arc::new(nodes),
        }
    }

    pub fn base_eps(&self) -> f64 {
        self.base_eps
    }

    pub fn assumptions(&self) -> &[FutureAssumption] {
        &self.nodes
    }

    /// Shared handle to the current chain; unaffected by later edits.
    pub fn snapshot(&self) -> Arc<Vec<FutureAssumption>> {
        Arc::clone(&self.nodes)
    }

    fn prev_eps(&self, nodes: &[FutureAssumption], index: usize) -> f64 {
        if index == 0 { self.base_eps } else { nodes[index - 1].eps }
    }

    /// Applies one edit at `index`. Returns false (and leaves state alone) when
    /// the index is out of range or the value is not finite.
    pub fn apply_edit(&mut self, index: usize, edit: AssumptionEdit) -> bool {
        if index >= self.nodes.len() {
            debug!("Ignoring edit at index {} of {} nodes", index, self.nodes.len());
            return false;
        }

        let mut next = self.nodes.as_ref().clone();
        let prev_eps = self.prev_eps(&next, index);

        match edit {
            AssumptionEdit::AnnualGrowth(annual) => {
                if !annual.is_finite() {
                    debug!("Ignoring non-finite growth edit at index {}", index);
                    return false;
                }
                let quarterly = annual_to_quarterly(annual);
                next[index].growth_rate = quarterly;
                next[index].eps = prev_eps * (1.0 + quarterly / 100.0);
            }
            AssumptionEdit::Eps(eps) => {
                if !eps.is_finite() {
                    debug!("Ignoring non-finite EPS edit at index {}", index);
                    return false;
                }
                next[index].eps = eps;
                next[index].growth_rate = if prev_eps == 0.0 {
                    0.0
                } else {
                    (eps / prev_eps - 1.0) * 100.0
                };
            }
        }

        ripple_forward(&mut next, index + 1, self.base_eps);
        self.nodes = Arc::new(next);
        true
    }

    /// Applies an edit typed by the user; unparseable text is a no-op.
    pub fn apply_text_edit(&mut self, index: usize, kind: EditKind, text: &str) -> bool {
        match AssumptionEdit::parse(kind, text) {
            Some(edit) => self.apply_edit(index, edit),
            None => {
                debug!("Ignoring unparseable {:?} input '{}'", kind, text);
                false
            }
        }
    }

    /// Shifts every node's annual growth by `delta_pct` points, one forward pass.
    pub fn apply_global_delta(&mut self, delta_pct: f64) -> bool {
        if !delta_pct.is_finite() {
            return false;
        }
        let mut next = self.nodes.as_ref().clone();
        for i in 0..next.len() {
            let annual = quarterly_to_annual(next[i].growth_rate) + delta_pct;
            let quarterly = annual_to_quarterly(annual);
            let prev_eps = self.prev_eps(&next, i);
            next[i].growth_rate = quarterly;
            next[i].eps = prev_eps * (1.0 + quarterly / 100.0);
        }
        self.nodes = Arc::new(next);
        true
    }

    /// Drops every edit and re-seeds from the original inputs.
    pub fn reset(&mut self) {
        self.nodes = Arc::new(seed_assumptions(self.base_eps, self.base_annual_growth, &self.dates));
    }
}
