use crate::model::ReactorStatistic;
use serde::Serialize;
use std::cmp::Ordering;

/// Unit counts summed over every country, for the statistics panel header.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UnitTotals {
    pub operational: u32,
    pub under_construction: u32,
    pub shutdown: u32,
}

/// Countries with the most operational capacity, largest first. Equal
/// capacities keep input order.
pub fn top_by_capacity(stats: &[ReactorStatistic], n: usize) -> Vec<ReactorStatistic> {
    let mut sorted: Vec<ReactorStatistic> = stats.to_vec();
    sorted.sort_by(|a, b| {
        b.operational_capacity_mw
            .partial_cmp(&a.operational_capacity_mw)
            .unwrap_or(Ordering::Equal)
    });
    sorted.truncate(n);
    sorted
}

/// Sums saturate at `u32::MAX`.
pub fn unit_totals(stats: &[ReactorStatistic]) -> UnitTotals {
    stats.iter().fold(UnitTotals::default(), |t, r| UnitTotals {
        operational: t.operational.saturating_add(r.operational_units),
        under_construction: t.under_construction.saturating_add(r.under_construction_units),
        shutdown: t.shutdown.saturating_add(r.shutdown_units),
    })
}
