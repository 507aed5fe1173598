//! Month × year accident counts.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::domain::{MonthRow, RunConfig, SummaryTable};
use crate::summary::aggregate::{YearBatch, aggregate_years};

pub const MONTHS: std::ops::RangeInclusive<u32> = 1..=12;

/// Load the requested years and pivot their counts into a wide table.
///
/// Years that fail to load are left out; see `aggregate_years` for the warnings.
pub fn summarize_years(years: &[i32], config: &RunConfig) -> SummaryTable {
    summarize_batch(&aggregate_years(years, config))
}

/// Concatenate the batch's present tables, count per `(year, month)`, and pivot.
pub fn summarize_batch(batch: &YearBatch) -> SummaryTable {
    let mut counts: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    let mut years = BTreeSet::new();
    let mut out_of_range = 0usize;
    let mut missing_month_or_year = 0usize;

    for table in batch.tables().into_iter().flatten() {
        missing_month_or_year += table.dropped;
        for ym in &table.rows {
            years.insert(ym.year);
            if MONTHS.contains(&ym.month) {
                *counts.entry((ym.year, ym.month)).or_default() += 1;
            } else {
                out_of_range += 1;
            }
        }
    }

    if out_of_range > 0 {
        debug!(out_of_range, "rows with a month outside 1..=12");
    }
    if missing_month_or_year > 0 {
        debug!(missing_month_or_year, "rows without a month or year");
    }

    let years: Vec<i32> = years.into_iter().collect();
    let rows = MONTHS
        .map(|month| MonthRow {
            month,
            counts: years
                .iter()
                .map(|&year| counts.get(&(year, month)).copied())
                .collect(),
        })
        .collect();

    SummaryTable {
        years,
        rows,
        out_of_range,
        missing_month_or_year,
    }
}
