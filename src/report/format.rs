//! Terminal formatting for summaries, load warnings, tables, and map outcomes.
//!
//! Formatting lives here so output changes stay local and snapshot-testable.

use chrono::Month;

use crate::domain::{SummaryTable, Table};
use crate::map::MapOutcome;
use crate::summary::LoadWarning;

const ABSENT: &str = "-";

/// Format the wide month × year table.
pub fn format_summary(summary: &SummaryTable) -> String {
    let header = summary.header();
    let widths: Vec<usize> = header.iter().map(|h| h.len().max(6)).collect();

    let mut out = String::new();
    out.push_str(&format!("{:<w$}", header[0], w = widths[0]));
    for (h, w) in header.iter().zip(&widths).skip(1) {
        out.push_str(&format!(" {h:>w$}"));
    }
    out.push('\n');

    for row in &summary.rows {
        out.push_str(&format!("{:<w$}", month_label(row.month), w = widths[0]));
        for (count, w) in row.counts.iter().zip(widths.iter().skip(1)) {
            let cell = count.map(|c| c.to_string()).unwrap_or_else(|| ABSENT.to_string());
            out.push_str(&format!(" {cell:>w$}"));
        }
        out.push('\n');
    }

    if !summary.years.is_empty() {
        out.push_str(&format!("{:<w$}", "Total", w = widths[0]));
        for (year, w) in summary.years.iter().zip(widths.iter().skip(1)) {
            out.push_str(&format!(" {:>w$}", summary.total_for(*year)));
        }
        out.push('\n');
    }

    if summary.out_of_range > 0 {
        out.push_str(&format!(
            "({} rows with a month outside 1-12 not shown)\n",
            summary.out_of_range
        ));
    }
    if summary.missing_month_or_year > 0 {
        out.push_str(&format!(
            "({} rows without a month or year not counted)\n",
            summary.missing_month_or_year
        ));
    }

    out
}

/// One line per year that could not be loaded.
pub fn format_warnings(warnings: &[LoadWarning]) -> String {
    warnings
        .iter()
        .map(|w| format!("warning: {w}\n"))
        .collect()
}

/// Row/column counts and the inferred schema of a loaded table.
pub fn format_table_overview(table: &Table) -> String {
    let mut out = String::new();
    out.push_str(&format!("Table: {}\n", table.source.display()));
    out.push_str(&format!(
        "Rows: {} | Columns: {} | States: {}\n",
        table.len(),
        table.columns.len(),
        table.states().len()
    ));

    let name_width = table
        .columns
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(0);
    for column in &table.columns {
        out.push_str(&format!(
            "  {:<w$}  {}\n",
            column.name,
            column.kind.label(),
            w = name_width
        ));
    }
    out
}

pub fn format_map_outcome(outcome: &MapOutcome) -> String {
    match outcome {
        MapOutcome::Rendered { points, excluded } => {
            format!("Plotted {points} accidents ({excluded} without usable coordinates).")
        }
        MapOutcome::NothingToPlot { state, year } => {
            format!("No accidents to plot for state {state} in {year}.")
        }
    }
}

fn month_label(month: u32) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name()[..3].to_string())
        .unwrap_or_else(|| month.to_string())
}
