//! Per-year loading with isolated failures.
//!
//! A batch never aborts because one year is missing: each year gets its own
//! `Result`, and failed years surface as `LoadWarning`s collected on the batch.

use tracing::debug;

use crate::domain::{RunConfig, Table, YearMonth, YearMonthTable};
use crate::error::{AppError, ErrorKind};
use crate::io::ingest::{MONTH, YEAR, load_table};

/// Outcome for one requested year.
#[derive(Debug, Clone)]
pub struct YearEntry {
    pub year: i32,
    pub result: Result<YearMonthTable, AppError>,
}

/// A year that could not be loaded or projected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    pub year: i32,
    pub kind: ErrorKind,
    pub message: String,
}

impl std::fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid year: {} ({})", self.year, self.message)
    }
}

/// Results of `aggregate_years`, one entry per requested year in request order.
#[derive(Debug, Clone, Default)]
pub struct YearBatch {
    pub entries: Vec<YearEntry>,
}

impl YearBatch {
    /// Present table or `None`, aligned with the requested years.
    pub fn tables(&self) -> Vec<Option<&YearMonthTable>> {
        self.entries.iter().map(|e| e.result.as_ref().ok()).collect()
    }

    pub fn warnings(&self) -> Vec<LoadWarning> {
        self.entries
            .iter()
            .filter_map(|e| {
                e.result.as_ref().err().map(|err| LoadWarning {
                    year: e.year,
                    kind: err.kind(),
                    message: err.message().to_string(),
                })
            })
            .collect()
    }

    pub fn loaded_years(&self) -> Vec<i32> {
        self.entries
            .iter()
            .filter(|e| e.result.is_ok())
            .map(|e| e.year)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Load each year's file and keep only its `(month, year)` pairs.
pub fn aggregate_years(years: &[i32], config: &RunConfig) -> YearBatch {
    let entries = years
        .iter()
        .map(|&year| {
            let result = load_year(year, config);
            if let Err(err) = &result {
                debug!(year, kind = err.kind().label(), error = %err, "year skipped");
            }
            YearEntry { year, result }
        })
        .collect();

    YearBatch { entries }
}

/// Load a single year and project it to `(month, year)`.
pub fn load_year(year: i32, config: &RunConfig) -> Result<YearMonthTable, AppError> {
    let table = load_table(&config.year_path(year), &config.load)?;
    project_year_month(&table, year)
}

/// Reduce a table to its month/year pairs.
///
/// A table without a MONTH or YEAR column is a `MissingColumn` error; rows with an
/// empty month or year cell are counted in `dropped`.
pub fn project_year_month(table: &Table, year: i32) -> Result<YearMonthTable, AppError> {
    for name in [MONTH, YEAR] {
        if !table.has_column(name) {
            return Err(AppError::new(
                ErrorKind::MissingColumn,
                format!(
                    "'{}' has no {} column",
                    table.source.display(),
                    name.to_ascii_uppercase()
                ),
            ));
        }
    }

    let rows: Vec<YearMonth> = table
        .records
        .iter()
        .filter_map(|r| Some(YearMonth { month: r.month?, year: r.year? }))
        .collect();
    let dropped = table.len() - rows.len();

    Ok(YearMonthTable {
        year,
        rows,
        dropped,
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::domain::{AccidentRecord, Column, ColumnType};

    fn table(columns: &[&str], records: Vec<AccidentRecord>) -> Table {
        Table {
            source: PathBuf::from("accident_2013.csv.bz2"),
            columns: columns
                .iter()
                .map(|n| Column {
                    name: n.to_string(),
                    kind: ColumnType::Integer,
                })
                .collect(),
            records,
        }
    }

    fn record(month: Option<u32>, year: Option<i32>) -> AccidentRecord {
        AccidentRecord {
            month,
            year,
            ..AccidentRecord::default()
        }
    }

    #[test]
    fn projection_keeps_month_and_year() {
        let t = table(
            &["STATE", "MONTH", "YEAR"],
            vec![record(Some(1), Some(2013)), record(Some(2), Some(2013)), record(None, Some(2013))],
        );
        let ym = project_year_month(&t, 2013).unwrap();
        assert_eq!(ym.len(), 2);
        assert_eq!(ym.dropped, 1);
        assert_eq!(ym.rows[1], YearMonth { month: 2, year: 2013 });
    }

    #[test]
    fn missing_year_column_is_distinct_error() {
        let t = table(&["STATE", "MONTH"], vec![record(Some(1), None)]);
        let err = project_year_month(&t, 2013).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingColumn);
        assert!(err.message().contains("YEAR"));
    }

    #[test]
    fn missing_files_become_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig::new(dir.path());

        let batch = aggregate_years(&[2001, 2002], &config);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.tables(), vec![None, None]);
        assert!(batch.loaded_years().is_empty());

        let warnings = batch.warnings();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].year, 2001);
        assert_eq!(warnings[0].kind, ErrorKind::NotFound);
        assert!(warnings[1].to_string().starts_with("invalid year: 2002"));
    }
}
