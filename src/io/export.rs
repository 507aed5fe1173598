//! Export the month × year summary to CSV or JSON.
//!
//! CSV mirrors the terminal table (absent cells are empty); JSON also records
//! which years were requested and which failed to load.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::domain::SummaryTable;
use crate::error::{AppError, ErrorKind};
use crate::summary::YearBatch;

/// JSON document written by `write_summary_json`.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryExport<'a> {
    pub tool: &'static str,
    pub requested_years: Vec<i32>,
    pub summary: &'a SummaryTable,
    pub warnings: Vec<String>,
}

/// Write the wide table as CSV: `MONTH,<year>,<year>,...`.
pub fn write_summary_csv(path: &Path, summary: &SummaryTable) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| io_error(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record(summary.header())
        .map_err(|e| io_error(format!("Failed to write export CSV header: {e}")))?;

    for row in &summary.rows {
        let record = std::iter::once(row.month.to_string()).chain(
            row.counts
                .iter()
                .map(|c| c.map(|v| v.to_string()).unwrap_or_default()),
        );
        writer
            .write_record(record)
            .map_err(|e| io_error(format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| io_error(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write the summary plus batch metadata as pretty JSON.
pub fn write_summary_json(path: &Path, summary: &SummaryTable, batch: &YearBatch) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| io_error(format!("Failed to create summary JSON '{}': {e}", path.display())))?;

    let export = SummaryExport {
        tool: "fars",
        requested_years: batch.entries.iter().map(|e| e.year).collect(),
        summary,
        warnings: batch.warnings().iter().map(|w| w.to_string()).collect(),
    };

    serde_json::to_writer_pretty(file, &export)
        .map_err(|e| io_error(format!("Failed to write summary JSON: {e}")))?;

    Ok(())
}

fn io_error(message: String) -> AppError {
    AppError::new(ErrorKind::Io, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MonthRow, YearMonth, YearMonthTable};
    use crate::summary::{YearEntry, summarize_batch};

    fn batch() -> YearBatch {
        YearBatch {
            entries: vec![
                YearEntry {
                    year: 2013,
                    result: Ok(YearMonthTable {
                        year: 2013,
                        rows: vec![YearMonth { month: 1, year: 2013 }, YearMonth { month: 1, year: 2013 }],
                        dropped: 1,
                    }),
                },
                YearEntry {
                    year: 9999,
                    result: Err(AppError::not_found("file 'accident_9999.csv.bz2' does not exist")),
                },
            ],
        }
    }

    #[test]
    fn csv_has_header_and_twelve_rows() {
        let summary = summarize_batch(&batch());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        write_summary_csv(&path, &summary).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], "MONTH,2013");
        assert_eq!(lines[1], "1,2");
        assert_eq!(lines[2], "2,");
    }

    #[test]
    fn json_records_requested_years_and_warnings() {
        let batch = batch();
        let summary = summarize_batch(&batch);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        write_summary_json(&path, &summary, &batch).unwrap();

        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["tool"], "fars");
        assert_eq!(value["requested_years"], serde_json::json!([2013, 9999]));
        assert_eq!(value["summary"]["years"], serde_json::json!([2013]));
        assert_eq!(value["summary"]["rows"][0]["counts"], serde_json::json!([2]));
        assert_eq!(value["summary"]["rows"][1]["counts"], serde_json::json!([null]));
        assert_eq!(value["warnings"].as_array().unwrap().len(), 1);
        assert_eq!(value["summary"]["missing_month_or_year"], 1);

        let rows: Vec<MonthRow> = serde_json::from_value(value["summary"]["rows"].clone()).unwrap();
        assert_eq!(rows.len(), 12);
    }

    #[test]
    fn unwritable_export_is_io_error() {
        let summary = summarize_batch(&batch());
        let dir = tempfile::tempdir().unwrap();
        let err = write_summary_csv(&dir.path().join("no/such/dir.csv"), &summary).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
