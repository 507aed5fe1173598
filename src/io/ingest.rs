//! Accident table loading.
//!
//! Turns a (possibly compressed) delimited file into a `Table`:
//! - codec chosen from the extension unless forced (`bz2`, `gz`, plain)
//! - column types inferred from the full column content
//! - the fields the analyses read are parsed into typed slots; the rest go to
//!   the record's `extra` bag
//!
//! Loading is silent unless `LoadOptions::progress` is set.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use bzip2::read::MultiBzDecoder;
use csv::StringRecord;
use flate2::read::MultiGzDecoder;
use tracing::{debug, info};

use crate::domain::{AccidentRecord, Column, ColumnType, Compression, FieldValue, LoadOptions, Table};
use crate::error::{AppError, ErrorKind};

pub const STATE: &str = "state";
pub const MONTH: &str = "month";
pub const YEAR: &str = "year";
pub const LATITUDE: &str = "latitude";
/// FARS spells the longitude header without the trailing `e`.
pub const LONGITUDE: &str = "longitud";
const LONGITUDE_ALT: &str = "longitude";

/// Cell contents treated as missing, besides the empty string.
const MISSING_MARKERS: [&str; 2] = ["NA", "N/A"];

/// Load one accident file into memory.
pub fn load_table(path: &Path, options: &LoadOptions) -> Result<Table, AppError> {
    if !path.is_file() {
        return Err(AppError::not_found(format!(
            "file '{}' does not exist",
            path.display()
        )));
    }
    let file = File::open(path).map_err(|e| {
        AppError::not_found(format!("file '{}' could not be opened: {e}", path.display()))
    })?;

    let compression = options
        .compression
        .unwrap_or_else(|| Compression::from_path(path));
    let input: Box<dyn Read> = match compression {
        Compression::Bzip2 => Box::new(MultiBzDecoder::new(BufReader::new(file))),
        Compression::Gzip => Box::new(MultiGzDecoder::new(BufReader::new(file))),
        Compression::None => Box::new(BufReader::new(file)),
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .trim(csv::Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| parse_error(path, e))?
        .clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        rows.push(result.map_err(|e| parse_error(path, e))?);
    }

    let kinds = infer_column_types(&rows, headers.len());
    let names: Vec<String> = headers.iter().map(normalize_header_name).collect();

    let records = rows
        .iter()
        .map(|row| build_record(row, &names, &kinds))
        .collect::<Vec<_>>();

    let columns = headers
        .iter()
        .zip(kinds.iter())
        .map(|(name, &kind)| Column {
            name: name.trim_start_matches('\u{feff}').to_string(),
            kind,
        })
        .collect::<Vec<_>>();

    if options.progress {
        info!(
            path = %path.display(),
            ?compression,
            rows = records.len(),
            columns = columns.len(),
            "loaded table"
        );
    } else {
        debug!(path = %path.display(), rows = records.len(), "loaded table");
    }

    Ok(Table {
        source: path.to_path_buf(),
        columns,
        records,
    })
}

fn parse_error(path: &Path, err: csv::Error) -> AppError {
    AppError::new(
        ErrorKind::Parse,
        format!("failed to read '{}': {err}", path.display()),
    )
}

fn normalize_header_name(name: &str) -> String {
    // Some exports put a BOM in front of the first header.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || MISSING_MARKERS.contains(&cell)
}

/// Narrowest type that fits every non-missing cell of each column.
fn infer_column_types(rows: &[StringRecord], width: usize) -> Vec<ColumnType> {
    (0..width)
        .map(|idx| {
            let mut kind = ColumnType::Empty;
            for cell in rows.iter().filter_map(|r| r.get(idx)) {
                if is_missing(cell) {
                    continue;
                }
                kind = widen(kind, classify(cell));
                if kind == ColumnType::Text {
                    break;
                }
            }
            kind
        })
        .collect()
}

fn classify(cell: &str) -> ColumnType {
    if cell.parse::<i64>().is_ok() {
        ColumnType::Integer
    } else if cell.parse::<f64>().is_ok() {
        ColumnType::Float
    } else {
        ColumnType::Text
    }
}

fn widen(current: ColumnType, cell: ColumnType) -> ColumnType {
    use ColumnType::*;
    match (current, cell) {
        (Empty, k) | (k, Empty) => k,
        (Text, _) | (_, Text) => Text,
        (Float, _) | (_, Float) => Float,
        (Integer, Integer) => Integer,
    }
}

fn build_record(row: &StringRecord, names: &[String], kinds: &[ColumnType]) -> AccidentRecord {
    let mut record = AccidentRecord::default();
    let mut extra = BTreeMap::new();

    for ((cell, name), &kind) in row.iter().zip(names).zip(kinds) {
        let missing = is_missing(cell);
        match name.as_str() {
            STATE => record.state = parse_whole(cell).and_then(|v| u32::try_from(v).ok()),
            MONTH => record.month = parse_whole(cell).and_then(|v| u32::try_from(v).ok()),
            YEAR => record.year = parse_whole(cell).and_then(|v| i32::try_from(v).ok()),
            LATITUDE => record.latitude = parse_finite(cell),
            LONGITUDE | LONGITUDE_ALT => record.longitude = parse_finite(cell),
            _ if missing => {
                extra.insert(name.clone(), FieldValue::Missing);
            }
            _ => {
                extra.insert(name.clone(), typed_value(cell, kind));
            }
        }
    }

    record.extra = extra;
    record
}

fn typed_value(cell: &str, kind: ColumnType) -> FieldValue {
    match kind {
        ColumnType::Integer => cell
            .parse::<i64>()
            .map(FieldValue::Integer)
            .unwrap_or_else(|_| FieldValue::Text(cell.to_string())),
        ColumnType::Float => cell
            .parse::<f64>()
            .map(FieldValue::Float)
            .unwrap_or_else(|_| FieldValue::Text(cell.to_string())),
        ColumnType::Text => FieldValue::Text(cell.to_string()),
        ColumnType::Empty => FieldValue::Missing,
    }
}

/// Integer cell, also accepting integer-valued decimals such as `"12.0"`.
fn parse_whole(cell: &str) -> Option<i64> {
    if let Ok(v) = cell.parse::<i64>() {
        return Some(v);
    }
    let v = cell.parse::<f64>().ok()?;
    (v.is_finite() && v.fract() == 0.0).then_some(v as i64)
}

fn parse_finite(cell: &str) -> Option<f64> {
    let v = cell.parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const SAMPLE: &str = "\
STATE,ST_CASE,MONTH,YEAR,DAY,LATITUDE,LONGITUD,ROUTE
1,10001,1,2013,5,32.5,-86.2,US
1,10002,2,2013,7,99.9999,999.9999,
4,40001,2,2013,9,33.1,-111.9,SR
";

    fn write_bz2(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let file = File::create(&path).unwrap();
        let mut enc = bzip2::write::BzEncoder::new(file, bzip2::Compression::default());
        enc.write_all(body.as_bytes()).unwrap();
        enc.finish().unwrap();
        path
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accident_1999.csv.bz2");
        let err = load_table(&path, &LoadOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.message().contains("accident_1999.csv.bz2"));
    }

    #[test]
    fn loads_bz2_with_typed_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_bz2(dir.path(), "accident_2013.csv.bz2", SAMPLE);

        let table = load_table(&path, &LoadOptions::default()).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.columns.len(), 8);

        let first = &table.records[0];
        assert_eq!(first.state, Some(1));
        assert_eq!(first.month, Some(1));
        assert_eq!(first.year, Some(2013));
        assert_eq!(first.latitude, Some(32.5));
        assert_eq!(first.longitude, Some(-86.2));
        assert_eq!(first.extra.get("st_case"), Some(&FieldValue::Integer(10001)));
        assert_eq!(first.extra.get("route"), Some(&FieldValue::Text("US".to_string())));

        // Sentinels are loaded as-is; the map step decides they are missing.
        assert_eq!(table.records[1].longitude, Some(999.9999));
        assert_eq!(table.records[1].extra.get("route"), Some(&FieldValue::Missing));

        assert_eq!(table.states().into_iter().collect::<Vec<_>>(), vec![1, 4]);
    }

    #[test]
    fn infers_column_types_from_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.csv");
        std::fs::write(&path, "A,B,C,D\n1,1.5,x,\n2,3,y,NA\n").unwrap();

        let table = load_table(&path, &LoadOptions::default()).unwrap();
        let kinds: Vec<_> = table.columns.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![ColumnType::Integer, ColumnType::Float, ColumnType::Text, ColumnType::Empty]
        );
        assert_eq!(table.records[1].extra.get("b"), Some(&FieldValue::Float(3.0)));
    }

    #[test]
    fn gzip_and_forced_codec() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accident.dat");
        let file = File::create(&path).unwrap();
        let mut enc = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        enc.write_all(SAMPLE.as_bytes()).unwrap();
        enc.finish().unwrap();

        let options = LoadOptions {
            compression: Some(Compression::Gzip),
            ..LoadOptions::default()
        };
        assert_eq!(load_table(&path, &options).unwrap().len(), 3);
    }

    #[test]
    fn ragged_rows_are_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(&path, "STATE,MONTH\n1,2\n1,2,3\n").unwrap();

        let err = load_table(&path, &LoadOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn corrupt_bz2_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accident_2013.csv.bz2");
        std::fs::write(&path, SAMPLE).unwrap();

        let err = load_table(&path, &LoadOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn bom_and_whole_decimals_are_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bom.csv");
        std::fs::write(&path, "\u{feff}STATE,MONTH,YEAR\n6.0,12,2014\n").unwrap();

        let table = load_table(&path, &LoadOptions::default()).unwrap();
        assert_eq!(table.columns[0].name, "STATE");
        assert!(table.has_column("state"));
        assert_eq!(table.records[0].state, Some(6));
        assert_eq!(table.records[0].month, Some(12));
    }

    #[test]
    fn delimiter_is_configurable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("semi.csv");
        std::fs::write(&path, "STATE;MONTH;YEAR\n5;3;2015\n").unwrap();

        let options = LoadOptions {
            delimiter: b';',
            ..LoadOptions::default()
        };
        let table = load_table(&path, &options).unwrap();
        assert_eq!(table.records[0].state, Some(5));
    }
}
