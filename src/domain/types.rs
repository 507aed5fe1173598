//! Shared domain types.
//!
//! Everything here is built once per call and never mutated afterwards:
//!
//! - loaded tables (`Table`, `AccidentRecord`, `Column`)
//! - per-year projections (`YearMonthTable`)
//! - the wide month × year summary (`SummaryTable`)
//! - map inputs (`GeoPoint`, `MapBounds`, `StateMap`)

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::io::filename::build_filename;

/// A single cell that is not one of the typed record fields.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Missing,
}

/// Column type inferred from the whole column's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
    /// Every cell in the column was empty.
    Empty,
}

impl ColumnType {
    pub fn label(self) -> &'static str {
        match self {
            ColumnType::Integer => "int",
            ColumnType::Float => "float",
            ColumnType::Text => "text",
            ColumnType::Empty => "empty",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Header name as written in the file.
    pub name: String,
    pub kind: ColumnType,
}

/// One accident row.
///
/// The handful of fields the analyses read are typed; the rest of the row is kept
/// in `extra`, keyed by lowercase header name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccidentRecord {
    pub state: Option<u32>,
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub extra: BTreeMap<String, FieldValue>,
}

/// Stream compression applied to an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Compression {
    None,
    Bzip2,
    Gzip,
}

impl Compression {
    /// Pick the codec from the file extension (`.bz2`, `.gz`, anything else is plain).
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("bz2") => Compression::Bzip2,
            Some(ext) if ext.eq_ignore_ascii_case("gz") => Compression::Gzip,
            _ => Compression::None,
        }
    }
}

/// Options for `load_table`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Emit an `info` event with row/column counts once a file is parsed.
    ///
    /// Off by default: loading is silent unless the caller opts in.
    pub progress: bool,
    pub delimiter: u8,
    /// Force a codec instead of guessing from the extension.
    pub compression: Option<Compression>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            progress: false,
            delimiter: b',',
            compression: None,
        }
    }
}

/// Where yearly files live and how to read them.
///
/// Built from CLI flags (plus `FARS_DATA_DIR`), or directly by library callers.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_dir: PathBuf,
    pub load: LoadOptions,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            load: LoadOptions::default(),
        }
    }
}

impl RunConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            load: LoadOptions::default(),
        }
    }

    /// Path of the accident file for `year` inside `data_dir`.
    pub fn year_path(&self, year: i32) -> PathBuf {
        self.data_dir.join(build_filename(year))
    }
}

/// A loaded accident file.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub source: PathBuf,
    pub columns: Vec<Column>,
    pub records: Vec<AccidentRecord>,
}

impl Table {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Case-insensitive column lookup.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Distinct state codes present in the table.
    pub fn states(&self) -> BTreeSet<u32> {
        self.records.iter().filter_map(|r| r.state).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub month: u32,
    pub year: i32,
}

/// One year's table reduced to `(month, year)` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct YearMonthTable {
    /// The year that was requested (the rows carry the year found in the file).
    pub year: i32,
    pub rows: Vec<YearMonth>,
    /// Rows skipped because their month or year cell was empty.
    pub dropped: usize,
}

impl YearMonthTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One month row of the wide summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthRow {
    pub month: u32,
    /// Aligned with `SummaryTable::years`; `None` where no accident was recorded.
    pub counts: Vec<Option<usize>>,
}

/// Accident counts pivoted to one row per month and one column per year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryTable {
    /// Distinct years, ascending.
    pub years: Vec<i32>,
    /// Always twelve rows, months 1..=12 in order.
    pub rows: Vec<MonthRow>,
    /// Rows whose month fell outside 1..=12 and so have no summary row.
    pub out_of_range: usize,
    /// Rows dropped before counting because their MONTH or YEAR cell was empty.
    #[serde(default)]
    pub missing_month_or_year: usize,
}

impl SummaryTable {
    /// Month column plus one column per year.
    pub fn column_count(&self) -> usize {
        self.years.len() + 1
    }

    pub fn header(&self) -> Vec<String> {
        std::iter::once("MONTH".to_string())
            .chain(self.years.iter().map(|y| y.to_string()))
            .collect()
    }

    pub fn count(&self, month: u32, year: i32) -> Option<usize> {
        let col = self.years.iter().position(|&y| y == year)?;
        self.rows
            .iter()
            .find(|r| r.month == month)
            .and_then(|r| r.counts.get(col).copied().flatten())
    }

    /// Sum of a year column (absent cells count as zero).
    pub fn total_for(&self, year: i32) -> usize {
        let Some(col) = self.years.iter().position(|&y| y == year) else {
            return 0;
        };
        self.rows
            .iter()
            .filter_map(|r| r.counts.get(col).copied().flatten())
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

/// Exact coordinate range of the plotted points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapBounds {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl MapBounds {
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        let mut b = MapBounds {
            lon_min: f64::INFINITY,
            lon_max: f64::NEG_INFINITY,
            lat_min: f64::INFINITY,
            lat_max: f64::NEG_INFINITY,
        };
        for p in points {
            b.lon_min = b.lon_min.min(p.longitude);
            b.lon_max = b.lon_max.max(p.longitude);
            b.lat_min = b.lat_min.min(p.latitude);
            b.lat_max = b.lat_max.max(p.latitude);
        }
        let finite = b.lon_min.is_finite()
            && b.lon_max.is_finite()
            && b.lat_min.is_finite()
            && b.lat_max.is_finite();
        finite.then_some(b)
    }

    /// Bounds widened so neither axis is degenerate, plus a fractional margin.
    ///
    /// A single accident would otherwise give a zero-width range, which no
    /// renderer can scale.
    pub fn padded(&self, frac: f64) -> Self {
        let (lon_min, lon_max) = pad_axis(self.lon_min, self.lon_max, frac);
        let (lat_min, lat_max) = pad_axis(self.lat_min, self.lat_max, frac);
        MapBounds {
            lon_min,
            lon_max,
            lat_min,
            lat_max,
        }
    }
}

fn pad_axis(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    if span < 1e-9 {
        return (min - 0.5, max + 0.5);
    }
    let pad = span * frac;
    (min - pad, max + pad)
}

/// Everything a renderer needs to draw one state's accidents.
#[derive(Debug, Clone, PartialEq)]
pub struct StateMap {
    pub state: u32,
    pub year: i32,
    pub bounds: MapBounds,
    /// `(longitude, latitude)` pairs with valid coordinates, in file order.
    pub points: Vec<GeoPoint>,
    /// Rows of this state dropped for missing or sentinel coordinates.
    pub excluded: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compression_from_extension() {
        assert_eq!(Compression::from_path(Path::new("accident_2013.csv.bz2")), Compression::Bzip2);
        assert_eq!(Compression::from_path(Path::new("a.CSV.GZ")), Compression::Gzip);
        assert_eq!(Compression::from_path(Path::new("a.csv")), Compression::None);
        assert_eq!(Compression::from_path(Path::new("noext")), Compression::None);
    }

    #[test]
    fn year_path_joins_data_dir() {
        let config = RunConfig::new("/data/fars");
        assert_eq!(
            config.year_path(2014),
            PathBuf::from("/data/fars/accident_2014.csv.bz2")
        );
    }

    #[test]
    fn bounds_pad_degenerate_axis() {
        let bounds = MapBounds::from_points(&[GeoPoint { longitude: -90.0, latitude: 35.0 }]).unwrap();
        let padded = bounds.padded(0.05);
        assert!((padded.lon_min - -90.5).abs() < 1e-12);
        assert!((padded.lat_max - 35.5).abs() < 1e-12);
        assert!(MapBounds::from_points(&[]).is_none());
    }

    #[test]
    fn summary_totals_skip_absent_cells() {
        let table = SummaryTable {
            years: vec![2013, 2014],
            rows: (1..=12)
                .map(|month| MonthRow {
                    month,
                    counts: vec![Some(month as usize), None],
                })
                .collect(),
            out_of_range: 0,
            missing_month_or_year: 0,
        };
        assert_eq!(table.total_for(2013), 78);
        assert_eq!(table.total_for(2014), 0);
        assert_eq!(table.count(3, 2013), Some(3));
        assert_eq!(table.count(3, 2014), None);
        assert_eq!(table.header(), vec!["MONTH", "2013", "2014"]);
    }
}
