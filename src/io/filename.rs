//! Year → dataset filename, plus year parsing for CLI input.

use crate::error::{AppError, ErrorKind};

/// Canonical file name for one year's accident data.
pub fn build_filename(year: i32) -> String {
    format!("accident_{year}.csv.bz2")
}

/// Element-wise `build_filename`, preserving order.
pub fn build_filenames(years: &[i32]) -> Vec<String> {
    years.iter().copied().map(build_filename).collect()
}

/// Coerce a user-supplied value to a year.
///
/// Integer-valued decimals (`"2013.0"`) are accepted; anything else is a
/// `TypeConversion` error naming the input.
pub fn parse_year(raw: &str) -> Result<i32, AppError> {
    let s = raw.trim();
    if let Ok(v) = s.parse::<i32>() {
        return Ok(v);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() <= i32::MAX as f64 => Ok(v as i32),
        _ => Err(AppError::new(
            ErrorKind::TypeConversion,
            format!("cannot convert '{raw}' to a year"),
        )),
    }
}

/// Widest inclusive range accepted by `parse_years`.
pub const MAX_YEAR_SPAN: i64 = 200;

/// Parse a comma-separated list of years and inclusive ranges.
///
/// Accepted: `2013`, `2013,2015`, `2013:2015`, `2013..2015`, `2013:2014,2016`.
/// A range may cover at most `MAX_YEAR_SPAN` years.
pub fn parse_years(raw: &str) -> Result<Vec<i32>, AppError> {
    let mut out = Vec::new();
    for piece in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let range = piece
            .split_once("..")
            .or_else(|| piece.split_once(':'));
        match range {
            Some((lo, hi)) => {
                let lo = parse_year(lo)?;
                let hi = parse_year(hi)?;
                if hi < lo {
                    return Err(AppError::invalid_argument(format!(
                        "year range '{piece}' is descending"
                    )));
                }
                if i64::from(hi) - i64::from(lo) >= MAX_YEAR_SPAN {
                    return Err(AppError::invalid_argument(format!(
                        "year range '{piece}' spans more than {MAX_YEAR_SPAN} years"
                    )));
                }
                out.extend(lo..=hi);
            }
            None => out.push(parse_year(piece)?),
        }
    }
    if out.is_empty() {
        return Err(AppError::invalid_argument("no years given"));
    }
    Ok(out)
}
