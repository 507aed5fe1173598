//! Accident location maps for one state and year.
//!
//! `map_state` does the data work (load, validate the state code, filter,
//! drop sentinel coordinates, compute bounds) and hands the result to a
//! `MapRenderer`. Renderers only draw:
//!
//! - `SvgMapRenderer`: SVG file via Plotters
//! - `AsciiMapRenderer`: fixed-size text grid
//! - `tui::TerminalMapRenderer`: interactive Ratatui view

use tracing::info;

use crate::domain::{AccidentRecord, GeoPoint, MapBounds, RunConfig, StateMap};
use crate::error::{AppError, ErrorKind};
use crate::io::ingest::{STATE, load_table};

pub mod ascii;
pub mod svg;

pub use ascii::AsciiMapRenderer;
pub use svg::SvgMapRenderer;

/// Longitudes above this are FARS "not reported" codes (e.g. 999.9999).
pub const LONGITUDE_SENTINEL: f64 = 900.0;
/// Latitudes above this are FARS "not reported" codes (e.g. 99.9999).
pub const LATITUDE_SENTINEL: f64 = 90.0;

/// Draws a prepared state map.
pub trait MapRenderer {
    /// Draw the base map over `map.bounds`, then one marker per point.
    fn render(&mut self, map: &StateMap) -> Result<(), AppError>;
}

/// What `map_state` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapOutcome {
    /// The renderer was called with `points` markers; `excluded` rows had no
    /// usable coordinates.
    Rendered { points: usize, excluded: usize },
    /// No accident with usable coordinates; nothing was drawn.
    NothingToPlot { state: u32, year: i32 },
}

/// Load `year`, keep accidents in `state`, and render them.
///
/// An unknown state code is an `InvalidArgument` error. An empty selection is
/// not an error: the renderer is not called and `NothingToPlot` is returned.
pub fn map_state(
    state: u32,
    year: i32,
    config: &RunConfig,
    renderer: &mut dyn MapRenderer,
) -> Result<MapOutcome, AppError> {
    let Some(map) = prepare_state_map(state, year, config)? else {
        info!(state, year, "no accidents to plot");
        return Ok(MapOutcome::NothingToPlot { state, year });
    };

    renderer.render(&map)?;
    info!(state, year, points = map.points.len(), excluded = map.excluded, "map rendered");

    Ok(MapOutcome::Rendered {
        points: map.points.len(),
        excluded: map.excluded,
    })
}

/// Build the renderer input for one state and year, or `None` when none of the
/// state's accidents has usable coordinates.
///
/// A table without a STATE column is a `MissingColumn` error.
pub fn prepare_state_map(state: u32, year: i32, config: &RunConfig) -> Result<Option<StateMap>, AppError> {
    let table = load_table(&config.year_path(year), &config.load)?;

    if !table.has_column(STATE) {
        return Err(AppError::new(
            ErrorKind::MissingColumn,
            format!("'{}' has no STATE column", table.source.display()),
        ));
    }
    if !table.states().contains(&state) {
        return Err(AppError::invalid_argument(format!("invalid STATE number: {state}")));
    }

    // Non-empty: `state` was found among the table's states.
    let selected: Vec<&AccidentRecord> = table
        .records
        .iter()
        .filter(|r| r.state == Some(state))
        .collect();

    let points: Vec<GeoPoint> = selected.iter().filter_map(|r| valid_point(r)).collect();
    let excluded = selected.len() - points.len();

    let Some(bounds) = MapBounds::from_points(&points) else {
        return Ok(None);
    };

    Ok(Some(StateMap {
        state,
        year,
        bounds,
        points,
        excluded,
    }))
}

/// Coerce a user-supplied state code (`"6"`, `"6.0"`).
pub fn parse_state(raw: &str) -> Result<u32, AppError> {
    let s = raw.trim();
    s.parse::<u32>()
        .ok()
        .or_else(|| {
            s.parse::<f64>()
                .ok()
                .filter(|v| v.fract() == 0.0 && *v >= 0.0 && *v <= u32::MAX as f64)
                .map(|v| v as u32)
        })
        .ok_or_else(|| {
            AppError::new(
                ErrorKind::TypeConversion,
                format!("cannot convert '{raw}' to a state code"),
            )
        })
}

/// Longitude with sentinel codes treated as missing.
pub fn sanitize_longitude(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v <= LONGITUDE_SENTINEL)
}

/// Latitude with sentinel codes treated as missing.
pub fn sanitize_latitude(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v <= LATITUDE_SENTINEL)
}

/// The record's location, if both coordinates are present after sanitizing.
pub fn valid_point(record: &AccidentRecord) -> Option<GeoPoint> {
    Some(GeoPoint {
        longitude: sanitize_longitude(record.longitude)?,
        latitude: sanitize_latitude(record.latitude)?,
    })
}

pub(crate) fn map_title(map: &StateMap) -> String {
    format!("Accidents, state {} ({})", map.state, map.year)
}
