//! SVG map export via Plotters.
//!
//! No state outlines are bundled, so the base map is a lon/lat graticule
//! scaled to the accidents' range; each accident is a filled circle.

use std::path::{Path, PathBuf};

use plotters::prelude::*;

use crate::domain::StateMap;
use crate::error::{AppError, ErrorKind};
use crate::map::{MapRenderer, map_title};

/// Writes each rendered map to `path` (overwriting).
#[derive(Debug, Clone)]
pub struct SvgMapRenderer {
    path: PathBuf,
    size: (u32, u32),
}

impl SvgMapRenderer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            size: (800, 600),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width.max(200), height.max(150));
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MapRenderer for SvgMapRenderer {
    fn render(&mut self, map: &StateMap) -> Result<(), AppError> {
        draw_map(map, &self.path, self.size).map_err(|e| {
            AppError::new(
                ErrorKind::Render,
                format!("failed to draw map '{}': {e}", self.path.display()),
            )
        })
    }
}

fn draw_map(map: &StateMap, path: &Path, size: (u32, u32)) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let b = map.bounds.padded(0.04);
    let mut chart = ChartBuilder::on(&root)
        .caption(map_title(map), ("sans-serif", 18))
        .margin(12)
        .set_label_area_size(LabelAreaPosition::Left, 50)
        .set_label_area_size(LabelAreaPosition::Bottom, 36)
        .build_cartesian_2d(b.lon_min..b.lon_max, b.lat_min..b.lat_max)?;

    // Graticule: the mesh is the base map.
    chart
        .configure_mesh()
        .x_desc("longitude")
        .y_desc("latitude")
        .x_labels(6)
        .y_labels(6)
        .x_label_formatter(&|v| format!("{v:.1}°"))
        .y_label_formatter(&|v| format!("{v:.1}°"))
        .bold_line_style(&RGBColor(200, 200, 200))
        .draw()?;

    let marker = RGBColor(200, 30, 30);
    chart.draw_series(
        map.points
            .iter()
            .map(|p| Circle::new((p.longitude, p.latitude), 3, marker.filled())),
    )?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GeoPoint, MapBounds};

    #[test]
    fn writes_one_circle_per_point() {
        let points = vec![
            GeoPoint { longitude: -88.0, latitude: 31.0 },
            GeoPoint { longitude: -85.0, latitude: 35.0 },
        ];
        let map = StateMap {
            state: 1,
            year: 2013,
            bounds: MapBounds::from_points(&points).unwrap(),
            points,
            excluded: 1,
        };

        let dir = tempfile::tempdir().unwrap();
        let mut renderer = SvgMapRenderer::new(dir.path().join("map.svg")).with_size(400, 300);
        renderer.render(&map).unwrap();

        let svg = std::fs::read_to_string(renderer.path()).unwrap();
        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<circle").count(), 2);
    }

    #[test]
    fn unwritable_path_is_render_error() {
        let points = vec![GeoPoint { longitude: -88.0, latitude: 31.0 }];
        let map = StateMap {
            state: 1,
            year: 2013,
            bounds: MapBounds::from_points(&points).unwrap(),
            points,
            excluded: 0,
        };

        let dir = tempfile::tempdir().unwrap();
        let mut renderer = SvgMapRenderer::new(dir.path().join("missing").join("map.svg"));
        let err = renderer.render(&map).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Render);
    }
}
