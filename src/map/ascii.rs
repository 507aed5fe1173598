//! Text map for terminal output.
//!
//! Fixed-size grid, deterministic output (handy for golden tests):
//! - base map: a frame spanning the data's lon/lat range
//! - accidents: `*` (several accidents in one cell show as one mark)

use crate::domain::StateMap;
use crate::error::AppError;
use crate::map::{MapRenderer, map_title};

/// Largest grid drawn; bigger requests are clamped.
pub const MAX_WIDTH: usize = 1000;
pub const MAX_HEIGHT: usize = 500;

/// Renders into a string kept on the renderer.
#[derive(Debug, Clone)]
pub struct AsciiMapRenderer {
    width: usize,
    height: usize,
    output: Option<String>,
}

impl AsciiMapRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            output: None,
        }
    }

    /// The last rendered map, if any.
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }
}

impl MapRenderer for AsciiMapRenderer {
    fn render(&mut self, map: &StateMap) -> Result<(), AppError> {
        self.output = Some(render_ascii_map(map, self.width, self.height));
        Ok(())
    }
}

/// Render a state map as text.
pub fn render_ascii_map(map: &StateMap, width: usize, height: usize) -> String {
    let width = width.clamp(10, MAX_WIDTH);
    let height = height.clamp(4, MAX_HEIGHT);
    let b = map.bounds.padded(0.0);

    let mut grid = vec![vec![' '; width]; height];
    for p in &map.points {
        let x = map_x(p.longitude, b.lon_min, b.lon_max, width);
        let y = map_y(p.latitude, b.lat_min, b.lat_max, height);
        grid[y][x] = '*';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{} | lon=[{:.2}, {:.2}] lat=[{:.2}, {:.2}] | points={}\n",
        map_title(map),
        b.lon_min,
        b.lon_max,
        b.lat_min,
        b.lat_max,
        map.points.len(),
    ));

    let border = format!("+{}+\n", "-".repeat(width));
    out.push_str(&border);
    for row in grid {
        out.push('|');
        out.push_str(&row.into_iter().collect::<String>());
        out.push_str("|\n");
    }
    out.push_str(&border);

    out
}

fn map_x(lon: f64, lon_min: f64, lon_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((lon - lon_min) / (lon_max - lon_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(lat: f64, lat_min: f64, lat_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((lat - lat_min) / (lat_max - lat_min)).clamp(0.0, 1.0);
    // north is row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GeoPoint, MapBounds};

    fn state_map(points: Vec<GeoPoint>) -> StateMap {
        StateMap {
            state: 1,
            year: 2013,
            bounds: MapBounds::from_points(&points).unwrap(),
            points,
            excluded: 0,
        }
    }

    #[test]
    fn map_golden_snapshot_small() {
        let map = state_map(vec![
            GeoPoint { longitude: -88.0, latitude: 31.0 },
            GeoPoint { longitude: -85.0, latitude: 35.0 },
            GeoPoint { longitude: -86.5, latitude: 33.0 },
        ]);

        let txt = render_ascii_map(&map, 10, 4);
        let expected = concat!(
            "Accidents, state 1 (2013) | lon=[-88.00, -85.00] lat=[31.00, 35.00] | points=3\n",
            "+----------+\n",
            "|         *|\n",
            "|          |\n",
            "|     *    |\n",
            "|*         |\n",
            "+----------+\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn single_point_is_centered() {
        let map = state_map(vec![GeoPoint { longitude: -100.0, latitude: 40.0 }]);
        let txt = render_ascii_map(&map, 11, 5);
        let rows: Vec<&str> = txt.lines().collect();
        assert_eq!(rows[4], "|     *     |");
    }

    #[test]
    fn oversized_grid_is_clamped() {
        let map = state_map(vec![GeoPoint { longitude: -100.0, latitude: 40.0 }]);
        let txt = render_ascii_map(&map, usize::MAX, usize::MAX);
        let rows: Vec<&str> = txt.lines().collect();
        assert_eq!(rows.len(), MAX_HEIGHT + 3);
        assert_eq!(rows[1].len(), MAX_WIDTH + 2);
    }

    #[test]
    fn renderer_keeps_output() {
        let map = state_map(vec![GeoPoint { longitude: -100.0, latitude: 40.0 }]);
        let mut renderer = AsciiMapRenderer::new(20, 6);
        assert!(renderer.output().is_none());
        renderer.render(&map).unwrap();
        assert!(renderer.output().unwrap().contains("points=1"));
    }
}
