//! Ratatui-based map viewer.
//!
//! Shows one state's accident map full-screen until `q` or `Esc` is pressed.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::domain::StateMap;
use crate::error::{AppError, ErrorKind};
use crate::map::{MapRenderer, map_title};

mod map_chart;

use map_chart::MapChart;

/// Interactive terminal renderer. Blocks until the user closes the view.
#[derive(Debug, Default)]
pub struct TerminalMapRenderer;

impl MapRenderer for TerminalMapRenderer {
    fn render(&mut self, map: &StateMap) -> Result<(), AppError> {
        let _guard = TerminalGuard::new()?;

        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal =
            Terminal::new(backend).map_err(|e| render_error(format!("Failed to initialize terminal: {e}")))?;

        MapView::new(map).event_loop(&mut terminal)
    }
}

fn render_error(message: String) -> AppError {
    AppError::new(ErrorKind::Render, message)
}

/// Restores the terminal (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| render_error(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(render_error(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct MapView {
    title: String,
    points: Vec<(f64, f64)>,
    excluded: usize,
    lon_bounds: [f64; 2],
    lat_bounds: [f64; 2],
}

impl MapView {
    fn new(map: &StateMap) -> Self {
        let (lon_bounds, lat_bounds) = chart_bounds(map);
        Self {
            title: map_title(map),
            points: map.points.iter().map(|p| (p.longitude, p.latitude)).collect(),
            excluded: map.excluded,
            lon_bounds,
            lat_bounds,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| render_error(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| render_error(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| render_error(format!("Event read error: {e}")))? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                        return Ok(());
                    }
                }
                Event::Resize(_, _) => needs_redraw = true,
                _ => {}
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_map(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let line = Line::from(vec![
            Span::styled(&self.title, Style::default().fg(Color::Cyan)),
            Span::raw(format!(
                " | {} plotted, {} without coordinates",
                self.points.len(),
                self.excluded
            )),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_map(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Map (lon / lat)").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let widget = MapChart {
            points: &self.points,
            lon_bounds: self.lon_bounds,
            lat_bounds: self.lat_bounds,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = Span::styled("q / Esc quit", Style::default().fg(Color::Gray));
        let p = Paragraph::new(Line::from(help)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Lon/lat chart bounds with a 5% margin.
fn chart_bounds(map: &StateMap) -> ([f64; 2], [f64; 2]) {
    let b = map.bounds.padded(0.05);
    ([b.lon_min, b.lon_max], [b.lat_min, b.lat_max])
}
