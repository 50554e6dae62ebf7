use std::collections::VecDeque;

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Gauge, Sparkline},
};

use crate::core::system_monitor::MetricsHistory;

/// Bar heights of the power and link sparklines.
pub const SPARKLINE_LEVELS: u64 = 8;

/// Create a gauge with color based on value thresholds
pub fn colored_gauge<'a>(value: f64, label: String, accent: Color) -> Gauge<'a> {
    let color = match value {
        v if v < 60.0 => accent,
        v if v < 85.0 => Color::LightYellow,
        _ => Color::LightRed,
    };

    Gauge::default()
        .gauge_style(Style::default().fg(color).bg(Color::Black))
        .ratio((value / 100.0).clamp(0.0, 1.0))
        .label(label)
}

/// Get color for temperature value
pub fn temp_color(celsius: f64) -> Color {
    match celsius {
        t if t < 50.0 => Color::Cyan,
        t if t < 70.0 => Color::LightYellow,
        t if t < 85.0 => Color::LightRed,
        _ => Color::Red,
    }
}

/// Sparkline of the newest points that fit in `width`, scaled against `ceiling`.
pub fn history_sparkline<'a>(
    queue: &VecDeque<f64>,
    ceiling: f64,
    width: u16,
    color: Color,
    title: String,
) -> Sparkline<'a> {
    let bars = MetricsHistory::scaled(queue, ceiling, SPARKLINE_LEVELS);
    let start = bars.len().saturating_sub(width.saturating_sub(2) as usize);

    Sparkline::default()
        .block(Block::default().title(title).borders(Borders::ALL))
        .style(Style::default().fg(color))
        .max(SPARKLINE_LEVELS)
        .data(bars[start..].iter().copied())
}

pub fn bordered<'a>(title: String, accent: Color) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent))
}
