//! Terminal colors for each theme.

use ratatui::style::Color;

pub use crate::core::system_monitor::display::{Layout, Theme};

impl Theme {
    /// Primary accent color for borders, gauges and charts.
    pub fn color(self) -> Color {
        match self {
            Theme::Green => Color::Green,
            Theme::Red => Color::Red,
            Theme::Blue => Color::Blue,
            Theme::SkyBlue => Color::Rgb(135, 206, 235),
            Theme::Magenta => Color::Magenta,
            Theme::Yellow => Color::Yellow,
            Theme::Gold => Color::Rgb(255, 215, 0),
            Theme::Silver => Color::Rgb(192, 192, 192),
            Theme::White => Color::White,
            Theme::Lime => Color::Rgb(50, 205, 50),
            Theme::Orange => Color::Rgb(255, 165, 0),
            Theme::Violet => Color::Rgb(238, 130, 238),
            Theme::Pink => Color::Rgb(255, 192, 203),
        }
    }

    /// Text drawn on top of the accent color (selected rows, buttons).
    pub fn contrast(self) -> Color {
        match self {
            Theme::Blue | Theme::Red | Theme::Magenta => Color::White,
            _ => Color::Black,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contrast_differs_from_accent() {
        for theme in Theme::ALL {
            assert_ne!(theme.color(), theme.contrast(), "{}", theme);
        }
    }
}
