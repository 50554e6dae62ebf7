//! Display choices held by the application state.
//!
//! Themes and layouts cycle through a fixed list with `next()`. The config
//! file stores their names; the running monitor stores the values. How
//! they are drawn is up to the UI.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Green,
    Red,
    Blue,
    SkyBlue,
    Magenta,
    Yellow,
    Gold,
    Silver,
    White,
    Lime,
    Orange,
    Violet,
    Pink,
}

impl Theme {
    pub const ALL: [Theme; 13] = [
        Theme::Green,
        Theme::Red,
        Theme::Blue,
        Theme::SkyBlue,
        Theme::Magenta,
        Theme::Yellow,
        Theme::Gold,
        Theme::Silver,
        Theme::White,
        Theme::Lime,
        Theme::Orange,
        Theme::Violet,
        Theme::Pink,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Theme::Green => "green",
            Theme::Red => "red",
            Theme::Blue => "blue",
            Theme::SkyBlue => "skyblue",
            Theme::Magenta => "magenta",
            Theme::Yellow => "yellow",
            Theme::Gold => "gold",
            Theme::Silver => "silver",
            Theme::White => "white",
            Theme::Lime => "lime",
            Theme::Orange => "orange",
            Theme::Violet => "violet",
            Theme::Pink => "pink",
        }
    }

    /// Look up a theme by name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Theme> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }

    pub fn next(self) -> Theme {
        let idx = Self::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    /// Gauges, charts and the process table.
    #[default]
    Default,
    /// One-line gauges above a larger process table.
    Compact,
    /// Process table only.
    Processes,
}

impl Layout {
    pub const ALL: [Layout; 3] = [Layout::Default, Layout::Compact, Layout::Processes];

    pub fn name(self) -> &'static str {
        match self {
            Layout::Default => "default",
            Layout::Compact => "compact",
            Layout::Processes => "processes",
        }
    }

    pub fn from_name(name: &str) -> Option<Layout> {
        let name = name.trim().to_ascii_lowercase();
        Self::ALL.iter().copied().find(|l| l.name() == name)
    }

    pub fn next(self) -> Layout {
        match self {
            Layout::Default => Layout::Compact,
            Layout::Compact => Layout::Processes,
            Layout::Processes => Layout::Default,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unit used when printing byte quantities and rates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteUnit {
    #[default]
    Auto,
    Byte,
    Kb,
    Mb,
    Gb,
}

impl ByteUnit {
    pub const NAMES: [&'static str; 5] = ["auto", "byte", "kb", "mb", "gb"];
}

impl FromStr for ByteUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(ByteUnit::Auto),
            "byte" | "b" => Ok(ByteUnit::Byte),
            "kb" => Ok(ByteUnit::Kb),
            "mb" => Ok(ByteUnit::Mb),
            "gb" => Ok(ByteUnit::Gb),
            other => Err(format!("unknown byte unit '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TempUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TempUnit {
    pub const NAMES: [&'static str; 2] = ["celsius", "fahrenheit"];
}

impl FromStr for TempUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "celsius" | "c" => Ok(TempUnit::Celsius),
            "fahrenheit" | "f" => Ok(TempUnit::Fahrenheit),
            other => Err(format!("unknown temperature unit '{}'", other)),
        }
    }
}

impl fmt::Display for TempUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TempUnit::Celsius => "celsius",
            TempUnit::Fahrenheit => "fahrenheit",
        })
    }
}

/// Units selected on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayUnits {
    pub network: ByteUnit,
    pub disk: ByteUnit,
    pub temp: TempUnit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KillButton {
    Confirm,
    #[default]
    Cancel,
}

/// Which screen the input path is driving.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UiMode {
    #[default]
    Normal,
    /// Typing a filter; the text itself lives in the process table.
    Search,
    KillConfirm {
        pid: u32,
        command: String,
        focus: KillButton,
    },
    HelpOverlay {
        saved: Box<UiMode>,
    },
    InfoOverlay {
        saved: Box<UiMode>,
        scroll: u16,
    },
}

impl UiMode {
    pub fn is_overlay(&self) -> bool {
        matches!(self, UiMode::HelpOverlay { .. } | UiMode::InfoOverlay { .. })
    }
}
