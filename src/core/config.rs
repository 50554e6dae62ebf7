use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::system_monitor::{Layout, SortColumn, SortSpec, Theme};

/// User preferences persisted between runs as pretty JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_layout")]
    pub layout: String,
    #[serde(default)]
    pub sort_column: Option<SortColumn>,
    #[serde(default)]
    pub sort_reverse: bool,
    #[serde(default)]
    pub interval_ms: Option<u64>,
}

fn default_theme() -> String {
    Theme::default().name().to_string()
}

fn default_layout() -> String {
    Layout::default().name().to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            layout: default_layout(),
            sort_column: None,
            sort_reverse: false,
            interval_ms: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Read `path`. A missing, empty or unreadable file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let data = fs::read(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if data.is_empty() {
            return Ok(Config::default());
        }

        Ok(serde_json::from_slice(&data).unwrap_or_else(|e| {
            log::warn!("Ignoring invalid config file {:?}: {}", path, e);
            Config::default()
        }))
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, data)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("hwtop").join("config.json"))
    }

    /// Unknown names fall back to the default theme.
    pub fn theme(&self) -> Theme {
        Theme::from_name(&self.theme).unwrap_or_default()
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme.name().to_string();
    }

    pub fn layout(&self) -> Layout {
        Layout::from_name(&self.layout).unwrap_or_default()
    }

    pub fn set_layout(&mut self, layout: Layout) {
        self.layout = layout.name().to_string();
    }

    /// The saved sort order, or CPU descending when none was saved.
    pub fn sort_spec(&self) -> SortSpec {
        match self.sort_column {
            Some(column) => SortSpec::new(column, self.sort_reverse),
            None => SortSpec::default(),
        }
    }

    pub fn set_sort_spec(&mut self, sort: SortSpec) {
        self.sort_column = Some(sort.column);
        self.sort_reverse = sort.reverse;
    }
}
