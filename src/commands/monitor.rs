//! Monitor command handler.
//!
//! Resolves startup settings from the saved config and the command line,
//! then runs either the TUI or headless JSON output.

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::commands::headless::{self, HeadlessOptions};
use crate::core::config::Config;
use crate::core::system_monitor::tasks::clamp_interval_ms;
use crate::core::system_monitor::MonitorSettings;
use crate::platform::SysinfoSource;
use crate::ui::monitor_tui::{run_monitor_app, Layout, MonitorAppConfig, Theme};
use crate::ui::{ByteUnit, DisplayUnits, TempUnit};

/// Execute the monitor command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config_path = match Config::get_config_path() {
        Ok(path) => Some(path),
        Err(e) => {
            log::warn!("Settings will not be persisted: {}", e);
            None
        }
    };
    let config = match &config_path {
        Some(path) => Config::load_from(path)?,
        None => Config::default(),
    };

    let settings = resolve_settings(matches, &config)?;
    log::info!(
        "Starting with interval {}ms, theme {}, layout {}",
        settings.interval_ms,
        settings.theme,
        settings.layout
    );

    let source = Arc::new(SysinfoSource::new());

    if matches.get_flag("headless") {
        let options = HeadlessOptions {
            count: matches.get_one::<u64>("count").copied().unwrap_or(0),
            pretty: matches.get_flag("pretty"),
        };
        let stdout = io::stdout();
        return headless::run(source.as_ref(), settings, options, &mut stdout.lock());
    }

    let app_config = MonitorAppConfig {
        settings,
        config,
        config_path,
    };
    run_monitor_app(source, app_config).context("Failed to run hardware monitor")
}

/// Command-line values win over the saved config, which wins over defaults.
pub fn resolve_settings(matches: &ArgMatches, config: &Config) -> Result<MonitorSettings> {
    let interval_ms = matches
        .get_one::<u64>("interval")
        .copied()
        .or(config.interval_ms)
        .map(clamp_interval_ms)
        .unwrap_or(MonitorSettings::default().interval_ms);

    let theme = match matches.get_one::<String>("color") {
        Some(name) => Theme::from_name(name).with_context(|| format!("Unknown color '{}'", name))?,
        None => config.theme(),
    };
    let layout = match matches.get_one::<String>("layout") {
        Some(name) => {
            Layout::from_name(name).with_context(|| format!("Unknown layout '{}'", name))?
        }
        None => config.layout(),
    };

    let units = DisplayUnits {
        network: parse_or_default::<ByteUnit>(matches, "unit-network")?,
        disk: parse_or_default::<ByteUnit>(matches, "unit-disk")?,
        temp: parse_or_default::<TempUnit>(matches, "unit-temp")?,
    };

    Ok(MonitorSettings {
        theme,
        layout,
        sort: config.sort_spec(),
        interval_ms,
        units,
    })
}

fn parse_or_default<T>(matches: &ArgMatches, id: &str) -> Result<T>
where
    T: std::str::FromStr<Err = String> + Default,
{
    match matches.get_one::<String>(id) {
        Some(value) => value.parse().map_err(anyhow::Error::msg),
        None => Ok(T::default()),
    }
}
