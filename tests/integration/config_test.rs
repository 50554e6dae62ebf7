use hwtop::core::config::Config;
use hwtop::core::system_monitor::{SortColumn, SortSpec};
use hwtop::ui::monitor_tui::{Layout, Theme};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.theme(), Theme::default());
    assert_eq!(config.layout(), Layout::default());
    assert_eq!(config.sort_spec(), SortSpec::default());
    assert!(config.interval_ms.is_none());
}

#[test]
fn test_config_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("hwtop").join("config.json");

    let mut config = Config::default();
    config.set_theme(Theme::Violet);
    config.set_layout(Layout::Compact);
    config.set_sort_spec(SortSpec::new(SortColumn::Res, true));
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.theme(), Theme::Violet);
    assert_eq!(loaded.layout(), Layout::Compact);
    assert_eq!(loaded.sort_spec(), SortSpec::new(SortColumn::Res, true));
}

#[test]
fn test_config_missing_and_corrupt_files() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    assert_eq!(Config::load_from(&path).unwrap(), Config::default());

    fs::write(&path, "{ not json").unwrap();
    assert_eq!(Config::load_from(&path).unwrap(), Config::default());

    fs::write(&path, "").unwrap();
    assert_eq!(Config::load_from(&path).unwrap(), Config::default());
}

#[test]
fn test_config_partial_file_keeps_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, r#"{"theme": "gold", "interval_ms": 500}"#).unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.theme(), Theme::Gold);
    assert_eq!(config.layout(), Layout::default());
    assert_eq!(config.interval_ms, Some(500));
}

#[test]
fn test_config_unknown_names_fall_back() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, r#"{"theme": "plaid", "layout": "spiral"}"#).unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.theme(), Theme::default());
    assert_eq!(config.layout(), Layout::default());
}
