use hwtop::commands::headless::{self, HeadlessOptions};
use hwtop::core::system_monitor::MonitorSettings;

use super::support::{sample_rows, FakeSource};

fn fast_settings() -> MonitorSettings {
    MonitorSettings {
        interval_ms: 100,
        ..Default::default()
    }
}

#[test]
fn test_headless_prints_count_records() {
    let source = FakeSource::new(sample_rows());
    let mut out = Vec::new();
    let options = HeadlessOptions {
        count: 2,
        pretty: false,
    };

    headless::run(&source, fast_settings(), options, &mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);

    let record: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(record["host"], "testhost");
    assert_eq!(record["interval_ms"], 100);
    assert_eq!(record["cpu"]["package_watts"], 10.0);
    assert_eq!(record["cpu"]["total_usage"], 25.0);
    assert_eq!(record["links"]["total_in_per_sec"], 500.0);
    assert_eq!(record["top_processes"].as_array().unwrap().len(), 3);
    assert!(record["timestamp"].as_str().is_some());
}

#[test]
fn test_headless_pretty_output() {
    let source = FakeSource::new(sample_rows());
    let mut out = Vec::new();
    let options = HeadlessOptions {
        count: 1,
        pretty: true,
    };

    headless::run(&source, fast_settings(), options, &mut out).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.lines().count() > 1);
    let record: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(record["memory"]["total"], 8u64 << 30);
}
