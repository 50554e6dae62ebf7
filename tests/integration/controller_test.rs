use std::sync::Arc;
use std::time::Duration;

use crossterm::event::KeyCode;
use tempfile::TempDir;

use hwtop::core::config::Config;
use hwtop::core::system_monitor::{Signals, SortColumn, SortSpec};
use hwtop::ui::monitor_tui::{party_task, InputEvent, MonitorSession, Theme};

use super::support::{sample_rows, seeded_state, CountingRenderer, FakeSource, Harness};

#[tokio::test]
async fn test_interval_keys_retime_signals() {
    let mut h = Harness::new(Arc::new(FakeSource::new(sample_rows())), None);

    h.press(KeyCode::Char('+'));
    assert_eq!(h.signals.interval(), Duration::from_millis(1100));
    h.press(KeyCode::Char('-'));
    h.press(KeyCode::Char('-'));
    assert_eq!(h.signals.interval(), Duration::from_millis(900));
    assert_eq!(h.session.with_state(|s| s.interval_ms), 900);
}

#[tokio::test]
async fn test_sort_change_written_to_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("hwtop").join("config.json");
    let mut h = Harness::new(
        Arc::new(FakeSource::new(sample_rows())),
        Some(path.clone()),
    );

    h.press(KeyCode::Right);
    let saved = Config::load_from(&path).unwrap();
    assert_eq!(saved.sort_spec(), SortSpec::new(SortColumn::Mem, false));

    h.press(KeyCode::Enter);
    let saved = Config::load_from(&path).unwrap();
    assert_eq!(saved.sort_spec(), SortSpec::new(SortColumn::Mem, true));
    assert_eq!(h.controller.config().sort_spec(), saved.sort_spec());
}

#[tokio::test]
async fn test_theme_change_written_to_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    let mut h = Harness::new(
        Arc::new(FakeSource::new(sample_rows())),
        Some(path.clone()),
    );

    h.press(KeyCode::Char('c'));
    assert_eq!(Config::load_from(&path).unwrap().theme(), Theme::Red);
}

#[tokio::test]
async fn test_navigation_does_not_write_config() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    let mut h = Harness::new(
        Arc::new(FakeSource::new(sample_rows())),
        Some(path.clone()),
    );

    h.press(KeyCode::Down);
    h.press(KeyCode::Up);
    assert!(!path.exists());
}

#[tokio::test]
async fn test_resize_resizes_history() {
    let mut h = Harness::new(Arc::new(FakeSource::new(sample_rows())), None);

    h.controller.dispatch(InputEvent::Resize(40, 20));
    assert_eq!(h.session.with_state(|s| s.history.capacity()), 40);
    assert_eq!(h.session.with_state(|s| s.history.power_watts.len()), 40);
    assert_eq!(h.renderer.renders(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_party_task_cycles_at_half_interval() {
    let source = FakeSource::new(sample_rows());
    let renderer = CountingRenderer::default();
    let session = Arc::new(MonitorSession::new(seeded_state(&source), renderer.clone()));
    session.with_state(|s| s.set_party_mode(true));
    let signals = Signals::new(Duration::from_millis(1000));

    let party = tokio::spawn(party_task(
        Arc::clone(&session),
        signals.interval_receiver(),
        signals.done_receiver(),
    ));

    tokio::time::sleep(Duration::from_millis(499)).await;
    assert_eq!(renderer.clears(), 0);
    tokio::time::sleep(Duration::from_millis(2)).await;
    assert_eq!(renderer.clears(), 1);
    assert_eq!(renderer.renders(), 1);
    assert_eq!(session.with_state(|s| s.display_theme()), Theme::Green.next());

    // restarts with half of the new interval, counted from the change
    signals.set_interval(Duration::from_millis(2000));
    tokio::time::sleep(Duration::from_millis(900)).await;
    assert_eq!(renderer.clears(), 1);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(renderer.clears(), 2);

    signals.finish();
    party.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_party_toggle_starts_and_stops_task() {
    let mut h = Harness::new(Arc::new(FakeSource::new(sample_rows())), None);

    h.press(KeyCode::Char('p'));
    tokio::time::sleep(Duration::from_millis(501)).await;
    assert_eq!(h.renderer.clears(), 1);
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(h.renderer.clears(), 2);

    h.press(KeyCode::Char('p'));
    tokio::time::sleep(Duration::from_millis(3000)).await;
    assert_eq!(h.renderer.clears(), 2);
    // party theme is dropped, the chosen theme is back
    assert_eq!(h.session.with_state(|s| s.display_theme()), Theme::Green);
}
