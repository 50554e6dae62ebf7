use std::sync::Arc;

use crossterm::event::KeyCode;

use hwtop::core::system_monitor::MetricsSource;
use hwtop::ui::monitor_tui::UiMode;

use super::support::{sample_rows, FakeSource, Harness};

#[tokio::test]
async fn test_confirmed_kill_terminates_once_and_refreshes() {
    let source = Arc::new(FakeSource::new(sample_rows()));
    let mut h = Harness::new(Arc::clone(&source), None);

    let selected = h.session.with_state(|s| s.processes.selected().map(|p| p.pid));
    assert_eq!(selected, Some(10));

    assert!(h.press(KeyCode::F(9)).is_continue());
    assert!(h
        .session
        .with_state(|s| matches!(s.mode, UiMode::KillConfirm { pid: 10, .. })));

    let calls_before = source.process_calls();
    assert!(h.press(KeyCode::Char('y')).is_continue());

    assert_eq!(source.terminated(), vec![10]);
    assert_eq!(source.process_calls(), calls_before + 1);
    assert_eq!(h.session.with_state(|s| s.mode.clone()), UiMode::Normal);
    assert_eq!(h.pids().len(), 2);
    assert!(!h.pids().contains(&10));
    // one frame per key, one after the out-of-band refresh
    assert_eq!(h.renderer.renders(), 3);
}

#[tokio::test]
async fn test_uppercase_y_confirms_kill() {
    let source = Arc::new(FakeSource::new(sample_rows()));
    let mut h = Harness::new(Arc::clone(&source), None);

    h.press(KeyCode::F(9));
    h.press(KeyCode::Char('Y'));

    assert_eq!(source.terminated(), vec![10]);
    assert!(!h.pids().contains(&10));
}

#[tokio::test]
async fn test_kill_discards_pending_sampler_snapshot() {
    let source = Arc::new(FakeSource::new(sample_rows()));
    let mut h = Harness::new(Arc::clone(&source), None);

    // the process sampler ran before the kill and nobody drained it yet
    h.mailboxes
        .processes
        .publish(source.enumerate_processes().unwrap());

    h.press(KeyCode::F(9));
    h.press(KeyCode::Char('y'));
    assert!(h.mailboxes.processes.is_empty());

    let cpu_before: Vec<f64> = h
        .session
        .with_state(|s| s.processes.snapshot().iter().map(|p| p.cpu_percent).collect());
    h.session.drain_and_render(&h.mailboxes).unwrap();

    assert_eq!(h.pids().len(), 2);
    assert!(!h.pids().contains(&10));
    let cpu_after: Vec<f64> = h
        .session
        .with_state(|s| s.processes.snapshot().iter().map(|p| p.cpu_percent).collect());
    assert_eq!(cpu_after, cpu_before);
}

#[tokio::test]
async fn test_snapshot_older_than_kill_refresh_is_ignored() {
    let source = Arc::new(FakeSource::new(sample_rows()));
    let mut h = Harness::new(Arc::clone(&source), None);

    let stale = source.enumerate_processes().unwrap();
    h.press(KeyCode::F(9));
    h.press(KeyCode::Char('y'));

    // published late, but taken before the kill
    h.mailboxes.processes.publish(stale);
    h.session.drain_and_render(&h.mailboxes).unwrap();

    assert!(h.mailboxes.processes.is_empty());
    assert!(!h.pids().contains(&10));
}

#[tokio::test]
async fn test_cancelled_kill_sends_nothing() {
    let source = Arc::new(FakeSource::new(sample_rows()));
    let mut h = Harness::new(Arc::clone(&source), None);

    h.press(KeyCode::F(9));
    // focus starts on Cancel
    h.press(KeyCode::Enter);

    assert!(source.terminated().is_empty());
    assert_eq!(h.session.with_state(|s| s.mode.clone()), UiMode::Normal);
    assert_eq!(h.pids().len(), 3);
}

#[tokio::test]
async fn test_uppercase_n_cancels_kill() {
    let source = Arc::new(FakeSource::new(sample_rows()));
    let mut h = Harness::new(Arc::clone(&source), None);

    h.press(KeyCode::F(9));
    h.press(KeyCode::Char('N'));

    assert!(source.terminated().is_empty());
    assert_eq!(h.session.with_state(|s| s.mode.clone()), UiMode::Normal);
}

#[tokio::test]
async fn test_refused_kill_still_refreshes() {
    let source = Arc::new(FakeSource::refusing_terminate(sample_rows()));
    let mut h = Harness::new(Arc::clone(&source), None);

    h.press(KeyCode::F(9));
    h.press(KeyCode::Left);
    let calls_before = source.process_calls();
    h.press(KeyCode::Enter);

    assert_eq!(source.terminated(), vec![10]);
    assert_eq!(source.process_calls(), calls_before + 1);
    assert_eq!(h.session.with_state(|s| s.mode.clone()), UiMode::Normal);
    assert_eq!(h.pids().len(), 3);
}

#[tokio::test]
async fn test_kill_from_filtered_view() {
    let source = Arc::new(FakeSource::new(sample_rows()));
    let mut h = Harness::new(Arc::clone(&source), None);

    h.press(KeyCode::Char('/'));
    for c in "daem".chars() {
        h.press(KeyCode::Char(c));
    }
    h.press(KeyCode::Enter);
    assert_eq!(h.session.with_state(|s| s.processes.visible().len()), 1);

    h.press(KeyCode::F(9));
    h.press(KeyCode::Char('y'));

    assert_eq!(source.terminated(), vec![30]);
    h.session.with_state(|s| {
        assert_eq!(s.processes.filter(), "daem");
        assert!(s.processes.visible().is_empty());
    });
}

#[tokio::test]
async fn test_quit_breaks_dispatch() {
    let source = Arc::new(FakeSource::new(sample_rows()));
    let mut h = Harness::new(source, None);
    assert!(h.press(KeyCode::Char('q')).is_break());
}
