use std::sync::Arc;
use std::time::Duration;

use hwtop::core::system_monitor::{
    spawn_samplers, Mailboxes, MetricsSource, NetDiskSample, Signals,
};
use hwtop::ui::monitor_tui::{consumer_task, MonitorSession};

use super::support::{sample_rows, seeded_state, CountingRenderer, FakeSource};

#[test]
fn test_drain_renders_once_with_empty_mailboxes() {
    let source = FakeSource::new(sample_rows());
    let renderer = CountingRenderer::default();
    let session = MonitorSession::new(seeded_state(&source), renderer.clone());
    let mailboxes = Mailboxes::new();

    let before = session.with_state(|s| s.cpu.package_watts);
    session.drain_and_render(&mailboxes).unwrap();

    assert_eq!(renderer.renders(), 1);
    assert_eq!(session.with_state(|s| s.cpu.package_watts), before);
}

#[test]
fn test_drain_merges_only_latest_value() {
    let source = FakeSource::new(sample_rows());
    let renderer = CountingRenderer::default();
    let session = MonitorSession::new(seeded_state(&source), renderer.clone());
    let mailboxes = Mailboxes::new();

    mailboxes.power.publish(source.sample_power().unwrap());
    assert!(mailboxes.power.publish(source.sample_power().unwrap()));
    mailboxes.net_disk.publish(NetDiskSample {
        in_bytes_per_sec: 1.0,
        ..Default::default()
    });
    mailboxes.net_disk.publish(source.sample_net_disk());

    session.drain_and_render(&mailboxes).unwrap();

    assert_eq!(renderer.renders(), 1);
    assert!(mailboxes.power.is_empty());
    assert!(mailboxes.net_disk.is_empty());
    session.with_state(|s| {
        assert_eq!(s.net_disk.in_bytes_per_sec, 2048.0);
        assert!((s.cpu.total_usage - 25.0).abs() < 1e-9);
        assert_eq!(s.cpu.package_watts, 10.0);
        assert!((s.cpu.system_watts - 2.0).abs() < 1e-9);
    });
}

#[test]
fn test_families_are_independent() {
    let source = FakeSource::new(sample_rows());
    let session = MonitorSession::new(seeded_state(&source), CountingRenderer::default());
    let mailboxes = Mailboxes::new();

    mailboxes.links.publish(source.sample_links());
    session.drain_and_render(&mailboxes).unwrap();

    session.with_state(|s| {
        assert_eq!(s.links.total_in_per_sec, 500.0);
        // untouched family keeps its seeded value
        assert_eq!(s.net_disk.in_bytes_per_sec, 0.0);
        assert_eq!(s.processes.snapshot().len(), 3);
    });
}

#[tokio::test(start_paused = true)]
async fn test_samplers_fill_mailboxes_each_interval() {
    let source = Arc::new(FakeSource::new(sample_rows()));
    let mailboxes = Mailboxes::new();
    let signals = Signals::new(Duration::from_millis(1000));
    let dyn_source: Arc<dyn MetricsSource> = Arc::clone(&source) as Arc<dyn MetricsSource>;

    let handles = spawn_samplers(dyn_source, &mailboxes, &signals);
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(mailboxes.power.take().is_some());
    assert!(mailboxes.processes.take().is_some());
    assert!(mailboxes.net_disk.take().is_some());
    assert!(mailboxes.links.take().is_some());
    assert_eq!(source.power_calls(), 1);

    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(source.power_calls(), 2);
    assert_eq!(source.process_calls(), 2);
    assert!(mailboxes.power.take().is_some());

    signals.finish();
    for handle in handles {
        handle.await.unwrap();
    }
}

#[tokio::test(start_paused = true)]
async fn test_consumer_restarts_tick_on_interval_change() {
    let source = FakeSource::new(sample_rows());
    let renderer = CountingRenderer::default();
    let session = Arc::new(MonitorSession::new(seeded_state(&source), renderer.clone()));
    let signals = Signals::new(Duration::from_millis(1000));

    let consumer = tokio::spawn(consumer_task(
        Arc::clone(&session),
        Mailboxes::new(),
        signals.interval_receiver(),
        signals.done_receiver(),
    ));

    tokio::time::sleep(Duration::from_millis(1001)).await;
    assert_eq!(renderer.renders(), 1);

    tokio::time::sleep(Duration::from_millis(499)).await;
    signals.set_interval(Duration::from_millis(2000));

    // the next tick is a full new interval after the change
    tokio::time::sleep(Duration::from_millis(1900)).await;
    assert_eq!(renderer.renders(), 1);
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(renderer.renders(), 2);

    signals.finish();
    consumer.await.unwrap();
}
