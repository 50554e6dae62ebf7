//! Tokio runtime owning the sampler pool.
//!
//! The runtime is built by hand so the blocking input loop can keep the
//! main thread while samplers, the consumer tick and the party task run on
//! worker threads.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch, Notify};
use tokio::task::JoinHandle;

use super::mailbox::Mailbox;
use super::metrics::{LinkSample, NetDiskSample, PowerSample, ProcessSnapshot};
use super::source::MetricsSource;
use super::tasks::{
    clamp_interval_ms, links_task, net_disk_task, power_task, processes_task, SamplerContext,
};

/// One mailbox per metric family.
#[derive(Clone, Default)]
pub struct Mailboxes {
    pub power: Mailbox<PowerSample>,
    pub processes: Mailbox<ProcessSnapshot>,
    pub net_disk: Mailbox<NetDiskSample>,
    pub links: Mailbox<Vec<LinkSample>>,
}

impl Mailboxes {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Interval and shutdown channels shared by every long-running task.
#[derive(Clone)]
pub struct Signals {
    interval_tx: watch::Sender<Duration>,
    done_tx: broadcast::Sender<()>,
}

impl Signals {
    pub fn new(interval: Duration) -> Self {
        let (interval_tx, _) = watch::channel(interval);
        let (done_tx, _) = broadcast::channel(1);
        Self {
            interval_tx,
            done_tx,
        }
    }

    pub fn interval(&self) -> Duration {
        *self.interval_tx.borrow()
    }

    /// Publish a new interval (clamped) to every subscriber and return it.
    pub fn set_interval(&self, interval: Duration) -> Duration {
        let ms = clamp_interval_ms(interval.as_millis() as u64);
        let interval = Duration::from_millis(ms);
        self.interval_tx.send_replace(interval);
        interval
    }

    pub fn interval_receiver(&self) -> watch::Receiver<Duration> {
        self.interval_tx.subscribe()
    }

    pub fn done_receiver(&self) -> broadcast::Receiver<()> {
        self.done_tx.subscribe()
    }

    pub fn sampler_context(&self) -> SamplerContext {
        SamplerContext::new(self.interval_receiver(), self.done_receiver())
    }

    /// Ask every task to stop.
    pub fn finish(&self) {
        // send only fails when nobody is listening any more
        let _ = self.done_tx.send(());
    }
}

/// Spawn the sampler pool on the current runtime.
pub fn spawn_samplers(
    source: Arc<dyn MetricsSource>,
    mailboxes: &Mailboxes,
    signals: &Signals,
) -> Vec<JoinHandle<()>> {
    let process_trigger = Arc::new(Notify::new());

    vec![
        tokio::spawn(power_task(
            Arc::clone(&source),
            mailboxes.power.clone(),
            Arc::clone(&process_trigger),
            signals.sampler_context(),
        )),
        tokio::spawn(processes_task(
            Arc::clone(&source),
            mailboxes.processes.clone(),
            process_trigger,
            signals.sampler_context(),
        )),
        tokio::spawn(net_disk_task(
            Arc::clone(&source),
            mailboxes.net_disk.clone(),
            signals.sampler_context(),
        )),
        tokio::spawn(links_task(
            source,
            mailboxes.links.clone(),
            signals.sampler_context(),
        )),
    ]
}

/// Wrapper around the Tokio runtime running the samplers.
pub struct MetricsRuntime {
    pub mailboxes: Mailboxes,
    signals: Signals,
    runtime: tokio::runtime::Runtime,
}

impl MetricsRuntime {
    /// Build the runtime and start every sampler.
    pub fn start(source: Arc<dyn MetricsSource>, interval: Duration) -> Result<Self> {
        log::info!("Starting metrics runtime ({:?} interval)", interval);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_time()
            .thread_name("hwtop-worker")
            .build()
            .context("Failed to build metrics runtime")?;

        let mailboxes = Mailboxes::new();
        let signals = Signals::new(interval);
        signals.set_interval(interval);

        {
            let _guard = runtime.enter();
            spawn_samplers(source, &mailboxes, &signals);
        }

        Ok(Self {
            mailboxes,
            signals,
            runtime,
        })
    }

    pub fn signals(&self) -> &Signals {
        &self.signals
    }

    pub fn handle(&self) -> Handle {
        self.runtime.handle().clone()
    }

    pub fn spawn<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.runtime.spawn(future)
    }

    /// Signal "done" and wait briefly for the tasks to wind down.
    pub fn shutdown(self) {
        log::info!("Shutting down metrics runtime");
        self.signals.finish();
        self.runtime.shutdown_timeout(Duration::from_millis(500));
    }
}
