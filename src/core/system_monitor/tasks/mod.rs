//! Sampler tasks, one per metric family.
//!
//! Each periodic sampler measures how long its own acquisition took and
//! sleeps for the rest of the interval. The sleep is cut short when the
//! interval changes or the shared "done" signal fires. The process sampler
//! is not periodic: it runs once every time the power sampler finishes a
//! cycle.

mod links;
mod net_disk;
mod power;
mod processes;

pub use links::links_task;
pub use net_disk::net_disk_task;
pub use power::power_task;
pub use processes::processes_task;

use tokio::sync::{broadcast, watch, Notify};
use tokio::time::{sleep, Duration};

pub const MIN_INTERVAL_MS: u64 = 100;
pub const MAX_INTERVAL_MS: u64 = 5000;
pub const DEFAULT_INTERVAL_MS: u64 = 1000;
pub const INTERVAL_STEP_MS: u64 = 100;

pub fn clamp_interval_ms(ms: u64) -> u64 {
    ms.clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS)
}

/// Interval and shutdown signals shared by every sampler.
pub struct SamplerContext {
    interval: watch::Receiver<Duration>,
    done: broadcast::Receiver<()>,
}

impl SamplerContext {
    pub fn new(interval: watch::Receiver<Duration>, done: broadcast::Receiver<()>) -> Self {
        Self { interval, done }
    }

    /// Current interval, never below the minimum.
    pub fn interval(&self) -> Duration {
        let current = *self.interval.borrow();
        current.max(Duration::from_millis(MIN_INTERVAL_MS))
    }

    /// Sleep for `interval - cost`. Returns false once the sampler should stop.
    ///
    /// An interval change restarts the wait with the full new interval,
    /// measured from the moment of the change.
    pub async fn sleep_after(&mut self, cost: Duration) -> bool {
        let mut wait = self.interval().saturating_sub(cost);
        loop {
            tokio::select! {
                _ = sleep(wait) => return true,
                changed = self.interval.changed() => {
                    if changed.is_err() {
                        return false;
                    }
                    wait = self.interval();
                    log::debug!("sampler interval changed to {:?}", wait);
                }
                _ = self.done.recv() => return false,
            }
        }
    }

    /// Wait for `trigger`. Returns false once the sampler should stop.
    pub async fn wait_for(&mut self, trigger: &Notify) -> bool {
        tokio::select! {
            _ = trigger.notified() => true,
            _ = self.done.recv() => false,
        }
    }
}
