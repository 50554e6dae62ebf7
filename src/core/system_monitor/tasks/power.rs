//! CPU, GPU, power and thermal sampler.

use std::sync::Arc;

use tokio::sync::Notify;
use tokio::time::Instant;

use super::SamplerContext;
use crate::core::system_monitor::mailbox::Mailbox;
use crate::core::system_monitor::metrics::PowerSample;
use crate::core::system_monitor::source::MetricsSource;

/// Publishes one [`PowerSample`] per interval and wakes the process
/// sampler after every cycle, successful or not.
pub async fn power_task(
    source: Arc<dyn MetricsSource>,
    mailbox: Mailbox<PowerSample>,
    process_trigger: Arc<Notify>,
    mut ctx: SamplerContext,
) {
    log::debug!("power sampler started");

    loop {
        let started = Instant::now();

        match source.sample_power() {
            Ok(sample) => {
                if mailbox.publish(sample) {
                    log::trace!("unread power sample overwritten");
                }
            }
            Err(e) => log::warn!("Skipping power sample: {}", e),
        }
        process_trigger.notify_one();

        if !ctx.sleep_after(started.elapsed()).await {
            break;
        }
    }

    log::debug!("power sampler stopped");
}
