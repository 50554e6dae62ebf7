//! Network and disk throughput sampler.

use std::sync::Arc;

use tokio::time::Instant;

use super::SamplerContext;
use crate::core::system_monitor::mailbox::Mailbox;
use crate::core::system_monitor::metrics::NetDiskSample;
use crate::core::system_monitor::source::MetricsSource;

pub async fn net_disk_task(
    source: Arc<dyn MetricsSource>,
    mailbox: Mailbox<NetDiskSample>,
    mut ctx: SamplerContext,
) {
    log::debug!("net/disk sampler started");

    loop {
        let started = Instant::now();
        mailbox.publish(source.sample_net_disk());

        if !ctx.sleep_after(started.elapsed()).await {
            break;
        }
    }

    log::debug!("net/disk sampler stopped");
}
