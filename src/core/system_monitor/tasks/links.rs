//! High-speed link bandwidth sampler.

use std::sync::Arc;

use tokio::time::Instant;

use super::SamplerContext;
use crate::core::system_monitor::mailbox::Mailbox;
use crate::core::system_monitor::metrics::LinkSample;
use crate::core::system_monitor::source::MetricsSource;

/// An empty list is still published: it means no link is up.
pub async fn links_task(
    source: Arc<dyn MetricsSource>,
    mailbox: Mailbox<Vec<LinkSample>>,
    mut ctx: SamplerContext,
) {
    log::debug!("link sampler started");

    loop {
        let started = Instant::now();
        mailbox.publish(source.sample_links());

        if !ctx.sleep_after(started.elapsed()).await {
            break;
        }
    }

    log::debug!("link sampler stopped");
}
