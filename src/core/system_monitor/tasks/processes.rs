//! Process enumeration, driven by the power sampler.

use std::sync::Arc;

use tokio::sync::Notify;

use super::SamplerContext;
use crate::core::system_monitor::mailbox::Mailbox;
use crate::core::system_monitor::metrics::ProcessSnapshot;
use crate::core::system_monitor::source::MetricsSource;

pub async fn processes_task(
    source: Arc<dyn MetricsSource>,
    mailbox: Mailbox<ProcessSnapshot>,
    trigger: Arc<Notify>,
    mut ctx: SamplerContext,
) {
    log::debug!("process sampler started");

    while ctx.wait_for(&trigger).await {
        match source.enumerate_processes() {
            Ok(snapshot) => {
                log::trace!("enumerated {} processes", snapshot.rows.len());
                mailbox.publish(snapshot);
            }
            Err(e) => log::warn!("Skipping process snapshot: {}", e),
        }
    }

    log::debug!("process sampler stopped");
}
