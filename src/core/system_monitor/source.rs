use super::metrics::{
    LinkSample, NetDiskSample, PowerSample, ProcessSnapshot, SystemInfo, Timebase,
};
use crate::error::Result;

/// Platform acquisition used by the samplers and the kill workflow.
///
/// Implementations are provided in the platform layer. Every method is a
/// single synchronous reading; callers decide when and how often to call it.
pub trait MetricsSource: Send + Sync {
    /// One fresh CPU/GPU/power/thermal reading.
    fn sample_power(&self) -> Result<PowerSample>;

    /// One full process table snapshot.
    fn enumerate_processes(&self) -> Result<ProcessSnapshot>;

    /// Network and disk rates since the previous call; zeros on the first call.
    fn sample_net_disk(&self) -> NetDiskSample;

    /// Active high-speed link interfaces and their byte rates.
    fn sample_links(&self) -> Vec<LinkSample>;

    /// Best-effort SIGTERM delivery.
    fn send_terminate(&self, pid: u32) -> Result<()>;

    /// Unit of `ProcessRow::cpu_time_raw`.
    fn timebase(&self) -> Timebase;

    fn system_info(&self) -> SystemInfo;
}
