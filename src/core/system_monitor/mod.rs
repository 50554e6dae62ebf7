//! System monitoring core functionality.
//!
//! Samplers acquire raw readings through a [`MetricsSource`] and hand them
//! to the consumer through single-slot [`Mailbox`]es. The consumer merges
//! them into the [`ApplicationState`], turning counters into percentages
//! and rates on the way.

pub mod derive;
pub mod display;
mod history;
mod mailbox;
mod metrics;
pub mod process_table;
mod runtime;
mod source;
mod state;
pub mod tasks;

pub use derive::{AdaptiveScale, CpuUsageTracker, ProcessCpuTracker};
pub use display::{ByteUnit, DisplayUnits, KillButton, Layout, TempUnit, Theme, UiMode};
pub use history::MetricsHistory;
pub use mailbox::Mailbox;
pub use metrics::{
    CoreTicks, CpuMetrics, GpuMetrics, LinkMetrics, LinkSample, MemoryMetrics, NetDiskMetrics,
    NetDiskSample, PowerSample, ProcessMetrics, ProcessRow, ProcessSnapshot, SystemInfo,
    ThermalState, Timebase,
};
pub use process_table::{ProcessTable, SortColumn, SortSpec};
pub use runtime::{spawn_samplers, Mailboxes, MetricsRuntime, Signals};
pub use source::MetricsSource;
pub use state::{ApplicationState, MonitorSettings};
