//! The single application state shared by the consumer tick and the input path.
//!
//! Samplers never see this type. Raw samples reach it only through the
//! `merge_*` methods, which run the derived-metric engine and update the
//! last-known values. A family whose mailbox was empty this tick is simply
//! not merged and keeps its previous values.

use std::time::Instant;

use super::derive::{average, power_residual, AdaptiveScale, CpuUsageTracker, ProcessCpuTracker};
use super::display::{DisplayUnits, Layout, Theme, UiMode};
use super::history::MetricsHistory;
use super::metrics::{
    CpuMetrics, GpuMetrics, LinkMetrics, LinkSample, MemoryMetrics, NetDiskMetrics,
    NetDiskSample, PowerSample, ProcessSnapshot, SystemInfo, Timebase,
};
use super::process_table::{ProcessTable, SortSpec};
use super::tasks::{clamp_interval_ms, DEFAULT_INTERVAL_MS};

/// Startup choices coming from the config file and the command line.
#[derive(Debug, Clone, Copy)]
pub struct MonitorSettings {
    pub theme: Theme,
    pub layout: Layout,
    pub sort: SortSpec,
    pub interval_ms: u64,
    pub units: DisplayUnits,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            layout: Layout::default(),
            sort: SortSpec::default(),
            interval_ms: DEFAULT_INTERVAL_MS,
            units: DisplayUnits::default(),
        }
    }
}

pub struct ApplicationState {
    pub cpu: CpuMetrics,
    pub gpu: GpuMetrics,
    pub memory: MemoryMetrics,
    pub net_disk: NetDiskMetrics,
    pub links: LinkMetrics,
    pub processes: ProcessTable,
    pub history: MetricsHistory,
    pub power_scale: AdaptiveScale,
    pub link_scale: AdaptiveScale,
    pub mode: UiMode,
    pub party_mode: bool,
    /// Theme chosen by the user; persisted.
    pub theme: Theme,
    /// Theme currently shown by party mode; never persisted.
    pub party_theme: Option<Theme>,
    pub layout: Layout,
    pub interval_ms: u64,
    pub units: DisplayUnits,
    pub system_info: SystemInfo,
    cpu_tracker: CpuUsageTracker,
    process_tracker: ProcessCpuTracker,
    last_process_snapshot: Option<Instant>,
}

impl ApplicationState {
    pub fn new(settings: MonitorSettings, system_info: SystemInfo, timebase: Timebase) -> Self {
        Self {
            cpu: CpuMetrics::default(),
            gpu: GpuMetrics::default(),
            memory: MemoryMetrics::default(),
            net_disk: NetDiskMetrics::default(),
            links: LinkMetrics::default(),
            processes: ProcessTable::new(settings.sort),
            history: MetricsHistory::new(),
            power_scale: AdaptiveScale::default(),
            link_scale: AdaptiveScale::default(),
            mode: UiMode::Normal,
            party_mode: false,
            theme: settings.theme,
            party_theme: None,
            layout: settings.layout,
            interval_ms: clamp_interval_ms(settings.interval_ms),
            units: settings.units,
            system_info,
            cpu_tracker: CpuUsageTracker::new(),
            process_tracker: ProcessCpuTracker::new(timebase),
            last_process_snapshot: None,
        }
    }

    pub fn merge_power(&mut self, sample: PowerSample) {
        let core_usages = self.cpu_tracker.update(&sample.core_ticks);
        let breakdown = power_residual(sample.reported_total_watts, sample.component_sum());

        self.cpu = CpuMetrics {
            total_usage: average(&core_usages),
            core_usages,
            cpu_watts: sample.cpu_watts,
            gpu_watts: sample.gpu_watts,
            ane_watts: sample.ane_watts,
            dram_watts: sample.dram_watts,
            gpu_sram_watts: sample.gpu_sram_watts,
            system_watts: breakdown.residual,
            package_watts: breakdown.total,
            thermal_state: sample.thermal_state,
            throttled: sample.thermal_state.is_throttled(),
            cpu_temp: sample.cpu_temp as f64,
            gpu_temp: sample.gpu_temp as f64,
        };
        self.gpu = GpuMetrics {
            freq_mhz: sample.gpu_freq_mhz,
            active_percent: sample.gpu_active_percent.clamp(0.0, 100.0),
            power_watts: sample.gpu_watts,
            temp: sample.gpu_temp,
        };
        self.memory = sample.memory;

        self.history.push_power(breakdown.total);
        self.power_scale.observe(breakdown.total);
        self.history.push_gpu(self.gpu.active_percent);
    }

    /// Merge a process snapshot unless it was taken before the one already
    /// shown. Returns whether it was merged.
    pub fn merge_processes(&mut self, snapshot: ProcessSnapshot) -> bool {
        if self
            .last_process_snapshot
            .is_some_and(|last| snapshot.taken_at < last)
        {
            log::debug!("Dropping stale process snapshot");
            return false;
        }
        self.last_process_snapshot = Some(snapshot.taken_at);
        let metrics = self.process_tracker.update(&snapshot);
        self.processes.set_snapshot(metrics);
        true
    }

    pub fn merge_net_disk(&mut self, sample: NetDiskSample) {
        self.net_disk = sample;
    }

    pub fn merge_links(&mut self, samples: Vec<LinkSample>) {
        self.links = LinkMetrics::from_samples(samples);
        self.history
            .push_link(self.links.total_in_per_sec, self.links.total_out_per_sec);
        self.link_scale
            .observe(self.links.total_in_per_sec.max(self.links.total_out_per_sec));
    }

    /// Number of pids the per-process CPU tracker remembers.
    pub fn tracked_processes(&self) -> usize {
        self.process_tracker.tracked()
    }

    /// The theme to draw with right now.
    pub fn display_theme(&self) -> Theme {
        self.party_theme.unwrap_or(self.theme)
    }

    pub fn set_party_mode(&mut self, on: bool) {
        self.party_mode = on;
        self.party_theme = None;
    }

    /// Advance the party theme by one step; no-op outside party mode.
    pub fn advance_party_theme(&mut self) {
        if self.party_mode {
            self.party_theme = Some(self.display_theme().next());
        }
    }

    /// Step the interval by `delta_ms`, clamped. Returns the new interval.
    pub fn adjust_interval(&mut self, delta_ms: i64) -> u64 {
        let next = (self.interval_ms as i64 + delta_ms).max(0) as u64;
        self.interval_ms = clamp_interval_ms(next);
        self.interval_ms
    }

    /// Settings worth persisting, reflecting the current state.
    pub fn settings(&self) -> MonitorSettings {
        MonitorSettings {
            theme: self.theme,
            layout: self.layout,
            sort: self.processes.sort_spec(),
            interval_ms: self.interval_ms,
            units: self.units,
        }
    }
}
