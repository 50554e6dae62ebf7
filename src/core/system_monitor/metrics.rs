use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Absolute tick counters for one logical core, as reported by the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreTicks {
    pub user: f64,
    pub system: f64,
    pub idle: f64,
    pub nice: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThermalState {
    #[default]
    Nominal,
    Fair,
    Serious,
    Critical,
}

impl ThermalState {
    pub fn is_throttled(self) -> bool {
        self != ThermalState::Nominal
    }
}

impl fmt::Display for ThermalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ThermalState::Nominal => "Nominal",
            ThermalState::Fair => "Fair",
            ThermalState::Serious => "Serious",
            ThermalState::Critical => "Critical",
        };
        f.write_str(s)
    }
}

/// One CPU/GPU/power/thermal reading published by the power sampler.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PowerSample {
    pub cpu_watts: f64,
    pub gpu_watts: f64,
    pub ane_watts: f64,
    pub dram_watts: f64,
    pub gpu_sram_watts: f64,
    /// System-wide power as reported by the platform, 0.0 when unknown.
    pub reported_total_watts: f64,
    pub cpu_temp: f32,
    pub gpu_temp: f32,
    pub thermal_state: ThermalState,
    pub gpu_active_percent: f64,
    pub gpu_freq_mhz: u32,
    pub core_ticks: Vec<CoreTicks>,
    pub memory: MemoryMetrics,
}

impl PowerSample {
    pub fn component_sum(&self) -> f64 {
        self.cpu_watts + self.gpu_watts + self.ane_watts + self.dram_watts + self.gpu_sram_watts
    }
}

/// One row of a process enumeration, before any delta is applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessRow {
    pub pid: u32,
    pub user: String,
    pub command: String,
    pub state: String,
    pub virtual_bytes: u64,
    pub resident_bytes: u64,
    pub memory_percent: f64,
    /// Cumulative user+system time in platform timebase units.
    pub cpu_time_raw: u64,
}

#[derive(Debug, Clone)]
pub struct ProcessSnapshot {
    pub taken_at: Instant,
    pub rows: Vec<ProcessRow>,
}

impl ProcessSnapshot {
    pub fn new(rows: Vec<ProcessRow>) -> Self {
        Self {
            taken_at: Instant::now(),
            rows,
        }
    }
}

/// Conversion factor from raw process time units to nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timebase {
    pub numer: u64,
    pub denom: u64,
}

impl Timebase {
    pub const NANOSECONDS: Timebase = Timebase { numer: 1, denom: 1 };

    pub fn to_nanos(self, raw: u64) -> u64 {
        let denom = self.denom.max(1);
        ((raw as u128 * self.numer as u128) / denom as u128) as u64
    }
}

impl Default for Timebase {
    fn default() -> Self {
        Self::NANOSECONDS
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NetDiskSample {
    pub out_packets_per_sec: f64,
    pub out_bytes_per_sec: f64,
    pub in_packets_per_sec: f64,
    pub in_bytes_per_sec: f64,
    pub read_ops_per_sec: f64,
    pub write_ops_per_sec: f64,
    pub read_bytes_per_sec: f64,
    pub write_bytes_per_sec: f64,
}

/// Last-known network and disk rates shown by the UI.
pub type NetDiskMetrics = NetDiskSample;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkSample {
    pub interface: String,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub bytes_in_per_sec: f64,
    pub bytes_out_per_sec: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LinkMetrics {
    pub interfaces: Vec<LinkSample>,
    pub total_in_per_sec: f64,
    pub total_out_per_sec: f64,
}

impl LinkMetrics {
    pub fn from_samples(interfaces: Vec<LinkSample>) -> Self {
        let total_in_per_sec = interfaces.iter().map(|l| l.bytes_in_per_sec).sum();
        let total_out_per_sec = interfaces.iter().map(|l| l.bytes_out_per_sec).sum();
        Self {
            interfaces,
            total_in_per_sec,
            total_out_per_sec,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CpuMetrics {
    pub core_usages: Vec<f64>,
    pub total_usage: f64,
    pub cpu_watts: f64,
    pub gpu_watts: f64,
    pub ane_watts: f64,
    pub dram_watts: f64,
    pub gpu_sram_watts: f64,
    /// Power not attributed to any component.
    pub system_watts: f64,
    pub package_watts: f64,
    pub thermal_state: ThermalState,
    pub throttled: bool,
    pub cpu_temp: f64,
    pub gpu_temp: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct GpuMetrics {
    pub freq_mhz: u32,
    pub active_percent: f64,
    pub power_watts: f64,
    pub temp: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetrics {
    pub total: u64,
    pub used: u64,
    pub available: u64,
    pub swap_total: u64,
    pub swap_used: u64,
}

impl MemoryMetrics {
    pub fn usage_percent(&self) -> f64 {
        if self.total > 0 {
            self.used as f64 / self.total as f64 * 100.0
        } else {
            0.0
        }
    }
}

/// A process row with its derived CPU percentage.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessMetrics {
    pub pid: u32,
    pub user: String,
    pub command: String,
    pub state: String,
    pub virtual_bytes: u64,
    pub resident_bytes: u64,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub cpu_time_secs: f64,
}

/// Static facts about the host, gathered once at startup.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SystemInfo {
    pub cpu_brand: String,
    pub core_count: usize,
    pub host_name: String,
    pub os_version: String,
    pub kernel_version: String,
    pub gpu_name: Option<String>,
    /// Unix timestamp of the last boot, 0 when unknown.
    pub boot_time: i64,
}

impl SystemInfo {
    pub fn uptime_secs(&self, now: i64) -> u64 {
        if self.boot_time <= 0 {
            return 0;
        }
        (now - self.boot_time).max(0) as u64
    }
}
