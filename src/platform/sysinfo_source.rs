//! `MetricsSource` backed by sysinfo, with procfs/sysfs readers on Linux.

use std::collections::HashMap;
use std::time::Instant;

use parking_lot::Mutex;
use sysinfo::{
    Components, CpuRefreshKind, MemoryRefreshKind, Networks, ProcessRefreshKind,
    ProcessesToUpdate, RefreshKind, System, UpdateKind, Users,
};

use crate::core::system_monitor::derive::rate_per_sec;
use crate::core::system_monitor::{
    CoreTicks, LinkSample, MemoryMetrics, MetricsSource, NetDiskSample, PowerSample, ProcessRow,
    ProcessSnapshot, SystemInfo, ThermalState, Timebase,
};
use crate::error::{HwtopError, Result};

use super::gpu::{get_gpu_provider, GpuProvider};
#[cfg(target_os = "linux")]
use super::linux::{self, DiskCounters, RaplReader};

/// sysinfo reports accumulated process CPU time in milliseconds.
const PROCESS_TIMEBASE: Timebase = Timebase {
    numer: 1_000_000,
    denom: 1,
};

/// Each sampler owns its own lock so a slow process walk never delays
/// the power reading.
pub struct SysinfoSource {
    power: Mutex<PowerState>,
    processes: Mutex<ProcessState>,
    net_disk: Mutex<NetDiskState>,
    links: Mutex<LinkState>,
    info: SystemInfo,
}

impl SysinfoSource {
    pub fn new() -> Self {
        let system = System::new_with_specifics(
            RefreshKind::nothing()
                .with_cpu(CpuRefreshKind::everything())
                .with_memory(MemoryRefreshKind::everything()),
        );

        let gpu = match get_gpu_provider() {
            Ok(provider) => Some(provider),
            Err(e) => {
                log::info!("GPU metrics unavailable: {}", e);
                None
            }
        };

        let info = SystemInfo {
            cpu_brand: system
                .cpus()
                .first()
                .map(|cpu| cpu.brand().trim().to_string())
                .unwrap_or_default(),
            core_count: system.cpus().len(),
            host_name: System::host_name().unwrap_or_default(),
            os_version: System::long_os_version().unwrap_or_default(),
            kernel_version: System::kernel_version().unwrap_or_default(),
            gpu_name: gpu.as_ref().map(|g| g.name()),
            boot_time: System::boot_time() as i64,
        };

        Self {
            power: Mutex::new(PowerState::new(system, gpu)),
            processes: Mutex::new(ProcessState::new()),
            net_disk: Mutex::new(NetDiskState::new()),
            links: Mutex::new(LinkState::new()),
            info,
        }
    }
}

impl Default for SysinfoSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSource for SysinfoSource {
    fn sample_power(&self) -> Result<PowerSample> {
        self.power.lock().sample()
    }

    fn enumerate_processes(&self) -> Result<ProcessSnapshot> {
        self.processes.lock().enumerate()
    }

    fn sample_net_disk(&self) -> NetDiskSample {
        self.net_disk.lock().sample()
    }

    fn sample_links(&self) -> Vec<LinkSample> {
        self.links.lock().sample()
    }

    fn send_terminate(&self, pid: u32) -> Result<()> {
        send_sigterm(pid)
    }

    fn timebase(&self) -> Timebase {
        PROCESS_TIMEBASE
    }

    fn system_info(&self) -> SystemInfo {
        self.info.clone()
    }
}

struct PowerState {
    system: System,
    components: Components,
    gpu: Option<Box<dyn GpuProvider>>,
    #[cfg(target_os = "linux")]
    rapl: Option<RaplReader>,
    /// Counters synthesized from sysinfo usage where /proc/stat is absent.
    fallback_ticks: Vec<CoreTicks>,
}

impl PowerState {
    fn new(system: System, gpu: Option<Box<dyn GpuProvider>>) -> Self {
        Self {
            system,
            components: Components::new_with_refreshed_list(),
            gpu,
            #[cfg(target_os = "linux")]
            rapl: RaplReader::detect(),
            fallback_ticks: Vec::new(),
        }
    }

    fn sample(&mut self) -> Result<PowerSample> {
        let core_ticks = self.core_ticks();
        if core_ticks.is_empty() {
            return Err(HwtopError::metric_collection("No CPU counters available"));
        }

        self.system.refresh_memory();
        let memory = MemoryMetrics {
            total: self.system.total_memory(),
            used: self.system.used_memory(),
            available: self.system.available_memory(),
            swap_total: self.system.total_swap(),
            swap_used: self.system.used_swap(),
        };

        self.components.refresh(false);
        let (cpu_temp, cpu_critical) = self.max_temperature(is_cpu_sensor);
        let (gpu_temp, _) = self.max_temperature(is_gpu_sensor);

        let mut sample = PowerSample {
            cpu_temp,
            gpu_temp,
            thermal_state: thermal_state(cpu_temp, cpu_critical),
            core_ticks,
            memory,
            ..Default::default()
        };

        #[cfg(target_os = "linux")]
        if let Some(rapl) = self.rapl.as_mut() {
            let watts = rapl.read();
            sample.cpu_watts = if watts.core > 0.0 {
                watts.core
            } else {
                watts.package
            };
            sample.gpu_watts = watts.uncore;
            sample.dram_watts = watts.dram;
            sample.reported_total_watts = if watts.psys > 0.0 {
                watts.psys
            } else {
                watts.package + watts.dram
            };
        }

        if let Some(gpu) = self.gpu.as_mut() {
            match gpu.sample() {
                Ok(reading) => {
                    sample.gpu_active_percent = reading.active_percent;
                    sample.gpu_freq_mhz = reading.freq_mhz;
                    sample.gpu_watts += reading.power_watts;
                    if sample.reported_total_watts > 0.0 {
                        sample.reported_total_watts += reading.power_watts;
                    }
                    if let Some(temp) = reading.temp_celsius {
                        sample.gpu_temp = sample.gpu_temp.max(temp);
                    }
                }
                Err(e) => log::debug!("GPU sample failed: {}", e),
            }
        }

        Ok(sample)
    }

    fn core_ticks(&mut self) -> Vec<CoreTicks> {
        #[cfg(target_os = "linux")]
        if let Some(ticks) = linux::read_core_ticks() {
            return ticks;
        }

        // One synthetic tick per percent, so a delta reproduces the usage.
        self.system.refresh_cpu_usage();
        let cpus = self.system.cpus();
        self.fallback_ticks.resize(cpus.len(), CoreTicks::default());
        for (ticks, cpu) in self.fallback_ticks.iter_mut().zip(cpus) {
            let usage = (cpu.cpu_usage() as f64).clamp(0.0, 100.0);
            ticks.user += usage;
            ticks.idle += 100.0 - usage;
        }
        self.fallback_ticks.clone()
    }

    fn max_temperature(&self, matches: fn(&str) -> bool) -> (f32, Option<f32>) {
        let mut best = (0.0_f32, None);
        for component in self.components.iter() {
            let label = component.label().to_ascii_lowercase();
            if !matches(&label) {
                continue;
            }
            if let Some(temp) = component.temperature() {
                if temp.is_finite() && temp > best.0 {
                    best = (temp, component.critical());
                }
            }
        }
        best
    }
}

fn is_cpu_sensor(label: &str) -> bool {
    ["coretemp", "k10temp", "cpu", "package", "tctl", "tdie"]
        .iter()
        .any(|key| label.contains(key))
}

fn is_gpu_sensor(label: &str) -> bool {
    ["amdgpu", "nouveau", "radeon", "gpu", "edge"]
        .iter()
        .any(|key| label.contains(key))
}

/// Throttle level inferred from the hottest CPU sensor.
fn thermal_state(temp: f32, critical: Option<f32>) -> ThermalState {
    let critical = critical.filter(|c| *c > 0.0).unwrap_or(100.0);
    match temp {
        t if t >= critical => ThermalState::Critical,
        t if t >= critical - 10.0 => ThermalState::Serious,
        t if t >= critical - 20.0 => ThermalState::Fair,
        _ => ThermalState::Nominal,
    }
}

struct ProcessState {
    system: System,
    users: Users,
}

impl ProcessState {
    fn new() -> Self {
        Self {
            system: System::new(),
            users: Users::new_with_refreshed_list(),
        }
    }

    fn enumerate(&mut self) -> Result<ProcessSnapshot> {
        self.system.refresh_memory_specifics(MemoryRefreshKind::nothing().with_ram());
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing()
                .with_cpu()
                .with_memory()
                .with_user(UpdateKind::OnlyIfNotSet),
        );

        let unknown_user = self.system.processes().values().any(|p| {
            p.user_id()
                .is_some_and(|uid| self.users.get_user_by_id(uid).is_none())
        });
        if unknown_user {
            self.users.refresh();
        }

        let total_memory = self.system.total_memory();
        let rows: Vec<ProcessRow> = self
            .system
            .processes()
            .iter()
            .filter(|(_, process)| process.thread_kind().is_none())
            .map(|(pid, process)| {
                let user = process
                    .user_id()
                    .and_then(|uid| self.users.get_user_by_id(uid))
                    .map(|u| u.name().to_string())
                    .unwrap_or_else(|| "?".to_string());
                let memory_percent = if total_memory > 0 {
                    process.memory() as f64 / total_memory as f64 * 100.0
                } else {
                    0.0
                };
                ProcessRow {
                    pid: pid.as_u32(),
                    user,
                    command: process.name().to_string_lossy().into_owned(),
                    state: process.status().to_string(),
                    virtual_bytes: process.virtual_memory(),
                    resident_bytes: process.memory(),
                    memory_percent,
                    cpu_time_raw: process.accumulated_cpu_time(),
                }
            })
            .collect();

        if rows.is_empty() {
            return Err(HwtopError::metric_collection("Process list is empty"));
        }
        Ok(ProcessSnapshot::new(rows))
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct NetTotals {
    bytes_in: u64,
    bytes_out: u64,
    packets_in: u64,
    packets_out: u64,
}

struct NetDiskState {
    networks: Networks,
    last: Option<Instant>,
    last_net: NetTotals,
    #[cfg(target_os = "linux")]
    last_disk: DiskCounters,
}

impl NetDiskState {
    fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
            last: None,
            last_net: NetTotals::default(),
            #[cfg(target_os = "linux")]
            last_disk: DiskCounters::default(),
        }
    }

    fn sample(&mut self) -> NetDiskSample {
        self.networks.refresh(true);
        let net = self
            .networks
            .iter()
            .filter(|(name, _)| !is_loopback(name))
            .fold(NetTotals::default(), |acc, (_, data)| NetTotals {
                bytes_in: acc.bytes_in + data.total_received(),
                bytes_out: acc.bytes_out + data.total_transmitted(),
                packets_in: acc.packets_in + data.total_packets_received(),
                packets_out: acc.packets_out + data.total_packets_transmitted(),
            });

        #[cfg(target_os = "linux")]
        let disk = linux::read_disk_counters().unwrap_or(self.last_disk);

        let now = Instant::now();
        let elapsed = self.last.replace(now).map(|t| now.duration_since(t).as_secs_f64());

        let mut sample = NetDiskSample::default();
        if let Some(elapsed) = elapsed {
            let prev = self.last_net;
            sample.in_bytes_per_sec = rate_per_sec(prev.bytes_in, net.bytes_in, elapsed);
            sample.out_bytes_per_sec = rate_per_sec(prev.bytes_out, net.bytes_out, elapsed);
            sample.in_packets_per_sec = rate_per_sec(prev.packets_in, net.packets_in, elapsed);
            sample.out_packets_per_sec = rate_per_sec(prev.packets_out, net.packets_out, elapsed);

            #[cfg(target_os = "linux")]
            {
                let prev = self.last_disk;
                sample.read_ops_per_sec = rate_per_sec(prev.read_ops, disk.read_ops, elapsed);
                sample.write_ops_per_sec = rate_per_sec(prev.write_ops, disk.write_ops, elapsed);
                sample.read_bytes_per_sec = rate_per_sec(prev.read_bytes, disk.read_bytes, elapsed);
                sample.write_bytes_per_sec =
                    rate_per_sec(prev.write_bytes, disk.write_bytes, elapsed);
            }
        }

        self.last_net = net;
        #[cfg(target_os = "linux")]
        {
            self.last_disk = disk;
        }
        sample
    }
}

struct LinkState {
    networks: Networks,
    last: Option<Instant>,
    previous: HashMap<String, (u64, u64)>,
}

impl LinkState {
    fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
            last: None,
            previous: HashMap::new(),
        }
    }

    fn sample(&mut self) -> Vec<LinkSample> {
        self.networks.refresh(true);
        let now = Instant::now();
        let elapsed = self
            .last
            .replace(now)
            .map(|t| now.duration_since(t).as_secs_f64())
            .unwrap_or(0.0);

        let mut links: Vec<LinkSample> = self
            .networks
            .iter()
            .filter(|(name, _)| is_link_interface(name))
            .map(|(name, data)| {
                let bytes_in = data.total_received();
                let bytes_out = data.total_transmitted();
                let (rate_in, rate_out) = match self.previous.get(name.as_str()) {
                    Some(&(prev_in, prev_out)) => (
                        rate_per_sec(prev_in, bytes_in, elapsed),
                        rate_per_sec(prev_out, bytes_out, elapsed),
                    ),
                    None => (0.0, 0.0),
                };
                LinkSample {
                    interface: name.clone(),
                    bytes_in,
                    bytes_out,
                    bytes_in_per_sec: rate_in,
                    bytes_out_per_sec: rate_out,
                }
            })
            .collect();
        links.sort_by(|a, b| a.interface.cmp(&b.interface));

        self.previous = links
            .iter()
            .map(|l| (l.interface.clone(), (l.bytes_in, l.bytes_out)))
            .collect();
        links
    }
}

fn is_loopback(name: &str) -> bool {
    name == "lo" || name.starts_with("lo0")
}

/// Thunderbolt / USB4 networking interfaces.
fn is_link_interface(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.contains("thunderbolt")
        || lower
            .strip_prefix("tb")
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c.is_ascii_digit())
}

#[cfg(unix)]
fn send_sigterm(pid: u32) -> Result<()> {
    let target = i32::try_from(pid)
        .ok()
        .filter(|p| *p > 0)
        .ok_or_else(|| HwtopError::terminate(pid, "invalid pid"))?;

    // SAFETY: kill(2) only reads its integer arguments; a positive pid
    // addresses exactly one process.
    let ret = unsafe { libc::kill(target, libc::SIGTERM) };
    if ret == 0 {
        Ok(())
    } else {
        Err(HwtopError::terminate(
            pid,
            std::io::Error::last_os_error().to_string(),
        ))
    }
}

#[cfg(not(unix))]
fn send_sigterm(pid: u32) -> Result<()> {
    let mut system = System::new();
    let target = sysinfo::Pid::from_u32(pid);
    system.refresh_processes(ProcessesToUpdate::Some(&[target]), true);
    match system.process(target) {
        Some(process) if process.kill() => Ok(()),
        Some(_) => Err(HwtopError::terminate(pid, "signal refused")),
        None => Err(HwtopError::terminate(pid, "no such process")),
    }
}
