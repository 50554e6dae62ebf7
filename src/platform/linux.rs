//! procfs and sysfs readers used by the sysinfo-backed source on Linux.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::core::system_monitor::CoreTicks;

const PROC_STAT: &str = "/proc/stat";
const PROC_DISKSTATS: &str = "/proc/diskstats";
const SYS_BLOCK: &str = "/sys/block";
const POWERCAP_ROOT: &str = "/sys/class/powercap";

/// Sector size used by /proc/diskstats regardless of the device.
const SECTOR_BYTES: u64 = 512;

/// Per-core jiffy counters from /proc/stat, in core order.
pub fn read_core_ticks() -> Option<Vec<CoreTicks>> {
    let content = fs::read_to_string(PROC_STAT).ok()?;
    let ticks = parse_core_ticks(&content);
    (!ticks.is_empty()).then_some(ticks)
}

/// Parses the `cpuN` lines of /proc/stat.
///
/// iowait counts as idle; irq, softirq and steal count as system.
pub fn parse_core_ticks(content: &str) -> Vec<CoreTicks> {
    content
        .lines()
        .filter(|line| {
            line.strip_prefix("cpu")
                .and_then(|rest| rest.chars().next())
                .is_some_and(|c| c.is_ascii_digit())
        })
        .map(|line| {
            let fields: Vec<f64> = line
                .split_whitespace()
                .skip(1)
                .map(|f| f.parse().unwrap_or(0.0))
                .collect();
            let field = |i: usize| fields.get(i).copied().unwrap_or(0.0);
            CoreTicks {
                user: field(0),
                nice: field(1),
                system: field(2) + field(5) + field(6) + field(7),
                idle: field(3) + field(4),
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DiskCounters {
    pub read_ops: u64,
    pub write_ops: u64,
    pub read_bytes: u64,
    pub write_bytes: u64,
}

pub fn read_disk_counters() -> Option<DiskCounters> {
    let content = fs::read_to_string(PROC_DISKSTATS).ok()?;
    Some(parse_diskstats(&content, |name| {
        Path::new(SYS_BLOCK).join(name).exists()
    }))
}

/// Sums whole-disk rows of /proc/diskstats. Partitions and virtual
/// devices are skipped so nothing is counted twice.
pub fn parse_diskstats(content: &str, is_whole_disk: impl Fn(&str) -> bool) -> DiskCounters {
    let mut total = DiskCounters::default();
    for line in content.lines() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 10 {
            continue;
        }
        let name = fields[2];
        if ["loop", "ram", "zram", "dm-", "md"]
            .iter()
            .any(|prefix| name.starts_with(prefix))
            || !is_whole_disk(name)
        {
            continue;
        }
        let num = |i: usize| fields[i].parse::<u64>().unwrap_or(0);
        total.read_ops += num(3);
        total.read_bytes += num(5) * SECTOR_BYTES;
        total.write_ops += num(7);
        total.write_bytes += num(9) * SECTOR_BYTES;
    }
    total
}

/// Intel RAPL power domains as exposed under /sys/class/powercap.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RaplWatts {
    pub package: f64,
    pub core: f64,
    pub uncore: f64,
    pub dram: f64,
    pub psys: f64,
}

struct RaplDomain {
    name: String,
    energy_path: PathBuf,
    max_energy_uj: u64,
    last_energy_uj: Option<u64>,
}

/// Converts RAPL energy counters into average watts between calls.
pub struct RaplReader {
    domains: Vec<RaplDomain>,
    last_read: Option<Instant>,
}

impl RaplReader {
    /// Returns `None` when no readable RAPL zone exists.
    pub fn detect() -> Option<Self> {
        Self::detect_in(Path::new(POWERCAP_ROOT))
    }

    fn detect_in(root: &Path) -> Option<Self> {
        let mut zones: Vec<PathBuf> = fs::read_dir(root)
            .ok()?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("intel-rapl:"))
            })
            .collect();
        zones.sort();

        let domains: Vec<RaplDomain> = zones
            .into_iter()
            .filter_map(|zone| {
                let name = fs::read_to_string(zone.join("name")).ok()?.trim().to_string();
                let energy_path = zone.join("energy_uj");
                // energy_uj is root-only on most distributions
                fs::read_to_string(&energy_path).ok()?;
                let max_energy_uj = read_u64(&zone.join("max_energy_range_uj")).unwrap_or(u64::MAX);
                Some(RaplDomain {
                    name,
                    energy_path,
                    max_energy_uj,
                    last_energy_uj: None,
                })
            })
            .collect();

        if domains.is_empty() {
            log::debug!("No readable RAPL domains under {}", root.display());
            return None;
        }
        Some(Self {
            domains,
            last_read: None,
        })
    }

    /// Average power per domain since the previous call. The first call
    /// only primes the counters and reports zeros.
    pub fn read(&mut self) -> RaplWatts {
        let now = Instant::now();
        let elapsed = self
            .last_read
            .map(|t| now.duration_since(t).as_secs_f64())
            .unwrap_or(0.0);
        self.last_read = Some(now);

        let mut watts = RaplWatts::default();
        for domain in &mut self.domains {
            let Some(current) = read_u64(&domain.energy_path) else {
                continue;
            };
            let previous = domain.last_energy_uj.replace(current);
            let Some(previous) = previous else {
                continue;
            };
            if elapsed <= 0.0 {
                continue;
            }
            let delta = energy_delta(previous, current, domain.max_energy_uj);
            let value = delta as f64 / elapsed / 1_000_000.0;

            let name = domain.name.as_str();
            if name.starts_with("package") {
                watts.package += value;
            } else if name == "core" {
                watts.core += value;
            } else if name == "uncore" {
                watts.uncore += value;
            } else if name == "dram" {
                watts.dram += value;
            } else if name == "psys" {
                watts.psys += value;
            }
        }
        watts
    }
}

/// Microjoules consumed between two counter reads, handling one wrap.
pub fn energy_delta(previous: u64, current: u64, max_energy_uj: u64) -> u64 {
    if current >= previous {
        current - previous
    } else {
        max_energy_uj.saturating_sub(previous) + current
    }
}

fn read_u64(path: &Path) -> Option<u64> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}
