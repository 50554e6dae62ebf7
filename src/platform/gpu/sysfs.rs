use std::fs;
use std::path::{Path, PathBuf};

use super::{GpuProvider, GpuReading};
use crate::error::{HwtopError, Result};

const DRM_ROOT: &str = "/sys/class/drm";

/// GPU provider reading the DRM sysfs attributes of the first card that
/// reports `gpu_busy_percent`.
pub struct SysfsGpuProvider {
    device_dir: PathBuf,
    hwmon_dir: Option<PathBuf>,
    driver: String,
}

impl SysfsGpuProvider {
    pub fn detect() -> Option<Self> {
        Self::detect_in(Path::new(DRM_ROOT))
    }

    fn detect_in(root: &Path) -> Option<Self> {
        let mut cards: Vec<PathBuf> = fs::read_dir(root)
            .ok()?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("card") && !n.contains('-'))
            })
            .collect();
        cards.sort();

        let device_dir = cards
            .into_iter()
            .map(|card| card.join("device"))
            .find(|dir| dir.join("gpu_busy_percent").exists())?;

        let hwmon_dir = fs::read_dir(device_dir.join("hwmon"))
            .ok()
            .and_then(|mut entries| entries.find_map(|e| e.ok()))
            .map(|e| e.path());

        let driver = fs::read_link(device_dir.join("driver"))
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "drm".to_string());

        log::debug!("Using sysfs GPU at {}", device_dir.display());
        Some(Self {
            device_dir,
            hwmon_dir,
            driver,
        })
    }

    fn read_hwmon(&self, file: &str) -> Option<u64> {
        self.hwmon_dir
            .as_ref()
            .and_then(|dir| read_u64(&dir.join(file)))
    }
}

impl GpuProvider for SysfsGpuProvider {
    fn name(&self) -> String {
        format!("{} GPU", self.driver)
    }

    fn sample(&mut self) -> Result<GpuReading> {
        let busy = read_u64(&self.device_dir.join("gpu_busy_percent")).ok_or_else(|| {
            HwtopError::metric_collection(format!(
                "Failed to read {}/gpu_busy_percent",
                self.device_dir.display()
            ))
        })?;

        let freq_mhz = fs::read_to_string(self.device_dir.join("pp_dpm_sclk"))
            .ok()
            .and_then(|s| parse_active_dpm_mhz(&s))
            .unwrap_or(0);

        // hwmon reports microwatts and millidegrees
        let power_watts = self
            .read_hwmon("power1_average")
            .or_else(|| self.read_hwmon("power1_input"))
            .map(|uw| uw as f64 / 1_000_000.0)
            .unwrap_or(0.0);
        let temp_celsius = self.read_hwmon("temp1_input").map(|m| m as f32 / 1000.0);

        Ok(GpuReading {
            active_percent: busy.min(100) as f64,
            freq_mhz,
            power_watts,
            temp_celsius,
        })
    }
}

fn read_u64(path: &Path) -> Option<u64> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

/// Picks the line marked `*` in a `pp_dpm_sclk` table, e.g. `1: 1800Mhz *`.
fn parse_active_dpm_mhz(table: &str) -> Option<u32> {
    table
        .lines()
        .find(|line| line.trim_end().ends_with('*'))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|freq| {
            freq.trim_end_matches(|c: char| c.is_ascii_alphabetic())
                .parse()
                .ok()
        })
}
