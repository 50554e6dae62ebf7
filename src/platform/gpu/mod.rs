//! GPU-specific platform code.
//!
//! Provides GPU readings for the power sampler.
//! Supports NVIDIA (via NVML) and, on Linux, any driver exposing
//! `gpu_busy_percent` in sysfs (amdgpu, i915/xe on recent kernels).

mod nvidia;
#[cfg(target_os = "linux")]
mod sysfs;

pub use nvidia::NvidiaGpuProvider;
#[cfg(target_os = "linux")]
pub use sysfs::SysfsGpuProvider;

use crate::error::{HwtopError, Result};

/// One GPU reading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpuReading {
    pub active_percent: f64,
    pub freq_mhz: u32,
    pub power_watts: f64,
    pub temp_celsius: Option<f32>,
}

/// Trait for GPU metrics providers
pub trait GpuProvider: Send {
    fn name(&self) -> String;

    /// Collect current GPU metrics
    fn sample(&mut self) -> Result<GpuReading>;
}

/// Attempt to get an available GPU provider
///
/// Tries each supported source in order of preference:
/// 1. NVIDIA (via NVML)
/// 2. Linux sysfs
///
/// Returns error if no GPU is available.
pub fn get_gpu_provider() -> Result<Box<dyn GpuProvider>> {
    match NvidiaGpuProvider::new() {
        Ok(provider) => return Ok(Box::new(provider)),
        Err(e) => log::debug!("{}", e),
    }

    #[cfg(target_os = "linux")]
    if let Some(provider) = SysfsGpuProvider::detect() {
        return Ok(Box::new(provider));
    }

    Err(HwtopError::gpu_not_available("No supported GPU found"))
}
