#[cfg(feature = "nvml")]
use nvml_wrapper::{
    enum_wrappers::device::{Clock, TemperatureSensor},
    Device, Nvml,
};

use super::{GpuProvider, GpuReading};
use crate::error::{HwtopError, Result};

/// NVIDIA GPU provider using NVML
pub struct NvidiaGpuProvider {
    #[cfg(feature = "nvml")]
    nvml: Nvml,
    device_index: u32,
}

impl NvidiaGpuProvider {
    /// Initializes NVML and selects the first available GPU.
    pub fn new() -> Result<Self> {
        Self::with_device_index(0)
    }

    /// Create provider for a specific GPU index
    pub fn with_device_index(index: u32) -> Result<Self> {
        #[cfg(feature = "nvml")]
        {
            let nvml = Nvml::init().map_err(|e| {
                HwtopError::gpu_not_available(format!("Failed to init NVML: {}", e))
            })?;

            // Verify device exists
            let _ = nvml.device_by_index(index).map_err(|e| {
                HwtopError::gpu_not_available(format!("GPU {} not found: {}", index, e))
            })?;

            Ok(Self {
                nvml,
                device_index: index,
            })
        }
        #[cfg(not(feature = "nvml"))]
        {
            let _ = index;
            Err(HwtopError::gpu_not_available(
                "NVIDIA GPU support not enabled",
            ))
        }
    }

    #[cfg(feature = "nvml")]
    fn get_device(&self) -> Result<Device<'_>> {
        self.nvml.device_by_index(self.device_index).map_err(|e| {
            HwtopError::metric_collection(format!("Failed to get GPU device: {}", e))
        })
    }
}

impl GpuProvider for NvidiaGpuProvider {
    fn name(&self) -> String {
        #[cfg(feature = "nvml")]
        {
            self.get_device()
                .and_then(|d| {
                    d.name()
                        .map_err(|e| HwtopError::metric_collection(e.to_string()))
                })
                .unwrap_or_else(|_| "Unknown NVIDIA GPU".to_string())
        }
        #[cfg(not(feature = "nvml"))]
        {
            format!("NVIDIA GPU {}", self.device_index)
        }
    }

    fn sample(&mut self) -> Result<GpuReading> {
        #[cfg(feature = "nvml")]
        {
            let device = self.get_device()?;

            let utilization = device.utilization_rates().map_err(|e| {
                HwtopError::metric_collection(format!("Failed to read GPU utilization: {}", e))
            })?;

            Ok(GpuReading {
                active_percent: utilization.gpu as f64,
                freq_mhz: device.clock_info(Clock::Graphics).unwrap_or(0),
                // mW to W
                power_watts: device.power_usage().map(|mw| mw as f64 / 1000.0).unwrap_or(0.0),
                temp_celsius: device
                    .temperature(TemperatureSensor::Gpu)
                    .ok()
                    .map(|t| t as f32),
            })
        }
        #[cfg(not(feature = "nvml"))]
        {
            Err(HwtopError::gpu_not_available(
                "NVIDIA GPU support not enabled",
            ))
        }
    }
}
