// Platform-specific code module

pub mod gpu;
#[cfg(target_os = "linux")]
pub mod linux;
pub mod sysinfo_source;

pub use sysinfo_source::SysinfoSource;
