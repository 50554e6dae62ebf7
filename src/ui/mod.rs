// UI and formatting module

pub mod formatters;
pub mod monitor_tui;

// Re-export commonly used items for cleaner imports
pub use formatters::{format_bytes, format_time, ByteUnit, DisplayUnits, TempUnit};
