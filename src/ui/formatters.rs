use humansize::{format_size, BINARY};

pub use crate::core::system_monitor::display::{ByteUnit, DisplayUnits, TempUnit};

/// Format a byte quantity in the requested unit (1024-based).
///
/// `Auto` divides by 1024 while the value is at least 1000, so the printed
/// number never needs four digits.
pub fn format_bytes(value: f64, unit: ByteUnit) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let (value, suffix) = match unit {
        ByteUnit::Byte => (value, "B"),
        ByteUnit::Kb => (value / 1024.0, "KB"),
        ByteUnit::Mb => (value / (1024.0 * 1024.0), "MB"),
        ByteUnit::Gb => (value / (1024.0 * 1024.0 * 1024.0), "GB"),
        ByteUnit::Auto => {
            let mut value = value;
            let mut i = 0;
            while value >= 1000.0 && i < UNITS.len() - 1 {
                value /= 1024.0;
                i += 1;
            }
            (value, UNITS[i])
        }
    };
    format!("{:.1}{}", value, suffix)
}

pub fn format_rate(bytes_per_sec: f64, unit: ByteUnit) -> String {
    format!("{}/s", format_bytes(bytes_per_sec, unit))
}

/// Cumulative CPU time: `1h02:03` past an hour, `02:03.45` below.
pub fn format_time(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let whole = seconds as u64;
    let hours = whole / 3600;
    let minutes = (whole / 60) % 60;
    let secs = whole % 60;
    let centis = ((seconds - whole as f64) * 100.0) as u64;

    if hours > 0 {
        format!("{}h{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}.{:02}", minutes, secs, centis)
    }
}

pub fn format_temp(celsius: f64, unit: TempUnit) -> String {
    match unit {
        TempUnit::Celsius => format!("{}°C", celsius as i64),
        TempUnit::Fahrenheit => format!("{}°F", (celsius * 9.0 / 5.0 + 32.0) as i64),
    }
}

/// Compact process memory column: `512K`, `37M`, `1.5G`, `2.0T`.
pub fn format_memory_size(bytes: u64) -> String {
    const MB: u64 = 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    let kb = bytes / 1024;
    if kb >= TB {
        format!("{:.1}T", kb as f64 / TB as f64)
    } else if kb >= GB {
        format!("{:.1}G", kb as f64 / GB as f64)
    } else if kb >= MB {
        format!("{}M", kb / MB)
    } else {
        format!("{}K", kb)
    }
}

/// Human readable size for info panels, e.g. "15.5 GiB".
pub fn format_capacity(bytes: u64) -> String {
    format_size(bytes, BINARY)
}

pub fn format_uptime(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3600;
    let minutes = (secs % 3600) / 60;
    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else {
        format!("{}h {}m", hours, minutes)
    }
}

/// Cut `s` to `max_len` characters, ending with "..." when shortened.
pub fn truncate_with_ellipsis(s: &str, max_len: usize) -> String {
    if max_len <= 3 {
        return "...".to_string();
    }
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_len - 3).collect();
    format!("{}...", kept)
}
