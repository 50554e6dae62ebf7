//! Headless mode: print one JSON object per sample instead of drawing.

use std::io::Write;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::system_monitor::{
    ApplicationState, CpuMetrics, GpuMetrics, LinkMetrics, MemoryMetrics, MetricsSource,
    MonitorSettings, NetDiskMetrics, ProcessMetrics,
};

/// Processes included in each record.
const TOP_PROCESSES: usize = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessOptions {
    /// Samples to print; 0 runs until interrupted.
    pub count: u64,
    pub pretty: bool,
}

#[derive(Serialize)]
struct HeadlessRecord<'a> {
    timestamp: String,
    host: &'a str,
    interval_ms: u64,
    cpu: &'a CpuMetrics,
    gpu: &'a GpuMetrics,
    memory: &'a MemoryMetrics,
    net_disk: &'a NetDiskMetrics,
    links: &'a LinkMetrics,
    top_processes: &'a [ProcessMetrics],
}

/// Sample `source` at the configured interval and write JSON records to `out`.
///
/// The first reading only seeds the counters, so every printed record
/// carries real deltas.
pub fn run<W: Write>(
    source: &dyn MetricsSource,
    settings: MonitorSettings,
    options: HeadlessOptions,
    out: &mut W,
) -> Result<()> {
    let mut state = ApplicationState::new(settings, source.system_info(), source.timebase());
    let interval = Duration::from_millis(state.interval_ms);

    state.merge_power(
        source
            .sample_power()
            .context("Failed to obtain the initial CPU/power sample")?,
    );
    match source.enumerate_processes() {
        Ok(snapshot) => {
            state.merge_processes(snapshot);
        }
        Err(e) => log::warn!("Initial process snapshot failed: {}", e),
    }
    source.sample_net_disk();
    source.sample_links();

    let mut emitted = 0u64;
    while options.count == 0 || emitted < options.count {
        thread::sleep(interval);

        match source.sample_power() {
            Ok(sample) => state.merge_power(sample),
            Err(e) => log::warn!("Power sample failed: {}", e),
        }
        match source.enumerate_processes() {
            Ok(snapshot) => {
                state.merge_processes(snapshot);
            }
            Err(e) => log::warn!("Process snapshot failed: {}", e),
        }
        state.merge_net_disk(source.sample_net_disk());
        state.merge_links(source.sample_links());

        write_record(&state, options.pretty, out)?;
        emitted += 1;
    }

    Ok(())
}

fn write_record<W: Write>(state: &ApplicationState, pretty: bool, out: &mut W) -> Result<()> {
    let processes = state.processes.visible();
    let record = HeadlessRecord {
        timestamp: chrono::Local::now().to_rfc3339(),
        host: &state.system_info.host_name,
        interval_ms: state.interval_ms,
        cpu: &state.cpu,
        gpu: &state.gpu,
        memory: &state.memory,
        net_disk: &state.net_disk,
        links: &state.links,
        top_processes: &processes[..processes.len().min(TOP_PROCESSES)],
    };

    if pretty {
        serde_json::to_writer_pretty(&mut *out, &record)?;
    } else {
        serde_json::to_writer(&mut *out, &record)?;
    }
    writeln!(out)?;
    out.flush().context("Failed to flush output")?;
    Ok(())
}
