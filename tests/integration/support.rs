//! In-memory metrics source and renderer shared by the integration tests.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use parking_lot::Mutex;
use tokio::runtime::Handle;

use hwtop::core::config::Config;
use hwtop::core::system_monitor::{
    ApplicationState, CoreTicks, LinkSample, Mailboxes, MemoryMetrics, MetricsSource,
    MonitorSettings, NetDiskSample, PowerSample, ProcessRow, ProcessSnapshot, Signals,
    SystemInfo, Timebase,
};
use hwtop::ui::monitor_tui::{InputEvent, MonitorController, MonitorSession, Renderer};
use hwtop::{HwtopError, Result};

/// Deterministic source: two cores at 25% busy, 10 W package, and a
/// process list that loses a pid once it has been terminated.
pub struct FakeSource {
    rows: Mutex<Vec<ProcessRow>>,
    terminated: Mutex<Vec<u32>>,
    power_calls: AtomicU64,
    process_calls: AtomicU64,
    refuse_terminate: bool,
}

impl FakeSource {
    pub fn new(rows: Vec<ProcessRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
            terminated: Mutex::new(Vec::new()),
            power_calls: AtomicU64::new(0),
            process_calls: AtomicU64::new(0),
            refuse_terminate: false,
        }
    }

    pub fn refusing_terminate(rows: Vec<ProcessRow>) -> Self {
        Self {
            refuse_terminate: true,
            ..Self::new(rows)
        }
    }

    pub fn terminated(&self) -> Vec<u32> {
        self.terminated.lock().clone()
    }

    pub fn power_calls(&self) -> u64 {
        self.power_calls.load(Ordering::SeqCst)
    }

    pub fn process_calls(&self) -> u64 {
        self.process_calls.load(Ordering::SeqCst)
    }
}

impl MetricsSource for FakeSource {
    fn sample_power(&self) -> Result<PowerSample> {
        let n = self.power_calls.fetch_add(1, Ordering::SeqCst) as f64;
        let ticks = CoreTicks {
            user: 25.0 * n,
            system: 0.0,
            idle: 75.0 * n,
            nice: 0.0,
        };
        Ok(PowerSample {
            cpu_watts: 6.0,
            gpu_watts: 2.0,
            reported_total_watts: 10.0,
            cpu_temp: 48.0,
            core_ticks: vec![ticks; 2],
            memory: MemoryMetrics {
                total: 8 << 30,
                used: 2 << 30,
                available: 6 << 30,
                ..Default::default()
            },
            ..Default::default()
        })
    }

    fn enumerate_processes(&self) -> Result<ProcessSnapshot> {
        let n = self.process_calls.fetch_add(1, Ordering::SeqCst);
        let rows = self
            .rows
            .lock()
            .iter()
            .map(|row| ProcessRow {
                // 100ms of CPU per enumeration
                cpu_time_raw: row.cpu_time_raw + n * 100,
                ..row.clone()
            })
            .collect();
        Ok(ProcessSnapshot::new(rows))
    }

    fn sample_net_disk(&self) -> NetDiskSample {
        NetDiskSample {
            in_bytes_per_sec: 2048.0,
            out_bytes_per_sec: 1024.0,
            ..Default::default()
        }
    }

    fn sample_links(&self) -> Vec<LinkSample> {
        vec![LinkSample {
            interface: "thunderbolt0".into(),
            bytes_in_per_sec: 500.0,
            bytes_out_per_sec: 250.0,
            ..Default::default()
        }]
    }

    fn send_terminate(&self, pid: u32) -> Result<()> {
        self.terminated.lock().push(pid);
        if self.refuse_terminate {
            return Err(HwtopError::terminate(pid, "Operation not permitted"));
        }
        self.rows.lock().retain(|row| row.pid != pid);
        Ok(())
    }

    fn timebase(&self) -> Timebase {
        Timebase {
            numer: 1_000_000,
            denom: 1,
        }
    }

    fn system_info(&self) -> SystemInfo {
        SystemInfo {
            cpu_brand: "Fake CPU".into(),
            core_count: 2,
            host_name: "testhost".into(),
            ..Default::default()
        }
    }
}

pub fn row(pid: u32, command: &str) -> ProcessRow {
    ProcessRow {
        pid,
        user: "tester".into(),
        command: command.into(),
        state: "Run".into(),
        virtual_bytes: 1 << 20,
        resident_bytes: 1 << 19,
        memory_percent: 1.0,
        cpu_time_raw: 0,
    }
}

pub fn sample_rows() -> Vec<ProcessRow> {
    vec![row(10, "victim"), row(20, "bystander"), row(30, "daemon")]
}

/// State seeded the way the TUI seeds it before the first tick.
pub fn seeded_state(source: &FakeSource) -> ApplicationState {
    let mut state = ApplicationState::new(
        MonitorSettings::default(),
        source.system_info(),
        source.timebase(),
    );
    state.merge_power(source.sample_power().unwrap());
    state.merge_processes(source.enumerate_processes().unwrap());
    state
}

/// Renderer that only counts frames.
#[derive(Clone, Default)]
pub struct CountingRenderer {
    renders: Arc<AtomicUsize>,
    clears: Arc<AtomicUsize>,
}

impl CountingRenderer {
    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl Renderer for CountingRenderer {
    fn render(&mut self, _state: &ApplicationState) -> Result<()> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn key(code: KeyCode) -> InputEvent {
    InputEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

/// A controller wired to a seeded session, ready for dispatching inputs.
/// Must be built inside a tokio runtime.
pub struct Harness {
    pub controller: MonitorController<CountingRenderer>,
    pub session: Arc<MonitorSession<CountingRenderer>>,
    pub renderer: CountingRenderer,
    pub mailboxes: Mailboxes,
    pub signals: Signals,
}

impl Harness {
    pub fn new(source: Arc<FakeSource>, config_path: Option<PathBuf>) -> Self {
        let renderer = CountingRenderer::default();
        let session = Arc::new(MonitorSession::new(
            seeded_state(&source),
            renderer.clone(),
        ));
        let mailboxes = Mailboxes::new();
        let signals = Signals::new(Duration::from_millis(1000));
        let source: Arc<dyn MetricsSource> = source;
        let controller = MonitorController::new(
            Arc::clone(&session),
            source,
            mailboxes.clone(),
            signals.clone(),
            Handle::current(),
            Config::default(),
            config_path,
        );
        Self {
            controller,
            session,
            renderer,
            mailboxes,
            signals,
        }
    }

    pub fn press(&mut self, code: KeyCode) -> std::ops::ControlFlow<()> {
        self.controller.dispatch(key(code))
    }

    pub fn pids(&self) -> Vec<u32> {
        self.session
            .with_state(|s| s.processes.snapshot().iter().map(|p| p.pid).collect())
    }
}
