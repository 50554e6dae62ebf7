use std::io::{self, Stdout};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use parking_lot::Mutex;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::core::config::Config;
use crate::core::system_monitor::{
    ApplicationState, Mailboxes, MetricsRuntime, MetricsSource, MonitorSettings, ProcessSnapshot,
    Signals,
};
use crate::error::HwtopError;

use super::event_handler::InputEvent;
use super::mode::{handle_key, handle_mouse, Action};
use super::render::render_ui;

/// Draws the application state.
pub trait Renderer: Send {
    fn render(&mut self, state: &ApplicationState) -> crate::Result<()>;

    /// Forget what is on screen so the next render repaints everything.
    fn clear(&mut self) -> crate::Result<()> {
        Ok(())
    }
}

/// Renderer drawing to the real terminal on the alternate screen.
pub struct TerminalRenderer {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    restored: bool,
}

impl TerminalRenderer {
    /// Switch the terminal to raw mode on the alternate screen.
    pub fn enter() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
            .context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend).context("Failed to create terminal")?;
        Ok(Self {
            terminal,
            restored: false,
        })
    }

    pub fn width(&self) -> crate::Result<u16> {
        self.terminal
            .size()
            .map(|size| size.width)
            .map_err(|e| HwtopError::tui(e.to_string()))
    }

    /// Give the terminal back to the shell. Safe to call more than once.
    pub fn restore(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}

impl Renderer for TerminalRenderer {
    fn render(&mut self, state: &ApplicationState) -> crate::Result<()> {
        self.terminal
            .draw(|frame| render_ui(frame, state))
            .map_err(|e| HwtopError::tui(e.to_string()))?;
        Ok(())
    }

    fn clear(&mut self) -> crate::Result<()> {
        self.terminal
            .clear()
            .map_err(|e| HwtopError::tui(e.to_string()))
    }
}

impl Drop for TerminalRenderer {
    fn drop(&mut self) {
        self.restore();
    }
}

struct SessionInner<R> {
    state: ApplicationState,
    renderer: R,
}

/// The application state and its renderer behind one lock.
///
/// Every mutation is followed by a render while the lock is still held, so
/// a frame never shows a half-applied update. The lock is never held
/// across an `.await`.
pub struct MonitorSession<R> {
    inner: Mutex<SessionInner<R>>,
}

impl<R: Renderer> MonitorSession<R> {
    pub fn new(state: ApplicationState, renderer: R) -> Self {
        Self {
            inner: Mutex::new(SessionInner { state, renderer }),
        }
    }

    /// Take at most one value from every mailbox, merge what arrived, then
    /// render exactly once.
    pub fn drain_and_render(&self, mailboxes: &Mailboxes) -> crate::Result<()> {
        let mut inner = self.inner.lock();
        let SessionInner { state, renderer } = &mut *inner;

        if let Some(sample) = mailboxes.power.take() {
            state.merge_power(sample);
        }
        if let Some(snapshot) = mailboxes.processes.take() {
            state.merge_processes(snapshot);
        }
        if let Some(sample) = mailboxes.net_disk.take() {
            state.merge_net_disk(sample);
        }
        if let Some(links) = mailboxes.links.take() {
            state.merge_links(links);
        }

        renderer.render(state)
    }

    pub fn render(&self) -> crate::Result<()> {
        let mut inner = self.inner.lock();
        let SessionInner { state, renderer } = &mut *inner;
        renderer.render(state)
    }

    pub fn force_redraw(&self) -> crate::Result<()> {
        let mut inner = self.inner.lock();
        let SessionInner { state, renderer } = &mut *inner;
        renderer.clear()?;
        renderer.render(state)
    }

    /// Run the mode machine on one input, then render.
    pub fn handle_input(&self, event: InputEvent) -> crate::Result<Action> {
        let mut inner = self.inner.lock();
        let SessionInner { state, renderer } = &mut *inner;

        let action = match event {
            InputEvent::Key(key) => handle_key(state, key),
            InputEvent::Mouse(mouse) => handle_mouse(state, mouse),
            InputEvent::Resize(cols, _) => {
                state.history.resize(cols as usize);
                Action::None
            }
        };
        renderer.render(state)?;
        Ok(action)
    }

    /// Merge an out-of-band process snapshot (after a kill) and render.
    ///
    /// Whatever the process sampler left in its mailbox is taken under the
    /// same lock, so the next tick cannot bring a killed pid back. It is
    /// merged only if it is newer than `snapshot`.
    pub fn refresh_processes(
        &self,
        snapshot: ProcessSnapshot,
        mailboxes: &Mailboxes,
    ) -> crate::Result<()> {
        let mut inner = self.inner.lock();
        let SessionInner { state, renderer } = &mut *inner;
        state.merge_processes(snapshot);
        if let Some(pending) = mailboxes.processes.take() {
            state.merge_processes(pending);
        }
        renderer.render(state)
    }

    pub fn party_step(&self) -> crate::Result<()> {
        let mut inner = self.inner.lock();
        let SessionInner { state, renderer } = &mut *inner;
        if !state.party_mode {
            return Ok(());
        }
        state.advance_party_theme();
        renderer.clear()?;
        renderer.render(state)
    }

    pub fn with_state<T>(&self, f: impl FnOnce(&mut ApplicationState) -> T) -> T {
        f(&mut self.inner.lock().state)
    }

    pub fn with_renderer<T>(&self, f: impl FnOnce(&mut R) -> T) -> T {
        f(&mut self.inner.lock().renderer)
    }
}

/// Periodic consumer tick: drain the mailboxes and redraw.
pub async fn consumer_task<R: Renderer>(
    session: Arc<MonitorSession<R>>,
    mailboxes: Mailboxes,
    mut interval_rx: watch::Receiver<Duration>,
    mut done: broadcast::Receiver<()>,
) {
    let period = *interval_rx.borrow_and_update();
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = session.drain_and_render(&mailboxes) {
                    log::warn!("Render failed: {}", e);
                }
            }
            changed = interval_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let period = *interval_rx.borrow_and_update();
                ticker = interval_at(Instant::now() + period, period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            }
            _ = done.recv() => break,
        }
    }

    log::debug!("consumer tick stopped");
}

/// Party mode: cycle the theme at half the interval until aborted.
pub async fn party_task<R: Renderer>(
    session: Arc<MonitorSession<R>>,
    mut interval_rx: watch::Receiver<Duration>,
    mut done: broadcast::Receiver<()>,
) {
    let half = |d: Duration| (d / 2).max(Duration::from_millis(50));
    let period = half(*interval_rx.borrow_and_update());
    let mut ticker = interval_at(Instant::now() + period, period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = session.party_step() {
                    log::warn!("Party redraw failed: {}", e);
                }
            }
            changed = interval_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let period = half(*interval_rx.borrow_and_update());
                ticker = interval_at(Instant::now() + period, period);
            }
            _ = done.recv() => break,
        }
    }
}

/// Executes the side effects the mode machine asks for.
pub struct MonitorController<R> {
    session: Arc<MonitorSession<R>>,
    source: Arc<dyn MetricsSource>,
    mailboxes: Mailboxes,
    signals: Signals,
    handle: Handle,
    config: Config,
    config_path: Option<PathBuf>,
    party: Option<JoinHandle<()>>,
}

impl<R: Renderer + 'static> MonitorController<R> {
    pub fn new(
        session: Arc<MonitorSession<R>>,
        source: Arc<dyn MetricsSource>,
        mailboxes: Mailboxes,
        signals: Signals,
        handle: Handle,
        config: Config,
        config_path: Option<PathBuf>,
    ) -> Self {
        Self {
            session,
            source,
            mailboxes,
            signals,
            handle,
            config,
            config_path,
            party: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn dispatch(&mut self, event: InputEvent) -> ControlFlow<()> {
        match self.session.handle_input(event) {
            Ok(action) => self.execute(action),
            Err(e) => {
                log::warn!("Render failed: {}", e);
                ControlFlow::Continue(())
            }
        }
    }

    pub fn execute(&mut self, action: Action) -> ControlFlow<()> {
        match action {
            Action::None => {}
            Action::Quit => return ControlFlow::Break(()),
            Action::Terminate(pid) => self.terminate(pid),
            Action::IntervalChanged(ms) => {
                let applied = self.signals.set_interval(Duration::from_millis(ms));
                log::info!("Interval set to {}ms", applied.as_millis());
            }
            Action::PartyToggled(on) => self.set_party(on),
            Action::Persist => self.persist(),
            Action::ForceRedraw => {
                if let Err(e) = self.session.force_redraw() {
                    log::warn!("Redraw failed: {}", e);
                }
            }
        }
        ControlFlow::Continue(())
    }

    /// SIGTERM, then re-enumerate immediately so the list does not wait for
    /// the next tick.
    fn terminate(&self, pid: u32) {
        match self.source.send_terminate(pid) {
            Ok(()) => log::info!("Sent SIGTERM to {}", pid),
            Err(e) => log::warn!("{}", e),
        }

        match self.source.enumerate_processes() {
            Ok(snapshot) => {
                if let Err(e) = self.session.refresh_processes(snapshot, &self.mailboxes) {
                    log::warn!("Render failed: {}", e);
                }
            }
            Err(e) => log::warn!("Failed to refresh processes after kill: {}", e),
        }
    }

    fn persist(&mut self) {
        let settings = self.session.with_state(|state| state.settings());
        self.config.set_theme(settings.theme);
        self.config.set_layout(settings.layout);
        self.config.set_sort_spec(settings.sort);

        if let Some(path) = &self.config_path {
            if let Err(e) = self.config.save_to(path) {
                log::warn!("Failed to save config: {:#}", e);
            }
        }
    }

    fn set_party(&mut self, on: bool) {
        if let Some(task) = self.party.take() {
            task.abort();
        }
        if on {
            self.party = Some(self.handle.spawn(party_task(
                Arc::clone(&self.session),
                self.signals.interval_receiver(),
                self.signals.done_receiver(),
            )));
        }
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.party.take() {
            task.abort();
        }
    }
}

/// Configuration for the monitor app
#[derive(Debug, Clone, Default)]
pub struct MonitorAppConfig {
    pub settings: MonitorSettings,
    /// Loaded config, updated and saved on theme, layout and sort changes.
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

/// Run the monitor TUI application
pub fn run_monitor_app(source: Arc<dyn MetricsSource>, app_config: MonitorAppConfig) -> Result<()> {
    let initial = source
        .sample_power()
        .context("Failed to obtain the initial CPU/power sample")?;

    let mut state = ApplicationState::new(
        app_config.settings,
        source.system_info(),
        source.timebase(),
    );
    // seeds the CPU and process baselines
    state.merge_power(initial);
    match source.enumerate_processes() {
        Ok(snapshot) => {
            state.merge_processes(snapshot);
        }
        Err(e) => log::warn!("Initial process snapshot failed: {}", e),
    }

    let runtime = MetricsRuntime::start(
        Arc::clone(&source),
        Duration::from_millis(state.interval_ms),
    )?;

    let renderer = TerminalRenderer::enter()?;
    if let Ok(width) = renderer.width() {
        state.history.resize(width as usize);
    }

    let session = Arc::new(MonitorSession::new(state, renderer));
    session.render().context("Initial render failed")?;

    let signals = runtime.signals().clone();
    runtime.spawn(consumer_task(
        Arc::clone(&session),
        runtime.mailboxes.clone(),
        signals.interval_receiver(),
        signals.done_receiver(),
    ));

    let mut controller = MonitorController::new(
        Arc::clone(&session),
        source,
        runtime.mailboxes.clone(),
        signals,
        runtime.handle(),
        app_config.config,
        app_config.config_path,
    );

    log::info!("Monitor started");
    let result = input_loop(&mut controller);

    controller.stop();
    runtime.shutdown();
    session.with_renderer(|renderer| renderer.restore());
    log::info!("Monitor stopped");

    result
}

/// Blocking input listener; returns when the mode machine asks to quit.
fn input_loop<R: Renderer + 'static>(controller: &mut MonitorController<R>) -> Result<()> {
    loop {
        let event = event::read().context("Event read failed")?;
        if let Some(input) = InputEvent::from_crossterm(event) {
            if controller.dispatch(input).is_break() {
                return Ok(());
            }
        }
    }
}
