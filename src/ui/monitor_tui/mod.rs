//! Terminal User Interface for system monitoring.
//!
//! Provides a real-time dashboard using ratatui.

mod app;
mod event_handler;
pub mod mode;
mod render;
mod theme;
mod widgets;

pub use app::{
    consumer_task, party_task, run_monitor_app, MonitorAppConfig, MonitorController,
    MonitorSession, Renderer, TerminalRenderer,
};
pub use event_handler::InputEvent;
pub use mode::{handle_key, Action, KillButton, UiMode};
pub use theme::{Layout, Theme};
