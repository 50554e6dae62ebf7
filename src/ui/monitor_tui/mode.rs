//! Keyboard/mouse mode state machine.
//!
//! `handle_key` applies an input to the [`ApplicationState`] and returns an
//! [`Action`] for everything that reaches outside the state: sending a
//! signal, persisting the config, retiming the samplers. The caller holds
//! the session lock while calling it and executes the action afterwards.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::core::system_monitor::tasks::INTERVAL_STEP_MS;
use crate::core::system_monitor::ApplicationState;

pub use crate::core::system_monitor::display::{KillButton, UiMode};

/// Side effect requested by an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    /// Send SIGTERM to the pid and refresh the process list right away.
    Terminate(u32),
    /// The interval was changed to this many milliseconds.
    IntervalChanged(u64),
    /// Party mode was switched on (`true`) or off.
    PartyToggled(bool),
    /// Theme, layout or sort order changed and should be saved.
    Persist,
    /// Clear the terminal and repaint everything.
    ForceRedraw,
}

pub fn handle_key(state: &mut ApplicationState, key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    let mode = std::mem::take(&mut state.mode);
    let (next, action) = match mode {
        UiMode::Normal => normal_key(state, key),
        UiMode::Search => search_key(state, key),
        UiMode::KillConfirm {
            pid,
            command,
            focus,
        } => kill_key(pid, command, focus, key),
        overlay => overlay_key(overlay, key),
    };
    state.mode = next;
    action
}

pub fn handle_mouse(state: &mut ApplicationState, mouse: MouseEvent) -> Action {
    let down = match mouse.kind {
        MouseEventKind::ScrollDown => true,
        MouseEventKind::ScrollUp => false,
        _ => return Action::None,
    };

    match &mut state.mode {
        UiMode::Normal | UiMode::Search => {
            if down {
                state.processes.select_next();
            } else {
                state.processes.select_prev();
            }
        }
        UiMode::InfoOverlay { scroll, .. } => {
            *scroll = if down {
                scroll.saturating_add(1)
            } else {
                scroll.saturating_sub(1)
            };
        }
        _ => {}
    }
    Action::None
}

fn normal_key(state: &mut ApplicationState, key: KeyEvent) -> (UiMode, Action) {
    let action = match key.code {
        KeyCode::Char('/') => {
            state.processes.clear_filter();
            return (UiMode::Search, Action::None);
        }
        KeyCode::F(9) => {
            if let Some(process) = state.processes.selected() {
                let mode = UiMode::KillConfirm {
                    pid: process.pid,
                    command: process.command.clone(),
                    focus: KillButton::Cancel,
                };
                return (mode, Action::None);
            }
            Action::None
        }
        KeyCode::Char('h') | KeyCode::Char('?') => {
            return (open_help(UiMode::Normal), Action::None);
        }
        KeyCode::Char('i') => return (open_info(UiMode::Normal), Action::None),
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('+') | KeyCode::Char('=') => {
            Action::IntervalChanged(state.adjust_interval(INTERVAL_STEP_MS as i64))
        }
        KeyCode::Char('-') | KeyCode::Char('_') => {
            Action::IntervalChanged(state.adjust_interval(-(INTERVAL_STEP_MS as i64)))
        }
        KeyCode::Char('c') => {
            state.theme = state.theme.next();
            Action::Persist
        }
        KeyCode::Char('l') => {
            state.layout = state.layout.next();
            Action::Persist
        }
        KeyCode::Char('p') => {
            let on = !state.party_mode;
            state.set_party_mode(on);
            Action::PartyToggled(on)
        }
        KeyCode::Char('r') => Action::ForceRedraw,
        KeyCode::Up | KeyCode::Char('k') => {
            state.processes.select_prev();
            Action::None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            state.processes.select_next();
            Action::None
        }
        KeyCode::Home | KeyCode::Char('g') => {
            state.processes.select_first();
            Action::None
        }
        KeyCode::End | KeyCode::Char('G') => {
            state.processes.select_last();
            Action::None
        }
        KeyCode::Left | KeyCode::Right => {
            if state.processes.shift_sort_column(key.code == KeyCode::Right) {
                Action::Persist
            } else {
                Action::None
            }
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            state.processes.toggle_reverse();
            Action::Persist
        }
        KeyCode::Esc => {
            state.processes.clear_filter();
            Action::None
        }
        _ => Action::None,
    };
    (UiMode::Normal, action)
}

fn search_key(state: &mut ApplicationState, key: KeyEvent) -> (UiMode, Action) {
    match key.code {
        KeyCode::Enter => return (UiMode::Normal, Action::None),
        KeyCode::Esc => {
            state.processes.clear_filter();
            return (UiMode::Normal, Action::None);
        }
        KeyCode::Backspace => state.processes.pop_filter_char(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.processes.push_filter_char(c)
        }
        _ => {}
    }
    (UiMode::Search, Action::None)
}

fn kill_key(pid: u32, command: String, focus: KillButton, key: KeyEvent) -> (UiMode, Action) {
    let focus = match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            return (UiMode::Normal, Action::Terminate(pid));
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            return (UiMode::Normal, Action::None);
        }
        KeyCode::Enter | KeyCode::Char(' ') => {
            let action = match focus {
                KillButton::Confirm => Action::Terminate(pid),
                KillButton::Cancel => Action::None,
            };
            return (UiMode::Normal, action);
        }
        KeyCode::Left | KeyCode::Char('h') => KillButton::Confirm,
        KeyCode::Right | KeyCode::Char('l') => KillButton::Cancel,
        _ => focus,
    };
    (
        UiMode::KillConfirm {
            pid,
            command,
            focus,
        },
        Action::None,
    )
}

fn open_help(saved: UiMode) -> UiMode {
    UiMode::HelpOverlay {
        saved: Box::new(saved),
    }
}

fn open_info(saved: UiMode) -> UiMode {
    UiMode::InfoOverlay {
        saved: Box::new(saved),
        scroll: 0,
    }
}

fn overlay_key(overlay: UiMode, key: KeyEvent) -> (UiMode, Action) {
    match overlay {
        UiMode::HelpOverlay { saved } => match key.code {
            KeyCode::Char('h') | KeyCode::Char('?') | KeyCode::Esc => (*saved, Action::None),
            KeyCode::Char('i') => match *saved {
                info @ UiMode::InfoOverlay { .. } => (info, Action::None),
                other => (open_info(open_help(other)), Action::None),
            },
            KeyCode::Char('q') => (UiMode::HelpOverlay { saved }, Action::Quit),
            _ => (UiMode::HelpOverlay { saved }, Action::None),
        },
        UiMode::InfoOverlay { saved, scroll } => match key.code {
            KeyCode::Char('i') | KeyCode::Esc => (*saved, Action::None),
            KeyCode::Char('h') | KeyCode::Char('?') => match *saved {
                help @ UiMode::HelpOverlay { .. } => (help, Action::None),
                other => (
                    open_help(UiMode::InfoOverlay {
                        saved: Box::new(other),
                        scroll,
                    }),
                    Action::None,
                ),
            },
            KeyCode::Up | KeyCode::Char('k') => (
                UiMode::InfoOverlay {
                    saved,
                    scroll: scroll.saturating_sub(1),
                },
                Action::None,
            ),
            KeyCode::Down | KeyCode::Char('j') => (
                UiMode::InfoOverlay {
                    saved,
                    scroll: scroll.saturating_add(1),
                },
                Action::None,
            ),
            KeyCode::Char('q') => (UiMode::InfoOverlay { saved, scroll }, Action::Quit),
            _ => (UiMode::InfoOverlay { saved, scroll }, Action::None),
        },
        other => (other, Action::None),
    }
}
