use crossterm::event::{Event, KeyEvent, KeyEventKind, MouseEvent};

/// Input the monitor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// New terminal size in columns and rows.
    Resize(u16, u16),
}

impl InputEvent {
    /// Keep key presses, mouse and resize events; drop everything else.
    pub fn from_crossterm(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Some(InputEvent::Key(key)),
            Event::Mouse(mouse) => Some(InputEvent::Mouse(mouse)),
            Event::Resize(cols, rows) => Some(InputEvent::Resize(cols, rows)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers};

    #[test]
    fn test_release_events_dropped() {
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(InputEvent::from_crossterm(Event::Key(release)), None);

        let press = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        assert_eq!(
            InputEvent::from_crossterm(Event::Key(press)),
            Some(InputEvent::Key(press))
        );
        assert_eq!(
            InputEvent::from_crossterm(Event::Resize(80, 24)),
            Some(InputEvent::Resize(80, 24))
        );
        assert_eq!(InputEvent::from_crossterm(Event::FocusGained), None);
    }
}
