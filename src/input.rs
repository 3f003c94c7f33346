use crossterm::event::{poll, read, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::time::Duration;
use tracing::{debug, warn};

use crate::signal::Signal;

/// what the player asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Activate(Signal),
    Play,
    Abandon,
    Quit,
}

/// number row for the pads in board order, or the colour's initial
const PAD_KEYMAP: [(char, Signal); 8] = [
    ('1', Signal::Green),
    ('g', Signal::Green),
    ('2', Signal::Red),
    ('r', Signal::Red),
    ('3', Signal::Yellow),
    ('y', Signal::Yellow),
    ('4', Signal::Blue),
    ('b', Signal::Blue),
];

/// reads player actions
pub trait Input {
    /// wait up to `timeout` for the next action
    fn poll_action(&mut self, timeout: Duration) -> Result<Option<Action>, io::Error>;
}

/// turn a key into an action, if it means anything
pub fn map_key(keymap: &HashMap<char, Signal>, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Action::Quit),
        KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char(' ') | KeyCode::Enter => Some(Action::Play),
        KeyCode::Char('x') => Some(Action::Abandon),
        KeyCode::Char(c) => keymap
            .get(&c.to_ascii_lowercase())
            .map(|s| Action::Activate(*s)),
        _ => None,
    }
}

/// simple implementation of Input, using the keyboard in raw mode
pub struct KeyboardInput {
    keymap: HashMap<char, Signal>,
}

impl KeyboardInput {
    pub fn new() -> Result<Self, io::Error> {
        terminal::enable_raw_mode()?;
        Ok(KeyboardInput {
            keymap: HashMap::from(PAD_KEYMAP),
        })
    }
}

impl Drop for KeyboardInput {
    fn drop(&mut self) {
        if let Err(e) = terminal::disable_raw_mode() {
            warn!(error = %e, "could not leave raw mode");
        }
    }
}

impl Input for KeyboardInput {
    fn poll_action(&mut self, timeout: Duration) -> Result<Option<Action>, io::Error> {
        if !poll(timeout)? {
            return Ok(None);
        }
        match read()? {
            Event::Key(key) => {
                let action = map_key(&self.keymap, key);
                if action.is_none() {
                    debug!(?key, "unmapped key");
                }
                Ok(action)
            }
            // resizes get picked up on the next draw
            _ => Ok(None),
        }
    }
}

/// dummy Input implementation for testing; says Quit once the script runs out
pub struct DummyInput {
    actions: VecDeque<Action>,
}

impl DummyInput {
    pub fn new(actions: &[Action]) -> Self {
        DummyInput {
            actions: actions.iter().copied().collect(),
        }
    }
}

impl Input for DummyInput {
    fn poll_action(&mut self, _timeout: Duration) -> Result<Option<Action>, io::Error> {
        Ok(Some(self.actions.pop_front().unwrap_or(Action::Quit)))
    }
}
