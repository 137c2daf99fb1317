use serde::{Deserialize, Serialize};
use std::fmt;

use super::keys::KeyCode;

/// Key transition carried by a wire command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transition {
    /// Down then up, timed by the firmware.
    Press,
    Down,
    Up,
}

impl Transition {
    pub fn verb(&self) -> &'static str {
        match self {
            Transition::Press => "press",
            Transition::Down => "keyDown",
            Transition::Up => "keyUp",
        }
    }
}

/// A logical key resolved to its code. Timing is not part of the identity:
/// hold durations and inter-command waits belong to the keyboard operation
/// that emits it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCommand {
    pub key: String,
    pub transition: Transition,
    pub code: KeyCode,
}

/// One line of the device protocol: `<verb>,<code>` or `write,<text>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceCommand {
    Key(KeyCommand),
    Write(String),
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceCommand::Key(cmd) => write!(f, "{},{}", cmd.transition.verb(), cmd.code),
            DeviceCommand::Write(text) => write!(f, "write,{}", text),
        }
    }
}

/// High-level intent emitted by observers and tasks, executed by the keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyAction {
    /// Sequential presses, one per key.
    Press(Vec<String>),
    /// Chord: all down, one wait, all up.
    Hotkey(Vec<String>),
    Write(String),
}

impl KeyAction {
    pub fn press(key: impl Into<String>) -> Self {
        KeyAction::Press(vec![key.into()])
    }
}
