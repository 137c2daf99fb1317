use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Operator input, drained at the top of every loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlCommand {
    Pause,
    Resume,
    /// Flips cave mode on or off.
    ToggleCave,
    Shutdown,
}

impl FromStr for ControlCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pause" => Ok(ControlCommand::Pause),
            "resume" => Ok(ControlCommand::Resume),
            "cave" => Ok(ControlCommand::ToggleCave),
            "quit" | "exit" => Ok(ControlCommand::Shutdown),
            other => Err(format!("unknown command {other:?}")),
        }
    }
}
