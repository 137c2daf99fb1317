use serde::Serialize;

use crate::gameplay::Concern;
use crate::kernel::time::Tick;
use crate::rl::Action;

// Only ids, names, counts and durations. No frames or pixel data.

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TelemetryEvent {
    TickCompleted {
        tick: Tick,
        elapsed_us: u64,
    },

    TickFailed {
        tick: Tick,
        reason: String,
    },

    TickPaused,

    TickOverrun {
        tick: Tick,
        elapsed_us: u64,
        budget_us: u64,
    },

    ConcernSelected {
        concern: Concern,
    },

    TaskInstalled {
        task: &'static str,
    },

    ObserverFired {
        observer: &'static str,
    },

    ObserverFailed {
        observer: &'static str,
    },

    ActionTaken {
        action: Action,
        reward: f64,
    },

    CommandsDropped {
        count: u64,
    },

    SessionSummary {
        ticks: u64,
        failed_ticks: u64,
        avg_tick_ms: f64,
        dropped_commands: u64,
    },
}
