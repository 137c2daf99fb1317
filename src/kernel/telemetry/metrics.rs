use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

use super::event::TelemetryEvent;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub tick_stats: TickStats,
    pub concerns: BTreeMap<String, u64>,
    pub tasks_installed: BTreeMap<&'static str, u64>,
    pub observer_stats: ObserverStats,
    pub learning_stats: LearningStats,
    pub dropped_commands: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickStats {
    pub completed: u64,
    pub failed: u64,
    pub paused: u64,
    pub overruns: u64,
    pub avg_tick_ms: f64,
    pub max_tick_ms: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObserverStats {
    pub fired: BTreeMap<&'static str, u64>,
    pub failed: BTreeMap<&'static str, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LearningStats {
    pub actions: u64,
    pub total_reward: f64,
}

pub fn compute_snapshot(events: &VecDeque<TelemetryEvent>) -> TelemetrySnapshot {
    let mut snap = TelemetrySnapshot::default();
    let mut total_tick_us: u64 = 0;
    let mut max_tick_us: u64 = 0;

    for event in events {
        match event {
            TelemetryEvent::TickCompleted { elapsed_us, .. } => {
                snap.tick_stats.completed += 1;
                total_tick_us += elapsed_us;
                max_tick_us = max_tick_us.max(*elapsed_us);
            }
            TelemetryEvent::TickFailed { .. } => snap.tick_stats.failed += 1,
            TelemetryEvent::TickPaused => snap.tick_stats.paused += 1,
            TelemetryEvent::TickOverrun { .. } => snap.tick_stats.overruns += 1,
            TelemetryEvent::ConcernSelected { concern } => {
                *snap.concerns.entry(format!("{concern:?}")).or_default() += 1;
            }
            TelemetryEvent::TaskInstalled { task } => {
                *snap.tasks_installed.entry(*task).or_default() += 1;
            }
            TelemetryEvent::ObserverFired { observer } => {
                *snap.observer_stats.fired.entry(*observer).or_default() += 1;
            }
            TelemetryEvent::ObserverFailed { observer } => {
                *snap.observer_stats.failed.entry(*observer).or_default() += 1;
            }
            TelemetryEvent::ActionTaken { reward, .. } => {
                snap.learning_stats.actions += 1;
                snap.learning_stats.total_reward += reward;
            }
            TelemetryEvent::CommandsDropped { count } => snap.dropped_commands += count,
            TelemetryEvent::SessionSummary { .. } => {}
        }
    }

    if snap.tick_stats.completed > 0 {
        snap.tick_stats.avg_tick_ms = total_tick_us as f64 / snap.tick_stats.completed as f64 / 1000.0;
    }
    snap.tick_stats.max_tick_ms = max_tick_us as f64 / 1000.0;

    snap
}
