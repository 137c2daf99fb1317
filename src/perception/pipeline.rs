use thiserror::Error;
use tracing::{debug, trace};

use super::stages::{Passthrough, TargetCreatureStage, WaypointIndexStage};
use crate::kernel::context::Context;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageError {
    #[error("stage {stage} failed: {reason}")]
    Failed { stage: &'static str, reason: String },

    #[error("stage {stage} needs {missing}, which an earlier stage did not provide")]
    MissingInput {
        stage: &'static str,
        missing: &'static str,
    },
}

impl StageError {
    pub fn failed(stage: &'static str, reason: impl Into<String>) -> Self {
        StageError::Failed {
            stage,
            reason: reason.into(),
        }
    }

    pub fn stage(&self) -> &'static str {
        match self {
            StageError::Failed { stage, .. } | StageError::MissingInput { stage, .. } => stage,
        }
    }
}

/// One perception step. Reads what earlier stages wrote and writes its own
/// section of the context.
///
/// Report failures through [`StageError`]. A panic is not caught and stops
/// the process.
pub trait Stage: Send {
    fn name(&self) -> &'static str;

    fn apply(&mut self, ctx: &mut Context) -> Result<(), StageError>;
}

/// Fixed positions in the pipeline. Declaration order is execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    Screenshot,
    Radar,
    ChatTabs,
    BattleList,
    GameWindow,
    Direction,
    GameWindowCreatures,
    /// Runs instead of `TargetCreature` while hunting.
    HandleLoot,
    TargetCreature,
    WaypointIndex,
    PlayerStatus,
    StatsBar,
    CleanUpTasks,
}

impl Slot {
    pub const ORDER: [Slot; 13] = [
        Slot::Screenshot,
        Slot::Radar,
        Slot::ChatTabs,
        Slot::BattleList,
        Slot::GameWindow,
        Slot::Direction,
        Slot::GameWindowCreatures,
        Slot::HandleLoot,
        Slot::TargetCreature,
        Slot::WaypointIndex,
        Slot::PlayerStatus,
        Slot::StatsBar,
        Slot::CleanUpTasks,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Slot::Screenshot => "screenshot",
            Slot::Radar => "radar",
            Slot::ChatTabs => "chat_tabs",
            Slot::BattleList => "battle_list",
            Slot::GameWindow => "game_window",
            Slot::Direction => "direction",
            Slot::GameWindowCreatures => "game_window_creatures",
            Slot::HandleLoot => "handle_loot",
            Slot::TargetCreature => "target_creature",
            Slot::WaypointIndex => "waypoint_index",
            Slot::PlayerStatus => "player_status",
            Slot::StatsBar => "stats_bar",
            Slot::CleanUpTasks => "clean_up_tasks",
        }
    }
}

/// Stages that actually ran in one pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PipelineRun {
    pub applied: Vec<&'static str>,
    pub skipped_paused: bool,
}

pub struct PerceptionPipeline {
    stages: Vec<(Slot, Box<dyn Stage>)>,
}

impl PerceptionPipeline {
    /// Every collaborator slot starts as a pass-through.
    pub fn new() -> Self {
        let stages = Slot::ORDER
            .iter()
            .map(|slot| {
                let stage: Box<dyn Stage> = match slot {
                    Slot::TargetCreature => Box::new(TargetCreatureStage),
                    Slot::WaypointIndex => Box::new(WaypointIndexStage),
                    other => Box::new(Passthrough::new(other.label())),
                };
                (*slot, stage)
            })
            .collect();
        Self { stages }
    }

    pub fn with_stage(mut self, slot: Slot, stage: impl Stage + 'static) -> Self {
        self.set_stage(slot, Box::new(stage));
        self
    }

    pub fn set_stage(&mut self, slot: Slot, stage: Box<dyn Stage>) {
        if let Some(entry) = self.stages.iter_mut().find(|(s, _)| *s == slot) {
            entry.1 = stage;
        }
    }

    /// Runs one pass. A pause at entry leaves the context untouched. The first
    /// failing stage ends the pass; what earlier stages wrote is kept.
    pub fn run(&mut self, ctx: &mut Context) -> Result<PipelineRun, StageError> {
        let mut run = PipelineRun::default();
        if ctx.pause.gameplay {
            trace!("Perception skipped, paused");
            run.skipped_paused = true;
            return Ok(run);
        }
        for (slot, stage) in self.stages.iter_mut() {
            let hunting = ctx.cave.is_hunting();
            match slot {
                Slot::HandleLoot if !hunting => continue,
                Slot::TargetCreature if hunting => continue,
                _ => {}
            }
            stage.apply(ctx)?;
            ctx.version += 1;
            run.applied.push(stage.name());
        }
        debug!(version = ctx.version, stages = run.applied.len(), "Perception pass complete");
        Ok(run)
    }
}

impl Default for PerceptionPipeline {
    fn default() -> Self {
        Self::new()
    }
}
