//! Ordered stages that rebuild the context every tick.

pub mod pipeline;
pub mod stages;

pub use pipeline::{PerceptionPipeline, PipelineRun, Slot, Stage, StageError};
pub use stages::{FnStage, Passthrough, TargetCreatureStage, WaypointIndexStage};
