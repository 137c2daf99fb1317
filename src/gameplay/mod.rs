//! Scripted decision path: task trees, resolvers and the orchestrator that
//! arbitrates between looting, combat and waypoint travel.

pub mod creatures;
pub mod orchestrator;
pub mod resolvers;
pub mod task;

pub use orchestrator::{Concern, TaskOrchestrator};
pub use resolvers::ResolveError;
pub use task::{Task, TaskKind, TaskStatus};
