//! Pure mappings from context to task trees.

use thiserror::Error;

use super::task::{Task, TaskKind, Tool};
use crate::kernel::context::{Context, Direction, Way, Waypoint};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unknown waypoint type {kind:?}")]
    UnknownWaypointType { kind: String },

    #[error("waypoint type {kind:?} needs a direction")]
    MissingDirection { kind: String },

    #[error("no waypoint selected")]
    NoWaypointSelected,

    #[error("waypoint index {index} out of range ({len} waypoints)")]
    WaypointOutOfRange { index: usize, len: usize },

    #[error("no closest creature to attack")]
    NoClosestCreature,
}

fn required_direction(waypoint: &Waypoint) -> Result<Direction, ResolveError> {
    waypoint.direction.ok_or_else(|| ResolveError::MissingDirection {
        kind: waypoint.kind.clone(),
    })
}

/// Turns one route entry into a `followWaypoint` tree.
pub fn resolve_tasks_by_waypoint(index: usize, waypoint: &Waypoint) -> Result<Task, ResolveError> {
    let walk = || {
        Task::new(TaskKind::Walk {
            destination: waypoint.coordinate,
        })
    };
    let use_tool = |tool| {
        Task::new(TaskKind::UseTool {
            tool,
            direction: waypoint.direction,
        })
    };
    let children = match waypoint.kind.as_str() {
        "walk" => vec![walk()],
        "singleMove" => vec![Task::new(TaskKind::SingleMove {
            direction: required_direction(waypoint)?,
        })],
        "moveUp" | "moveDown" => vec![
            walk(),
            Task::new(TaskKind::SingleMove {
                direction: required_direction(waypoint)?,
            }),
        ],
        "useRope" => vec![walk(), use_tool(Tool::Rope)],
        "useShovel" => vec![walk(), use_tool(Tool::Shovel)],
        "useLadder" => vec![walk(), use_tool(Tool::Ladder)],
        other => {
            return Err(ResolveError::UnknownWaypointType {
                kind: other.to_string(),
            })
        }
    };
    Ok(Task::with_children(TaskKind::FollowWaypoint { index }, children))
}

pub fn resolve_current_waypoint(ctx: &Context) -> Result<Task, ResolveError> {
    let waypoints = &ctx.cave.waypoints;
    let index = waypoints.current_index.ok_or(ResolveError::NoWaypointSelected)?;
    let waypoint = waypoints.items.get(index).ok_or(ResolveError::WaypointOutOfRange {
        index,
        len: waypoints.items.len(),
    })?;
    resolve_tasks_by_waypoint(index, waypoint)
}

/// Gate on fresh combat trees: only while the cave owns the tick, and at most
/// once per debounce window.
pub fn should_ask_for_cavebot_tasks(ctx: &Context) -> bool {
    if ctx.way != Some(Way::Cave) {
        return false;
    }
    match ctx.cave.last_tasks_request {
        None => true,
        Some(last) => ctx.tick.since(last) >= ctx.cave.task_request_debounce_ticks,
    }
}

pub fn resolve_cavebot_tasks(ctx: &Context) -> Result<Task, ResolveError> {
    let creature = ctx
        .cave
        .closest_creature
        .clone()
        .ok_or(ResolveError::NoClosestCreature)?;
    Ok(Task::attack_closest_creature(creature))
}
