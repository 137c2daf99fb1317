use serde::Serialize;
use tracing::{info, warn};

use super::creatures::{closest_creature, has_creatures_to_attack};
use super::resolvers::{
    resolve_cavebot_tasks, resolve_current_waypoint, should_ask_for_cavebot_tasks, ResolveError,
};
use super::task::{Task, TaskKind, TaskStatus};
use crate::input::Keyboard;
use crate::kernel::context::{Context, Way};

/// Who owned the tick after the priority rules ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Concern {
    /// Position unknown, nothing decided.
    Deferred,
    /// A chat tab switch is in flight.
    ChatTab,
    LootCorpses,
    Cave,
    Waypoint,
    Idle,
}

impl From<Way> for Concern {
    fn from(way: Way) -> Self {
        match way {
            Way::LootCorpses => Concern::LootCorpses,
            Way::Cave => Concern::Cave,
            Way::Waypoint => Concern::Waypoint,
        }
    }
}

/// Holds at most one task tree. Priority: loot over combat over waypoints.
#[derive(Debug, Default)]
pub struct TaskOrchestrator {
    root: Option<Task>,
    installed: Vec<&'static str>,
}

impl TaskOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root_task(&self) -> Option<&Task> {
        self.root.as_ref()
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.root.as_ref()?.current_leaf()
    }

    /// Replaces the whole tree. `None` clears it.
    pub fn set_root_task(&mut self, ctx: &Context, task: Option<Task>) {
        if let Some(task) = &task {
            info!(task = task.name(), id = %task.id, tick = ctx.tick.frame, "Root task installed");
            self.installed.push(task.name());
        }
        self.root = task;
    }

    /// Names of trees installed since the last drain.
    pub fn drain_installed(&mut self) -> Vec<&'static str> {
        std::mem::take(&mut self.installed)
    }

    fn root_is(&self, pred: impl Fn(&TaskKind) -> bool) -> bool {
        self.current_task().is_some() && self.root.as_ref().is_some_and(|r| pred(&r.kind))
    }

    /// One pass of the priority rules.
    pub fn handle_gameplay_tasks(&mut self, ctx: &mut Context) -> Result<Concern, ResolveError> {
        let Some(position) = ctx.radar.coordinate else {
            return Ok(Concern::Deferred);
        };
        ctx.cave.closest_creature = closest_creature(&ctx.game_window.monsters, &position);

        if self.current_task().is_some_and(|t| matches!(t.kind, TaskKind::SelectChatTab { .. })) {
            return Ok(Concern::ChatTab);
        }

        let decided = self.decide(ctx);
        ctx.game_window.previous_monsters = ctx.game_window.monsters.clone();
        decided
    }

    fn decide(&mut self, ctx: &mut Context) -> Result<Concern, ResolveError> {
        let hunting = ctx.cave.is_hunting();

        if hunting && !ctx.loot.corpses_to_loot.is_empty() {
            ctx.way = Some(Way::LootCorpses);
            if self.root_is(|k| !matches!(k, TaskKind::LootCorpse { .. })) {
                self.set_root_task(ctx, None);
            }
            if self.current_task().is_none() {
                let corpse = ctx.loot.corpses_to_loot[0].clone();
                self.set_root_task(ctx, Some(Task::loot_corpse(corpse)));
            }
            return Ok(Concern::LootCorpses);
        }

        if hunting {
            let attackable = has_creatures_to_attack(ctx);
            let way = if attackable && ctx.cave.closest_creature.is_some() {
                Way::Cave
            } else {
                Way::Waypoint
            };
            ctx.way = Some(way);

            if attackable && should_ask_for_cavebot_tasks(ctx) {
                let attacking = self.root_is(|k| matches!(k, TaskKind::AttackClosestCreature { .. }));
                if !attacking {
                    let task = resolve_cavebot_tasks(ctx)?;
                    self.set_root_task(ctx, Some(task));
                    ctx.cave.last_tasks_request = Some(ctx.tick);
                }
            } else if way == Way::Waypoint && self.current_task().is_none() {
                let task = resolve_current_waypoint(ctx)?;
                self.set_root_task(ctx, Some(task));
            }
            return Ok(way.into());
        }

        if ctx.cave.enabled {
            if self.current_task().is_none() && ctx.cave.waypoints.current_index.is_some() {
                let task = resolve_current_waypoint(ctx)?;
                self.set_root_task(ctx, Some(task));
            }
            return Ok(Concern::Waypoint);
        }

        Ok(Concern::Idle)
    }

    /// Steps the current leaf and retires a finished tree. A completed
    /// waypoint tree moves the route forward; a failed loot tree drops its
    /// corpse from the queue.
    pub fn run_current(&mut self, ctx: &mut Context, keyboard: &mut Keyboard) -> Option<TaskStatus> {
        let root = self.root.as_mut()?;
        if let Some(leaf) = root.current_leaf_mut() {
            leaf.step(ctx, keyboard);
        }
        root.settle();
        let status = root.status;
        match status {
            TaskStatus::Completed => {
                if matches!(root.kind, TaskKind::FollowWaypoint { .. }) {
                    ctx.cave.waypoints.advance();
                }
                self.root = None;
            }
            TaskStatus::Failed => {
                warn!(task = root.name(), id = %root.id, "Task tree failed, discarding");
                if let TaskKind::LootCorpse { corpse } = &root.kind {
                    // Skipped for good, otherwise the same tree comes back next tick.
                    ctx.loot.corpses_to_loot.retain(|c| c != corpse);
                }
                self.root = None;
            }
            TaskStatus::Pending | TaskStatus::Running => {}
        }
        Some(status)
    }
}
