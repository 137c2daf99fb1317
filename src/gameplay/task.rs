use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::creatures::has_creatures_to_attack;
use crate::input::Keyboard;
use crate::kernel::context::{Context, Coordinate, Creature, Direction};
use crate::kernel::time::Tick;

/// A walk that has not arrived after this many ticks gives up.
pub const WALK_TIMEOUT_TICKS: u64 = 200;

/// How long a chat tab switch may take before it is abandoned.
pub const CHAT_TAB_TIMEOUT_TICKS: u64 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tool {
    Rope,
    Shovel,
    Ladder,
}

impl Tool {
    fn hotkey<'a>(&self, ctx: &'a Context) -> &'a str {
        let hotkeys = &ctx.cave.hotkeys;
        match self {
            Tool::Rope => &hotkeys.rope,
            Tool::Shovel => &hotkeys.shovel,
            Tool::Ladder => &hotkeys.use_object,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskKind {
    FollowWaypoint { index: usize },
    LootCorpse { corpse: Creature },
    AttackClosestCreature { creature: Creature },
    Walk { destination: Coordinate },
    SingleMove { direction: Direction },
    UseTool { tool: Tool, direction: Option<Direction> },
    CollectCorpse { corpse: Creature },
    AttackTarget,
    SelectChatTab { tab: String },
}

impl TaskKind {
    pub fn name(&self) -> &'static str {
        match self {
            TaskKind::FollowWaypoint { .. } => "followWaypoint",
            TaskKind::LootCorpse { .. } => "lootCorpse",
            TaskKind::AttackClosestCreature { .. } => "attackClosestCreature",
            TaskKind::Walk { .. } => "walk",
            TaskKind::SingleMove { .. } => "singleMove",
            TaskKind::UseTool { .. } => "useTool",
            TaskKind::CollectCorpse { .. } => "collectCorpse",
            TaskKind::AttackTarget => "attackTarget",
            TaskKind::SelectChatTab { .. } => "selectChatTab",
        }
    }
}

/// One node of the intent tree. The tree has no back-pointers: whoever owns
/// the root finds the current leaf by descending into the first unfinished
/// child.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub kind: TaskKind,
    pub status: TaskStatus,
    pub children: Vec<Task>,
    pub started_at: Option<Tick>,
}

impl Task {
    pub fn new(kind: TaskKind) -> Self {
        Self::with_children(kind, Vec::new())
    }

    pub fn with_children(kind: TaskKind, children: Vec<Task>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            status: TaskStatus::Pending,
            children,
            started_at: None,
        }
    }

    /// Walk onto the corpse, then loot it.
    pub fn loot_corpse(corpse: Creature) -> Self {
        Self::with_children(
            TaskKind::LootCorpse { corpse: corpse.clone() },
            vec![
                Task::new(TaskKind::Walk {
                    destination: corpse.coordinate,
                }),
                Task::new(TaskKind::CollectCorpse { corpse }),
            ],
        )
    }

    pub fn attack_closest_creature(creature: Creature) -> Self {
        Self::with_children(
            TaskKind::AttackClosestCreature { creature },
            vec![Task::new(TaskKind::AttackTarget)],
        )
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn is_composite(&self) -> bool {
        matches!(
            self.kind,
            TaskKind::FollowWaypoint { .. } | TaskKind::LootCorpse { .. } | TaskKind::AttackClosestCreature { .. }
        )
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, TaskStatus::Completed | TaskStatus::Failed)
    }

    pub fn current_leaf(&self) -> Option<&Task> {
        if self.is_finished() {
            return None;
        }
        if self.children.is_empty() {
            return Some(self);
        }
        self.children.iter().find(|c| !c.is_finished())?.current_leaf()
    }

    pub fn current_leaf_mut(&mut self) -> Option<&mut Task> {
        if self.is_finished() {
            return None;
        }
        if self.children.is_empty() {
            return Some(self);
        }
        self.children.iter_mut().find(|c| !c.is_finished())?.current_leaf_mut()
    }

    /// Folds child outcomes upward: a failed child fails its parent, a parent
    /// completes once every child has.
    pub fn settle(&mut self) {
        if self.is_finished() || self.children.is_empty() {
            return;
        }
        for child in &mut self.children {
            child.settle();
        }
        if self.children.iter().any(|c| c.status == TaskStatus::Failed) {
            self.status = TaskStatus::Failed;
        } else if self.children.iter().all(|c| c.status == TaskStatus::Completed) {
            self.status = TaskStatus::Completed;
        } else {
            self.status = TaskStatus::Running;
        }
    }

    /// Runs one tick of a leaf. Composite kinds only settle.
    pub fn step(&mut self, ctx: &mut Context, keyboard: &mut Keyboard) -> TaskStatus {
        if self.is_finished() {
            return self.status;
        }
        let started = *self.started_at.get_or_insert(ctx.tick);
        let elapsed = ctx.tick.since(started);
        if self.is_composite() {
            if self.children.is_empty() {
                self.status = TaskStatus::Completed;
            }
            self.settle();
            return self.status;
        }
        self.status = match &self.kind {
            TaskKind::FollowWaypoint { .. }
            | TaskKind::LootCorpse { .. }
            | TaskKind::AttackClosestCreature { .. } => self.status,
            TaskKind::Walk { destination } => walk(ctx, keyboard, destination, elapsed),
            TaskKind::SingleMove { direction } => {
                keyboard.press(&[direction.arrow_key()]);
                TaskStatus::Completed
            }
            TaskKind::UseTool { tool, direction } => {
                let hotkey = tool.hotkey(ctx);
                if hotkey.is_empty() {
                    warn!(?tool, "No hotkey bound for tool");
                    TaskStatus::Failed
                } else {
                    debug!(?tool, ?direction, "Using tool");
                    keyboard.press(&[hotkey]);
                    TaskStatus::Completed
                }
            }
            TaskKind::CollectCorpse { corpse } => {
                let hotkey = ctx.cave.hotkeys.loot.clone();
                if hotkey.is_empty() {
                    warn!("No loot hotkey bound");
                    TaskStatus::Failed
                } else {
                    keyboard.press(&[hotkey]);
                    if let Some(pos) = ctx.loot.corpses_to_loot.iter().position(|c| c == corpse) {
                        ctx.loot.corpses_to_loot.remove(pos);
                    }
                    TaskStatus::Completed
                }
            }
            TaskKind::AttackTarget => attack_target(ctx, keyboard),
            TaskKind::SelectChatTab { tab } => {
                if ctx.chat.is_selected(tab) {
                    TaskStatus::Completed
                } else if elapsed >= CHAT_TAB_TIMEOUT_TICKS {
                    warn!(tab = %tab, "Chat tab never became selected");
                    TaskStatus::Failed
                } else {
                    TaskStatus::Running
                }
            }
        };
        self.status
    }
}

fn walk(ctx: &Context, keyboard: &mut Keyboard, destination: &Coordinate, elapsed: u64) -> TaskStatus {
    let Some(position) = ctx.radar.coordinate else {
        return TaskStatus::Running;
    };
    if position.z != destination.z {
        warn!(?position, ?destination, "Walk target is on another floor");
        return TaskStatus::Failed;
    }
    let Some(direction) = Direction::toward(&position, destination) else {
        return TaskStatus::Completed;
    };
    if elapsed >= WALK_TIMEOUT_TICKS {
        warn!(?position, ?destination, elapsed, "Walk timed out");
        return TaskStatus::Failed;
    }
    keyboard.press(&[direction.arrow_key()]);
    TaskStatus::Running
}

fn attack_target(ctx: &Context, keyboard: &mut Keyboard) -> TaskStatus {
    if !has_creatures_to_attack(ctx) {
        return TaskStatus::Completed;
    }
    if ctx.cave.target_creature.is_none() {
        let hotkey = &ctx.cave.hotkeys.attack;
        if hotkey.is_empty() {
            warn!("No attack hotkey bound");
            return TaskStatus::Failed;
        }
        keyboard.press(&[hotkey.as_str()]);
    }
    TaskStatus::Running
}
