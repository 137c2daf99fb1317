use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::AgentConfig;
use crate::healing::settings::HealingConfig;
use crate::kernel::time::Tick;

/// Absolute map position reported by the radar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coordinate {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Squared distance on the horizontal plane. The floor is ignored.
    pub fn planar_distance_sq(&self, other: &Coordinate) -> i64 {
        let dx = self.x as i64 - other.x as i64;
        let dy = self.y as i64 - other.y as i64;
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// Arrow key that walks one tile in this direction.
    pub fn arrow_key(&self) -> &'static str {
        match self {
            Direction::North => "up",
            Direction::South => "down",
            Direction::East => "right",
            Direction::West => "left",
        }
    }

    /// Dominant-axis step from `from` toward `to`. `None` when both share a tile.
    pub fn toward(from: &Coordinate, to: &Coordinate) -> Option<Direction> {
        let dx = to.x as i64 - from.x as i64;
        let dy = to.y as i64 - from.y as i64;
        if dx == 0 && dy == 0 {
            return None;
        }
        if dx.abs() >= dy.abs() {
            Some(if dx > 0 { Direction::East } else { Direction::West })
        } else {
            Some(if dy > 0 { Direction::South } else { Direction::North })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    pub name: String,
    pub coordinate: Coordinate,
    #[serde(default)]
    pub is_being_attacked: bool,
}

impl Creature {
    pub fn new(name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            name: name.into(),
            coordinate,
            is_being_attacked: false,
        }
    }
}

/// One entry of the cave route. `kind` stays a raw string so that unknown
/// types reach the resolver and fail loudly there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinate: Coordinate,
    #[serde(default)]
    pub direction: Option<Direction>,
}

impl Waypoint {
    pub fn new(kind: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            kind: kind.into(),
            coordinate,
            direction: None,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Waypoints {
    pub items: Vec<Waypoint>,
    pub current_index: Option<usize>,
}

impl Waypoints {
    pub fn current(&self) -> Option<&Waypoint> {
        self.current_index.and_then(|i| self.items.get(i))
    }

    /// Moves to the following waypoint, wrapping at the end of the route.
    pub fn advance(&mut self) {
        if self.items.is_empty() {
            self.current_index = None;
            return;
        }
        let next = self.current_index.map(|i| (i + 1) % self.items.len()).unwrap_or(0);
        self.current_index = Some(next);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaveHotkeys {
    pub attack: String,
    pub loot: String,
    pub rope: String,
    pub shovel: String,
    pub use_object: String,
}

impl Default for CaveHotkeys {
    fn default() -> Self {
        Self {
            attack: "space".to_string(),
            loot: String::new(),
            rope: String::new(),
            shovel: String::new(),
            use_object: String::new(),
        }
    }
}

/// Which concern owns the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Way {
    LootCorpses,
    Cave,
    Waypoint,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PauseFlags {
    /// Suspends perception and the whole tick body.
    pub gameplay: bool,
    /// Set by the overlay; only cleared here on environment reset.
    pub ui: bool,
}

/// Raw grayscale frame handed from the capture collaborator to later stages.
#[derive(Debug, Clone, PartialEq)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub pixels: Arc<[u8]>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RadarState {
    pub coordinate: Option<Coordinate>,
    pub previous_coordinate: Option<Coordinate>,
    pub last_coordinate_visited: Option<Coordinate>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatTab {
    pub name: String,
    pub is_selected: bool,
    pub has_unread: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatState {
    pub tabs: Vec<ChatTab>,
}

impl ChatState {
    pub fn is_selected(&self, name: &str) -> bool {
        self.tabs.iter().any(|t| t.name == name && t.is_selected)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BattleListEntry {
    pub name: String,
    pub is_being_attacked: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BattleListState {
    pub creatures: Vec<BattleListEntry>,
    pub being_attacked_creature_category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameWindowState {
    pub monsters: Vec<Creature>,
    pub previous_monsters: Vec<Creature>,
    pub players: Vec<Creature>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaveState {
    pub enabled: bool,
    pub run_to_creatures: bool,
    pub closest_creature: Option<Creature>,
    pub target_creature: Option<Creature>,
    pub is_attacking_some_creature: bool,
    pub waypoints: Waypoints,
    /// Tick of the last installed combat task tree, for request debouncing.
    pub last_tasks_request: Option<Tick>,
    pub task_request_debounce_ticks: u64,
    pub ignored_creatures: Vec<String>,
    pub hotkeys: CaveHotkeys,
}

impl CaveState {
    pub fn is_hunting(&self) -> bool {
        self.enabled && self.run_to_creatures
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LootState {
    pub corpses_to_loot: Vec<Creature>,
}

/// HP and mana bars, as fractions in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatusBar {
    pub hp_percentage: Option<f64>,
    pub mana_percentage: Option<f64>,
}

/// Condition icons from the stats bar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Conditions {
    pub poisoned: bool,
    pub hungry: bool,
    pub hasted: bool,
    pub in_protection_zone: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cooldowns {
    pub attack: bool,
    pub healing: bool,
    pub support: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Equipment {
    pub amulet: bool,
    pub ring: bool,
}

/// The single owned state record rebuilt each tick.
///
/// Stages run strictly in sequence against `&mut Context`; nothing keeps a
/// reference across ticks. Anything that needs "previous vs current" takes an
/// explicit [`Context::snapshot`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    pub tick: Tick,
    /// Bumped once per applied perception stage.
    pub version: u64,
    pub pause: PauseFlags,
    pub screenshot: Option<Screenshot>,
    pub radar: RadarState,
    pub chat: ChatState,
    pub battle_list: BattleListState,
    pub game_window: GameWindowState,
    pub direction: Option<Direction>,
    pub cave: CaveState,
    pub loot: LootState,
    pub status_bar: StatusBar,
    pub conditions: Conditions,
    pub cooldowns: Cooldowns,
    pub equipment: Equipment,
    pub healing: HealingConfig,
    pub way: Option<Way>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AgentConfig) -> Self {
        let mut ctx = Self::default();
        ctx.cave.enabled = config.cave.enabled;
        ctx.cave.run_to_creatures = config.cave.run_to_creatures;
        ctx.cave.ignored_creatures = config.cave.ignored_creatures.clone();
        ctx.cave.task_request_debounce_ticks = config.cave.task_request_debounce_ticks;
        ctx.cave.hotkeys = config.cave.hotkeys.clone();
        ctx.cave.waypoints.items = config.cave.waypoints.clone();
        ctx.healing = config.healing.clone();
        ctx
    }

    /// Immutable copy handed across a "previous vs current" boundary.
    pub fn snapshot(&self) -> Context {
        self.clone()
    }

    pub fn hp_percentage(&self) -> f64 {
        self.status_bar.hp_percentage.unwrap_or(0.0)
    }

    pub fn mana_percentage(&self) -> f64 {
        self.status_bar.mana_percentage.unwrap_or(0.0)
    }
}
