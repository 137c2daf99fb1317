use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::kernel::context::Context;

pub const OBSERVATION_LEN: usize = 8;

/// Feature order: hp, mana, has_target, monster_count, being_attacked, x, y, z.
pub type Observation = [f32; OBSERVATION_LEN];

pub const FEATURE_NAMES: [&str; OBSERVATION_LEN] = [
    "hp_percentage",
    "mana_percentage",
    "has_target",
    "monster_count",
    "being_attacked",
    "pos_x",
    "pos_y",
    "pos_z",
];

/// Box bounds for the observation vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservationSpace {
    pub low: Observation,
    pub high: Observation,
}

impl Default for ObservationSpace {
    fn default() -> Self {
        Self {
            low: [0.0, 0.0, 0.0, 0.0, 0.0, -1.0, -1.0, -1.0],
            high: [1.0, 1.0, 1.0, 50.0, 1.0, 30000.0, 30000.0, 15.0],
        }
    }
}

impl ObservationSpace {
    pub fn contains(&self, obs: &Observation) -> bool {
        self.out_of_bounds(obs).is_empty()
    }

    /// Indices of features outside `[low, high]`.
    pub fn out_of_bounds(&self, obs: &Observation) -> Vec<usize> {
        (0..OBSERVATION_LEN)
            .filter(|&i| !(self.low[i]..=self.high[i]).contains(&obs[i]))
            .collect()
    }

    /// Logs a warning per offending feature and returns their indices.
    pub fn check(&self, obs: &Observation) -> Vec<usize> {
        let bad = self.out_of_bounds(obs);
        for &i in &bad {
            warn!(
                feature = FEATURE_NAMES[i],
                value = obs[i],
                low = self.low[i],
                high = self.high[i],
                "Observation outside declared bounds"
            );
        }
        bad
    }
}

pub fn extract_observation(ctx: &Context) -> Observation {
    let (x, y, z) = match ctx.radar.coordinate {
        Some(c) => (c.x as f32, c.y as f32, c.z as f32),
        None => (-1.0, -1.0, -1.0),
    };
    [
        ctx.hp_percentage() as f32,
        ctx.mana_percentage() as f32,
        if ctx.cave.target_creature.is_some() { 1.0 } else { 0.0 },
        ctx.game_window.monsters.len() as f32,
        if ctx.battle_list.being_attacked_creature_category.is_some() { 1.0 } else { 0.0 },
        x,
        y,
        z,
    ]
}
