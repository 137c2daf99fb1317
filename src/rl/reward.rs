use serde::{Deserialize, Serialize};

use super::action::Action;
use crate::kernel::context::Context;

pub const HP_WEIGHT: f64 = 100.0;
pub const KILL_BONUS: f64 = 50.0;
pub const IDLE_PENALTY: f64 = -0.5;
pub const ACTION_BONUS: f64 = 0.1;
pub const DEATH_PENALTY: f64 = -500.0;

/// Terms of one reward, kept apart for inspection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardComponents {
    pub hp: f64,
    pub kill: f64,
    pub action: f64,
    pub death: f64,
}

impl RewardComponents {
    pub fn total(&self) -> f64 {
        self.hp + self.kill + self.action + self.death
    }
}

/// Depends only on the two snapshots and the action.
///
/// The kill term fires whenever an engaged target disappears, including when
/// the player simply walked away from it.
pub fn reward_components(previous: &Context, current: &Context, action: Action) -> RewardComponents {
    let prev_hp = previous.hp_percentage();
    let curr_hp = current.hp_percentage();

    let was_engaged = previous.cave.target_creature.is_some() && previous.cave.is_attacking_some_creature;
    let now_idle = current.cave.target_creature.is_none() && !current.cave.is_attacking_some_creature;

    RewardComponents {
        hp: (curr_hp - prev_hp) * HP_WEIGHT,
        kill: if was_engaged && now_idle { KILL_BONUS } else { 0.0 },
        action: if action == Action::DoNothing {
            IDLE_PENALTY
        } else {
            ACTION_BONUS
        },
        death: if curr_hp == 0.0 && prev_hp > 0.0 {
            DEATH_PENALTY
        } else {
            0.0
        },
    }
}

pub fn calculate_reward(previous: &Context, current: &Context, action: Action) -> f64 {
    reward_components(previous, current, action).total()
}
