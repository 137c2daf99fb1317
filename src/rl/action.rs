use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::input::Keyboard;
use crate::kernel::context::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("unknown action id {0}")]
    Unknown(u32),
}

/// The discrete action table. Ids are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    DoNothing = 0,
    ArrowUp = 1,
    ArrowDown = 2,
    ArrowLeft = 3,
    ArrowRight = 4,
    AttackHotkey = 5,
    HealthPotion = 6,
    ManaPotion = 7,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::DoNothing,
        Action::ArrowUp,
        Action::ArrowDown,
        Action::ArrowLeft,
        Action::ArrowRight,
        Action::AttackHotkey,
        Action::HealthPotion,
        Action::ManaPotion,
    ];

    /// Size of the discrete action space.
    pub const COUNT: u32 = Self::ALL.len() as u32;

    pub fn id(&self) -> u32 {
        *self as u32
    }
}

impl TryFrom<u32> for Action {
    type Error = ActionError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Action::ALL
            .get(id as usize)
            .copied()
            .ok_or(ActionError::Unknown(id))
    }
}

fn press_bound(keyboard: &mut Keyboard, action: Action, hotkey: &str) {
    if hotkey.trim().is_empty() {
        warn!(?action, "No hotkey bound for action, doing nothing");
        return;
    }
    keyboard.press(&[hotkey]);
}

/// Maps an action onto the keyboard. Potion keys come from the healing config.
pub fn execute_action(action: Action, ctx: &Context, keyboard: &mut Keyboard) {
    match action {
        Action::DoNothing => {}
        Action::ArrowUp => keyboard.press(&["up"]),
        Action::ArrowDown => keyboard.press(&["down"]),
        Action::ArrowLeft => keyboard.press(&["left"]),
        Action::ArrowRight => keyboard.press(&["right"]),
        Action::AttackHotkey => press_bound(keyboard, action, &ctx.cave.hotkeys.attack),
        Action::HealthPotion => {
            press_bound(keyboard, action, &ctx.healing.potions.first_health_potion.hotkey)
        }
        Action::ManaPotion => press_bound(keyboard, action, &ctx.healing.potions.first_mana_potion.hotkey),
    }
}
