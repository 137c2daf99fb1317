use super::action::Action;
use super::observation::Observation;

/// Chooses the next action id from the latest observation.
pub trait Policy: Send {
    fn select_action(&mut self, observation: &Observation) -> u32;
}

impl<F> Policy for F
where
    F: FnMut(&Observation) -> u32 + Send,
{
    fn select_action(&mut self, observation: &Observation) -> u32 {
        self(observation)
    }
}

/// Always does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdlePolicy;

impl Policy for IdlePolicy {
    fn select_action(&mut self, _observation: &Observation) -> u32 {
        Action::DoNothing.id()
    }
}

/// Drinks below an HP threshold, otherwise attacks untargeted monsters.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdPolicy {
    pub hp_below: f32,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        Self { hp_below: 0.5 }
    }
}

impl Policy for ThresholdPolicy {
    fn select_action(&mut self, obs: &Observation) -> u32 {
        let [hp, _mana, has_target, monsters, ..] = *obs;
        let action = if hp <= self.hp_below {
            Action::HealthPotion
        } else if monsters > 0.0 && has_target == 0.0 {
            Action::AttackHotkey
        } else {
            Action::DoNothing
        };
        action.id()
    }
}
