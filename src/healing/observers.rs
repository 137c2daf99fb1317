use super::{Observer, ObserverError};
use crate::input::KeyAction;
use crate::kernel::context::Context;

fn press(observer: &'static str, hotkey: &str) -> Result<Option<KeyAction>, ObserverError> {
    if hotkey.trim().is_empty() {
        return Err(ObserverError::MissingHotkey { observer });
    }
    Ok(Some(KeyAction::press(hotkey)))
}

fn at_or_below(reading: Option<f64>, threshold: f64) -> bool {
    reading.is_some_and(|v| v <= threshold)
}

fn at_or_above(reading: Option<f64>, threshold: f64) -> bool {
    reading.is_some_and(|v| v >= threshold)
}

pub struct EatFood;

impl Observer for EatFood {
    fn name(&self) -> &'static str {
        "eat_food"
    }

    fn observe(&self, ctx: &Context) -> Result<Option<KeyAction>, ObserverError> {
        let rule = &ctx.healing.eat_food;
        if !rule.enabled || !ctx.conditions.hungry {
            return Ok(None);
        }
        press(self.name(), &rule.hotkey)
    }
}

pub struct AutoHaste;

impl Observer for AutoHaste {
    fn name(&self) -> &'static str {
        "auto_haste"
    }

    fn observe(&self, ctx: &Context) -> Result<Option<KeyAction>, ObserverError> {
        let rule = &ctx.healing.auto_haste;
        let holds = rule.enabled
            && !ctx.conditions.hasted
            && !ctx.conditions.in_protection_zone
            && !ctx.cooldowns.support
            && at_or_above(ctx.status_bar.mana_percentage, rule.mana_above);
        if !holds {
            return Ok(None);
        }
        press(self.name(), &rule.hotkey)
    }
}

pub struct ClearPoison;

impl Observer for ClearPoison {
    fn name(&self) -> &'static str {
        "clear_poison"
    }

    fn observe(&self, ctx: &Context) -> Result<Option<KeyAction>, ObserverError> {
        let rule = &ctx.healing.clear_poison;
        let holds = rule.enabled
            && ctx.conditions.poisoned
            && !ctx.cooldowns.support
            && at_or_above(ctx.status_bar.mana_percentage, rule.mana_above);
        if !holds {
            return Ok(None);
        }
        press(self.name(), &rule.hotkey)
    }
}

/// Critical rule wins over the light one when both hold.
pub struct HealingBySpells;

impl Observer for HealingBySpells {
    fn name(&self) -> &'static str {
        "healing_by_spells"
    }

    fn observe(&self, ctx: &Context) -> Result<Option<KeyAction>, ObserverError> {
        if ctx.cooldowns.healing {
            return Ok(None);
        }
        let spells = &ctx.healing.spells;
        for rule in [&spells.critical, &spells.light] {
            let holds = rule.enabled
                && at_or_below(ctx.status_bar.hp_percentage, rule.hp_below)
                && at_or_above(ctx.status_bar.mana_percentage, rule.mana_above);
            if holds {
                return press(self.name(), &rule.hotkey);
            }
        }
        Ok(None)
    }
}

pub struct HealingByPotions;

impl Observer for HealingByPotions {
    fn name(&self) -> &'static str {
        "healing_by_potions"
    }

    fn observe(&self, ctx: &Context) -> Result<Option<KeyAction>, ObserverError> {
        let rule = &ctx.healing.potions.first_health_potion;
        if !rule.enabled || !at_or_below(ctx.status_bar.hp_percentage, rule.hp_below) {
            return Ok(None);
        }
        press(self.name(), &rule.hotkey)
    }
}

pub struct HealingByMana;

impl Observer for HealingByMana {
    fn name(&self) -> &'static str {
        "healing_by_mana"
    }

    fn observe(&self, ctx: &Context) -> Result<Option<KeyAction>, ObserverError> {
        let rule = &ctx.healing.potions.first_mana_potion;
        if !rule.enabled || !at_or_below(ctx.status_bar.mana_percentage, rule.mana_below) {
            return Ok(None);
        }
        press(self.name(), &rule.hotkey)
    }
}

pub struct SwapAmulet;

impl Observer for SwapAmulet {
    fn name(&self) -> &'static str {
        "swap_amulet"
    }

    fn observe(&self, ctx: &Context) -> Result<Option<KeyAction>, ObserverError> {
        let rule = &ctx.healing.swap_amulet;
        if !rule.enabled || ctx.equipment.amulet || !at_or_below(ctx.status_bar.hp_percentage, rule.hp_below) {
            return Ok(None);
        }
        press(self.name(), &rule.hotkey)
    }
}

pub struct SwapRing;

impl Observer for SwapRing {
    fn name(&self) -> &'static str {
        "swap_ring"
    }

    fn observe(&self, ctx: &Context) -> Result<Option<KeyAction>, ObserverError> {
        let rule = &ctx.healing.swap_ring;
        if !rule.enabled || ctx.equipment.ring || !at_or_below(ctx.status_bar.hp_percentage, rule.hp_below) {
            return Ok(None);
        }
        press(self.name(), &rule.hotkey)
    }
}

/// First combo whose creature count and mana requirements hold.
pub struct ComboSpells;

impl Observer for ComboSpells {
    fn name(&self) -> &'static str {
        "combo_spells"
    }

    fn observe(&self, ctx: &Context) -> Result<Option<KeyAction>, ObserverError> {
        let combos = &ctx.healing.combo_spells;
        if !combos.enabled || !ctx.cave.is_attacking_some_creature || ctx.cooldowns.attack {
            return Ok(None);
        }
        let monsters = ctx.game_window.monsters.len();
        let chosen = combos.items.iter().find(|item| {
            item.min_creatures <= monsters && at_or_above(ctx.status_bar.mana_percentage, item.mana_above)
        });
        match chosen {
            Some(item) => press(self.name(), &item.hotkey),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::healing::settings::{ComboSpell, SpellRule};
    use crate::kernel::context::{Coordinate, Creature};

    fn ctx(hp: f64, mana: f64) -> Context {
        let mut ctx = Context::new();
        ctx.status_bar.hp_percentage = Some(hp);
        ctx.status_bar.mana_percentage = Some(mana);
        ctx
    }

    #[test]
    fn critical_spell_beats_light() {
        let mut c = ctx(0.2, 0.9);
        c.healing.spells.critical = SpellRule {
            enabled: true,
            hotkey: "f2".into(),
            hp_below: 0.3,
            mana_above: 0.1,
        };
        c.healing.spells.light = SpellRule {
            enabled: true,
            hotkey: "f3".into(),
            hp_below: 0.8,
            mana_above: 0.1,
        };
        assert_eq!(HealingBySpells.observe(&c).unwrap(), Some(KeyAction::press("f2")));

        c.status_bar.hp_percentage = Some(0.5);
        assert_eq!(HealingBySpells.observe(&c).unwrap(), Some(KeyAction::press("f3")));

        c.cooldowns.healing = true;
        assert_eq!(HealingBySpells.observe(&c).unwrap(), None);
    }

    #[test]
    fn missing_reading_never_triggers() {
        let mut c = Context::new();
        c.healing.potions.first_health_potion.enabled = true;
        c.healing.potions.first_health_potion.hotkey = "f1".into();
        c.healing.potions.first_health_potion.hp_below = 1.0;
        assert_eq!(HealingByPotions.observe(&c).unwrap(), None);
    }

    #[test]
    fn enabled_without_hotkey_is_an_error() {
        let mut c = ctx(0.9, 0.9);
        c.conditions.hungry = true;
        c.healing.eat_food.enabled = true;
        assert!(matches!(
            EatFood.observe(&c),
            Err(ObserverError::MissingHotkey { observer: "eat_food" })
        ));
    }

    #[test]
    fn swap_ring_only_when_slot_empty() {
        let mut c = ctx(0.3, 0.5);
        c.healing.swap_ring.enabled = true;
        c.healing.swap_ring.hotkey = "f9".into();
        c.healing.swap_ring.hp_below = 0.4;
        assert!(SwapRing.observe(&c).unwrap().is_some());
        c.equipment.ring = true;
        assert!(SwapRing.observe(&c).unwrap().is_none());
    }

    #[test]
    fn combo_picks_first_matching_item() {
        let mut c = ctx(1.0, 0.5);
        c.cave.is_attacking_some_creature = true;
        c.game_window.monsters = vec![
            Creature::new("Rotworm", Coordinate::new(1, 1, 7)),
            Creature::new("Rotworm", Coordinate::new(2, 1, 7)),
        ];
        c.healing.combo_spells.enabled = true;
        c.healing.combo_spells.items = vec![
            ComboSpell {
                hotkey: "f10".into(),
                min_creatures: 3,
                mana_above: 0.1,
            },
            ComboSpell {
                hotkey: "f11".into(),
                min_creatures: 1,
                mana_above: 0.4,
            },
        ];
        assert_eq!(ComboSpells.observe(&c).unwrap(), Some(KeyAction::press("f11")));
    }

    #[test]
    fn haste_blocked_in_protection_zone() {
        let mut c = ctx(1.0, 0.9);
        c.healing.auto_haste.enabled = true;
        c.healing.auto_haste.hotkey = "f6".into();
        c.healing.auto_haste.mana_above = 0.2;
        assert!(AutoHaste.observe(&c).unwrap().is_some());
        c.conditions.in_protection_zone = true;
        assert!(AutoHaste.observe(&c).unwrap().is_none());
    }
}
