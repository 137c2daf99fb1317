use serde::{Deserialize, Serialize};

/// An observer that only needs a trigger key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyRule {
    pub enabled: bool,
    pub hotkey: String,
}

/// Support spell gated on available mana.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportRule {
    pub enabled: bool,
    pub hotkey: String,
    pub mana_above: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellRule {
    pub enabled: bool,
    pub hotkey: String,
    pub hp_below: f64,
    pub mana_above: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpellHealing {
    pub critical: SpellRule,
    pub light: SpellRule,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthPotionRule {
    pub enabled: bool,
    pub hotkey: String,
    pub hp_below: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManaPotionRule {
    pub enabled: bool,
    pub hotkey: String,
    pub mana_below: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PotionHealing {
    pub first_health_potion: HealthPotionRule,
    pub first_mana_potion: ManaPotionRule,
}

/// Equip a protective item when HP drops and the slot is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwapRule {
    pub enabled: bool,
    pub hotkey: String,
    pub hp_below: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboSpell {
    pub hotkey: String,
    pub min_creatures: usize,
    pub mana_above: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboSpells {
    pub enabled: bool,
    pub items: Vec<ComboSpell>,
}

/// `[healing]` section. Every threshold is a fraction in `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealingConfig {
    pub eat_food: HotkeyRule,
    pub auto_haste: SupportRule,
    pub clear_poison: SupportRule,
    pub spells: SpellHealing,
    pub potions: PotionHealing,
    pub swap_amulet: SwapRule,
    pub swap_ring: SwapRule,
    pub combo_spells: ComboSpells,
}

impl HealingConfig {
    /// Every configured threshold, labelled for validation messages.
    pub fn thresholds(&self) -> Vec<(String, f64)> {
        let mut out = vec![
            ("auto_haste.mana_above".to_string(), self.auto_haste.mana_above),
            ("clear_poison.mana_above".to_string(), self.clear_poison.mana_above),
            ("spells.critical.hp_below".to_string(), self.spells.critical.hp_below),
            ("spells.critical.mana_above".to_string(), self.spells.critical.mana_above),
            ("spells.light.hp_below".to_string(), self.spells.light.hp_below),
            ("spells.light.mana_above".to_string(), self.spells.light.mana_above),
            (
                "potions.first_health_potion.hp_below".to_string(),
                self.potions.first_health_potion.hp_below,
            ),
            (
                "potions.first_mana_potion.mana_below".to_string(),
                self.potions.first_mana_potion.mana_below,
            ),
            ("swap_amulet.hp_below".to_string(), self.swap_amulet.hp_below),
            ("swap_ring.hp_below".to_string(), self.swap_ring.hp_below),
        ];
        for (i, item) in self.combo_spells.items.iter().enumerate() {
            out.push((format!("combo_spells.items[{i}].mana_above"), item.mana_above));
        }
        out
    }
}
