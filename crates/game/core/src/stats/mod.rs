//! Character attributes and the modifier layers stacked on top of them.
//!
//! Base attributes are authored per character and never change during a
//! session. Everything temporary (status effects, transformations) goes
//! through [`StatModifiers`], one keyed [`BonusStack`] per [`StatKind`].
pub mod bonus;

pub use bonus::{Bonus, BonusStack, ModifierSource};

/// Authored base attributes of a character.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterStats {
    pub strength: f32,
    pub intelligence: f32,
    pub agility: f32,
    pub perception: f32,
    pub max_health: f32,
    pub max_mana: f32,
    pub move_speed: f32,
}

impl CharacterStats {
    pub fn new(max_health: f32, max_mana: f32) -> Self {
        Self {
            strength: 0.0,
            intelligence: 0.0,
            agility: 1.0,
            perception: 1.0,
            max_health,
            max_mana,
            move_speed: 5.0,
        }
    }

    #[must_use]
    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    #[must_use]
    pub fn with_intelligence(mut self, intelligence: f32) -> Self {
        self.intelligence = intelligence;
        self
    }
}

impl Default for CharacterStats {
    fn default() -> Self {
        Self::new(100.0, 100.0)
    }
}

/// Stats that temporary modifiers can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum StatKind {
    MaxHealth,
    /// Outgoing damage bonus, in percent.
    DamageBonus,
    /// Incoming damage reduction, in percent.
    DamageReduction,
    MoveSpeed,
    Agility,
    Perception,
    CritDamage,
}

/// One keyed bonus stack per modifiable stat.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatModifiers {
    max_health: BonusStack,
    damage_bonus: BonusStack,
    damage_reduction: BonusStack,
    move_speed: BonusStack,
    agility: BonusStack,
    perception: BonusStack,
    crit_damage: BonusStack,
}

impl StatModifiers {
    pub fn stack(&self, kind: StatKind) -> &BonusStack {
        match kind {
            StatKind::MaxHealth => &self.max_health,
            StatKind::DamageBonus => &self.damage_bonus,
            StatKind::DamageReduction => &self.damage_reduction,
            StatKind::MoveSpeed => &self.move_speed,
            StatKind::Agility => &self.agility,
            StatKind::Perception => &self.perception,
            StatKind::CritDamage => &self.crit_damage,
        }
    }

    fn stack_mut(&mut self, kind: StatKind) -> &mut BonusStack {
        match kind {
            StatKind::MaxHealth => &mut self.max_health,
            StatKind::DamageBonus => &mut self.damage_bonus,
            StatKind::DamageReduction => &mut self.damage_reduction,
            StatKind::MoveSpeed => &mut self.move_speed,
            StatKind::Agility => &mut self.agility,
            StatKind::Perception => &mut self.perception,
            StatKind::CritDamage => &mut self.crit_damage,
        }
    }

    pub fn insert(&mut self, kind: StatKind, source: ModifierSource, bonus: Bonus) {
        self.stack_mut(kind).insert(source, bonus);
    }

    pub fn remove(&mut self, kind: StatKind, source: ModifierSource) -> Option<Bonus> {
        self.stack_mut(kind).remove(source)
    }

    /// Removes every contribution of `source` across all stats.
    pub fn remove_source(&mut self, source: ModifierSource) {
        use strum::IntoEnumIterator;
        for kind in StatKind::iter() {
            self.stack_mut(kind).remove(source);
        }
    }

    pub fn apply(&self, kind: StatKind, base: f32) -> f32 {
        self.stack(kind).apply(base)
    }

    pub fn is_empty(&self) -> bool {
        use strum::IntoEnumIterator;
        StatKind::iter().all(|kind| self.stack(kind).is_empty())
    }
}
