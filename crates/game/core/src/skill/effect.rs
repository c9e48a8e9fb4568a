//! Status effect catalogue and authored effect descriptors.
//!
//! Classification predicates are `const fn` matches so capability queries on
//! [`crate::effects::EffectManager`] never scan instances.

use crate::state::secs;
use crate::stats::{Bonus, StatKind};
use std::time::Duration;

/// Every status effect the engine understands.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum StatusEffectKind {
    // ========================================================================
    // Stat buffs and debuffs
    // ========================================================================
    AttackUp,
    AttackDown,
    DefenseUp,
    DefenseDown,
    SpeedUp,
    SpeedDown,
    PerceptionUp,
    /// Collapses perception to its floor.
    PerceptionDown,
    AgilityUp,
    AgilityDown,
    CritDamageUp,
    Shield,

    // ========================================================================
    // Periodic
    // ========================================================================
    HealthRegen,
    ManaRegen,
    HealOverTime,
    Poison,
    Burn,
    Bleed,
    DamageOverTime,

    // ========================================================================
    // Crowd control
    // ========================================================================
    Stun,
    Root,
    /// Breaks when the holder takes damage (when authored to).
    Sleep,
    Silence,
    Fear,
    Taunt,

    // ========================================================================
    // Special
    // ========================================================================
    /// Blocks incoming damage and new debuffs.
    Invulnerability,
    Invisibility,
    Lifesteal,
    Thorns,
    SummonMinion,
}

impl StatusEffectKind {
    pub const fn is_crowd_control(self) -> bool {
        matches!(
            self,
            Self::Stun | Self::Root | Self::Sleep | Self::Silence | Self::Fear | Self::Taunt
        )
    }

    pub const fn is_damage_over_time(self) -> bool {
        matches!(
            self,
            Self::Poison | Self::Burn | Self::Bleed | Self::DamageOverTime
        )
    }

    pub const fn is_heal_over_time(self) -> bool {
        matches!(self, Self::HealthRegen | Self::HealOverTime)
    }

    /// Fires on a fixed interval while active.
    pub const fn is_periodic(self) -> bool {
        self.is_damage_over_time() || self.is_heal_over_time() || matches!(self, Self::ManaRegen)
    }

    pub const fn is_buff(self) -> bool {
        matches!(
            self,
            Self::AttackUp
                | Self::DefenseUp
                | Self::SpeedUp
                | Self::PerceptionUp
                | Self::AgilityUp
                | Self::CritDamageUp
                | Self::Shield
                | Self::HealthRegen
                | Self::ManaRegen
                | Self::HealOverTime
                | Self::Invulnerability
                | Self::Invisibility
                | Self::Lifesteal
                | Self::Thorns
        )
    }

    pub const fn is_debuff(self) -> bool {
        matches!(
            self,
            Self::AttackDown
                | Self::DefenseDown
                | Self::SpeedDown
                | Self::PerceptionDown
                | Self::AgilityDown
        ) || self.is_damage_over_time()
            || self.is_crowd_control()
    }

    pub const fn blocks_movement(self) -> bool {
        matches!(self, Self::Stun | Self::Root | Self::Sleep | Self::Fear)
    }

    pub const fn blocks_attacks(self) -> bool {
        matches!(self, Self::Stun | Self::Sleep | Self::Fear)
    }

    pub const fn blocks_skills(self) -> bool {
        matches!(self, Self::Stun | Self::Sleep | Self::Silence | Self::Fear)
    }

    /// Stat contribution of an instance with the given magnitude.
    pub fn stat_modifier(self, magnitude: f32) -> Option<(StatKind, Bonus)> {
        let modifier = match self {
            Self::AttackUp => (StatKind::DamageBonus, Bonus::Flat(magnitude)),
            Self::AttackDown => (StatKind::DamageBonus, Bonus::Flat(-magnitude)),
            Self::DefenseUp | Self::Shield => (StatKind::DamageReduction, Bonus::Flat(magnitude)),
            Self::DefenseDown => (StatKind::DamageReduction, Bonus::Flat(-magnitude)),
            Self::SpeedUp => (StatKind::MoveSpeed, Bonus::Increased(magnitude)),
            Self::SpeedDown => (StatKind::MoveSpeed, Bonus::Less(magnitude)),
            Self::PerceptionUp => (StatKind::Perception, Bonus::Flat(magnitude)),
            Self::PerceptionDown => (StatKind::Perception, Bonus::Less(100.0)),
            Self::AgilityUp => (StatKind::Agility, Bonus::Flat(magnitude)),
            Self::AgilityDown => (StatKind::Agility, Bonus::Flat(-magnitude)),
            Self::CritDamageUp => (StatKind::CritDamage, Bonus::Flat(magnitude)),
            _ => return None,
        };
        Some(modifier)
    }
}

/// Authored parameters of one status effect a skill applies.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectDescriptor {
    pub kind: StatusEffectKind,
    /// Seconds.
    pub duration: f32,
    /// Stat magnitude per stack.
    pub power: f32,
    /// Base amount per periodic tick.
    pub per_tick: f32,
    /// Seconds between periodic ticks.
    pub tick_interval: f32,
    pub strength_scaling: f32,
    pub intelligence_scaling: f32,
    pub dispellable: bool,
    pub stackable: bool,
    pub max_stacks: u8,
    pub break_on_damage: bool,
    /// Whether an application is broadcast to peers.
    pub replicate: bool,
}

impl EffectDescriptor {
    pub fn new(kind: StatusEffectKind, duration: f32, power: f32) -> Self {
        Self {
            kind,
            duration,
            power,
            per_tick: 0.0,
            tick_interval: 1.0,
            strength_scaling: 0.0,
            intelligence_scaling: 0.0,
            dispellable: true,
            stackable: false,
            max_stacks: 1,
            break_on_damage: matches!(kind, StatusEffectKind::Sleep),
            replicate: true,
        }
    }

    #[must_use]
    pub fn stackable(mut self, max_stacks: u8) -> Self {
        self.stackable = true;
        self.max_stacks = max_stacks.max(1);
        self
    }

    #[must_use]
    pub fn periodic(mut self, per_tick: f32, tick_interval: f32) -> Self {
        self.per_tick = per_tick;
        self.tick_interval = tick_interval;
        self
    }

    #[must_use]
    pub fn with_scaling(mut self, strength: f32, intelligence: f32) -> Self {
        self.strength_scaling = strength;
        self.intelligence_scaling = intelligence;
        self
    }

    #[must_use]
    pub fn undispellable(mut self) -> Self {
        self.dispellable = false;
        self
    }

    #[must_use]
    pub fn breaks_on_damage(mut self, value: bool) -> Self {
        self.break_on_damage = value;
        self
    }

    #[must_use]
    pub fn local_only(mut self) -> Self {
        self.replicate = false;
        self
    }

    pub fn duration(&self) -> Duration {
        secs(self.duration)
    }

    pub fn tick_interval(&self) -> Duration {
        secs(self.tick_interval)
    }
}
