use std::time::Duration;

use crate::skill::{EffectDescriptor, SkillId, StatusEffectKind};
use crate::state::{CharacterId, CharacterRuntimeState};

/// Identifier of one effect instance, unique per owning character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectId(pub u64);

/// Who applied an effect, with the attributes periodic ticks scale from.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct EffectSource {
    pub caster: Option<CharacterId>,
    pub skill: Option<SkillId>,
    pub strength: f32,
    pub intelligence: f32,
}

impl EffectSource {
    pub fn from_state(state: &CharacterRuntimeState) -> Self {
        Self {
            caster: Some(state.id),
            skill: None,
            strength: state.stats.strength,
            intelligence: state.stats.intelligence,
        }
    }

    #[must_use]
    pub fn with_skill(mut self, skill: SkillId) -> Self {
        self.skill = Some(skill);
        self
    }
}

/// A live status effect.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusEffect {
    pub id: EffectId,
    pub kind: StatusEffectKind,
    /// Current stat magnitude (power times stacks).
    pub magnitude: f32,
    pub stacks: u8,
    pub remaining: Duration,
    pub duration: Duration,
    pub dispellable: bool,
    pub break_on_damage: bool,
    pub source: EffectSource,
    tick_interval: Duration,
    until_tick: Duration,
    tick_amount: f32,
}

impl StatusEffect {
    pub(super) fn from_descriptor(
        id: EffectId,
        descriptor: &EffectDescriptor,
        source: &EffectSource,
    ) -> Self {
        let duration = descriptor.duration();
        let tick_interval = if descriptor.kind.is_periodic() {
            descriptor.tick_interval()
        } else {
            Duration::ZERO
        };
        let tick_amount = (descriptor.per_tick
            + source.strength * descriptor.strength_scaling
            + source.intelligence * descriptor.intelligence_scaling)
            .max(0.0);

        Self {
            id,
            kind: descriptor.kind,
            magnitude: descriptor.power,
            stacks: 1,
            remaining: duration,
            duration,
            dispellable: descriptor.dispellable,
            break_on_damage: descriptor.break_on_damage,
            source: *source,
            tick_interval,
            until_tick: tick_interval,
            tick_amount,
        }
    }

    pub(super) fn remote(
        id: EffectId,
        kind: StatusEffectKind,
        magnitude: f32,
        duration: Duration,
    ) -> Self {
        Self {
            id,
            kind,
            magnitude,
            stacks: 1,
            remaining: duration,
            duration,
            dispellable: true,
            break_on_damage: matches!(kind, StatusEffectKind::Sleep),
            source: EffectSource::default(),
            tick_interval: Duration::ZERO,
            until_tick: Duration::ZERO,
            tick_amount: 0.0,
        }
    }

    /// Amount each periodic tick delivers.
    pub fn tick_amount(&self) -> f32 {
        self.tick_amount
    }

    /// Consumes `step` of the tick timer and returns the amounts of the ticks
    /// that fell due inside it.
    pub(super) fn advance_periodic(&mut self, step: Duration) -> Vec<f32> {
        let mut fired = Vec::new();
        if self.tick_interval.is_zero() || self.tick_amount <= 0.0 {
            return fired;
        }
        let mut left = step;
        while left >= self.until_tick {
            left -= self.until_tick;
            self.until_tick = self.tick_interval;
            fired.push(self.tick_amount);
        }
        self.until_tick -= left;
        fired
    }
}
