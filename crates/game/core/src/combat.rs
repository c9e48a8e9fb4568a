//! Damage and healing arithmetic.
//!
//! These functions only touch health and effects of the character they are
//! given. Death consequences that reach beyond the character (cancelling
//! continuations, dismissing companions) are handled by the engine's
//! [`crate::engine::World`].

use tracing::trace;

use crate::config::EngineConfig;
use crate::skill::Scaling;
use crate::state::{Character, CharacterRuntimeState};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DamageOutcome {
    Dealt { amount: f32, killed: bool },
    /// Invulnerable targets take nothing.
    Immune,
    TargetDead,
}

impl DamageOutcome {
    pub fn amount(self) -> f32 {
        match self {
            Self::Dealt { amount, .. } => amount,
            Self::Immune | Self::TargetDead => 0.0,
        }
    }

    pub fn is_lethal(self) -> bool {
        matches!(self, Self::Dealt { killed: true, .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HealOutcome {
    Healed(f32),
    TargetDead,
}

impl HealOutcome {
    pub fn amount(self) -> f32 {
        match self {
            Self::Healed(amount) => amount,
            Self::TargetDead => 0.0,
        }
    }
}

/// Damage a caster deals with `scaling`, including its damage bonus.
pub fn outgoing_damage(caster: &CharacterRuntimeState, scaling: &Scaling) -> f32 {
    let base = scaling.evaluate(&caster.stats);
    (base * (1.0 + caster.damage_bonus_percent() / 100.0)).max(0.0)
}

/// Heal amount for `recipient`. A negative authored base is a percentage of
/// the recipient's maximum health.
pub fn heal_amount(
    caster: &CharacterRuntimeState,
    scaling: &Scaling,
    recipient: &CharacterRuntimeState,
) -> f32 {
    if scaling.base < 0.0 {
        recipient.max_health() * (-scaling.base) / 100.0
    } else {
        scaling.evaluate(&caster.stats)
    }
}

/// Applies `raw` damage after damage reduction.
///
/// Invulnerability short-circuits before anything changes. Any damage taken
/// breaks effects authored to end on damage.
pub fn apply_damage(target: &mut Character, raw: f32, config: &EngineConfig) -> DamageOutcome {
    if !target.is_alive() {
        return DamageOutcome::TargetDead;
    }
    if target.effects.has_invulnerability() {
        trace!(target = %target.id(), raw, "damage absorbed by invulnerability");
        return DamageOutcome::Immune;
    }

    let reduction = target
        .state
        .damage_reduction_percent(config.max_damage_reduction);
    let amount = target.state.health.drain(raw * (1.0 - reduction / 100.0));
    if amount > 0.0 {
        target.effects.break_on_damage(&mut target.state);
    }

    DamageOutcome::Dealt {
        amount,
        killed: target.state.health.is_depleted(),
    }
}

/// Restores up to `amount` health, capped at the maximum.
pub fn apply_heal(target: &mut Character, amount: f32) -> HealOutcome {
    if !target.is_alive() {
        return HealOutcome::TargetDead;
    }
    HealOutcome::Healed(target.state.health.restore(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectSource;
    use crate::skill::{EffectDescriptor, StatusEffectKind};
    use crate::state::CharacterId;
    use crate::stats::CharacterStats;

    fn character(hp: f32) -> Character {
        Character::new(CharacterId(1), CharacterStats::new(hp, 0.0))
    }

    #[test]
    fn reduction_scales_incoming_damage() {
        let mut target = character(100.0);
        target.apply_effect(
            &EffectDescriptor::new(StatusEffectKind::DefenseUp, 10.0, 50.0),
            &EffectSource::default(),
        );
        let outcome = apply_damage(&mut target, 40.0, &EngineConfig::default());
        assert_eq!(outcome, DamageOutcome::Dealt { amount: 20.0, killed: false });
    }

    #[test]
    fn invulnerable_target_is_untouched() {
        let mut target = character(30.0);
        target.apply_effect(
            &EffectDescriptor::new(StatusEffectKind::Invulnerability, 5.0, 0.0),
            &EffectSource::default(),
        );
        assert_eq!(
            apply_damage(&mut target, 1_000.0, &EngineConfig::default()),
            DamageOutcome::Immune
        );
        assert_eq!(target.state.health.current, 30.0);
    }

    #[test]
    fn damage_wakes_sleepers() {
        let mut target = character(100.0);
        target.apply_effect(
            &EffectDescriptor::new(StatusEffectKind::Sleep, 10.0, 0.0),
            &EffectSource::default(),
        );
        assert!(!target.can_move());
        apply_damage(&mut target, 1.0, &EngineConfig::default());
        assert!(target.can_move());
    }

    #[test]
    fn lethal_damage_reports_kill() {
        let mut target = character(10.0);
        let outcome = apply_damage(&mut target, 25.0, &EngineConfig::default());
        assert_eq!(outcome, DamageOutcome::Dealt { amount: 10.0, killed: true });
        assert_eq!(apply_heal(&mut target, 5.0), HealOutcome::TargetDead);
    }

    #[test]
    fn negative_heal_base_is_percent_of_recipient() {
        let caster = CharacterRuntimeState::new(CharacterId(1), CharacterStats::default());
        let recipient = CharacterRuntimeState::new(CharacterId(2), CharacterStats::new(400.0, 0.0));
        assert_eq!(heal_amount(&caster, &Scaling::flat(-25.0), &recipient), 100.0);
    }

    #[test]
    fn damage_bonus_multiplies_outgoing() {
        let mut caster = character(100.0);
        caster.state.stats.strength = 10.0;
        caster.apply_effect(
            &EffectDescriptor::new(StatusEffectKind::AttackUp, 10.0, 50.0),
            &EffectSource::default(),
        );
        let scaling = Scaling {
            base: 10.0,
            strength: 1.0,
            intelligence: 0.0,
        };
        assert_eq!(outgoing_damage(&caster.state, &scaling), 30.0);
    }
}
