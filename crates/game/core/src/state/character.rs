use arrayvec::ArrayVec;
use std::time::Duration;

use super::{CharacterId, NetworkId, Team, Vec3};
use crate::config::EngineConfig;
use crate::effects::{ApplyOutcome, EffectManager, EffectSource, TickReport};
use crate::env::SummonHandle;
use crate::skill::{AssetRef, EffectDescriptor};
use crate::stats::{CharacterStats, StatKind, StatModifiers};
use crate::transformation::TransformationController;

/// Continuous resource meter (health, mana).
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceMeter {
    pub current: f32,
    pub maximum: f32,
}

impl ResourceMeter {
    /// A full meter.
    pub fn full(maximum: f32) -> Self {
        let maximum = maximum.max(0.0);
        Self {
            current: maximum,
            maximum,
        }
    }

    pub fn new(current: f32, maximum: f32) -> Self {
        let maximum = maximum.max(0.0);
        Self {
            current: current.clamp(0.0, maximum),
            maximum,
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }

    /// Adds up to `amount`, capped at the maximum. Returns what was added.
    pub fn restore(&mut self, amount: f32) -> f32 {
        if amount <= 0.0 {
            return 0.0;
        }
        let before = self.current;
        self.current = (self.current + amount).min(self.maximum);
        self.current - before
    }

    /// Removes up to `amount`, floored at zero. Returns what was removed.
    pub fn drain(&mut self, amount: f32) -> f32 {
        if amount <= 0.0 {
            return 0.0;
        }
        let before = self.current;
        self.current = (self.current - amount).max(0.0);
        before - self.current
    }

    /// Changes the cap, clamping the current value down if needed.
    pub fn set_maximum(&mut self, maximum: f32) {
        self.maximum = maximum.max(0.0);
        self.current = self.current.min(self.maximum);
    }
}

/// What a character looks like: its model and animation controller.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisualIdentity {
    pub model: Option<AssetRef>,
    pub animator: Option<AssetRef>,
}

impl VisualIdentity {
    pub fn new(model: AssetRef) -> Self {
        Self {
            model: Some(model),
            animator: None,
        }
    }

    #[must_use]
    pub fn with_animator(mut self, animator: AssetRef) -> Self {
        self.animator = Some(animator);
        self
    }
}

/// Mutable per-character data the engine reads and writes during a cast.
#[derive(Clone, Debug, PartialEq)]
pub struct CharacterRuntimeState {
    pub id: CharacterId,
    pub network_id: Option<NetworkId>,
    pub team: Team,
    pub position: Vec3,
    /// Unit facing direction.
    pub forward: Vec3,
    pub stats: CharacterStats,
    pub modifiers: StatModifiers,
    pub health: ResourceMeter,
    pub mana: ResourceMeter,
    pub visual: VisualIdentity,
    /// Companions currently owned by this character.
    pub summons: ArrayVec<SummonHandle, { EngineConfig::MAX_SUMMONS }>,
    /// Bumped on every successful summon; stale dismissal timers compare it.
    pub summon_generation: u64,
}

impl CharacterRuntimeState {
    pub fn new(id: CharacterId, stats: CharacterStats) -> Self {
        Self {
            id,
            network_id: None,
            team: Team::NEUTRAL,
            position: Vec3::ZERO,
            forward: Vec3::FORWARD,
            health: ResourceMeter::full(stats.max_health),
            mana: ResourceMeter::full(stats.max_mana),
            stats,
            modifiers: StatModifiers::default(),
            visual: VisualIdentity::default(),
            summons: ArrayVec::new(),
            summon_generation: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        !self.health.is_depleted()
    }

    /// Base maximum health with modifiers applied (never below 1).
    pub fn max_health(&self) -> f32 {
        self.modifiers
            .apply(StatKind::MaxHealth, self.stats.max_health)
            .max(1.0)
    }

    /// Re-derives the health cap after a max-health modifier changed.
    pub fn refresh_max_health(&mut self) {
        let max = self.max_health();
        self.health.set_maximum(max);
    }

    /// Outgoing damage bonus in percent.
    pub fn damage_bonus_percent(&self) -> f32 {
        self.modifiers.apply(StatKind::DamageBonus, 0.0)
    }

    /// Incoming damage reduction in percent, clamped to `[-100, cap]`.
    pub fn damage_reduction_percent(&self, cap: f32) -> f32 {
        self.modifiers
            .apply(StatKind::DamageReduction, 0.0)
            .clamp(-100.0, cap)
    }

    pub fn move_speed(&self) -> f32 {
        self.modifiers
            .apply(StatKind::MoveSpeed, self.stats.move_speed)
            .max(0.0)
    }

    pub fn agility(&self) -> f32 {
        self.modifiers
            .apply(StatKind::Agility, self.stats.agility)
            .max(1.0)
    }

    pub fn perception(&self) -> f32 {
        self.modifiers
            .apply(StatKind::Perception, self.stats.perception)
            .max(1.0)
    }

    pub fn crit_damage_bonus(&self) -> f32 {
        self.modifiers.apply(StatKind::CritDamage, 0.0)
    }
}

/// A character: runtime state plus the two per-character controllers.
///
/// Keeping the controllers beside (not inside) the state lets callers borrow
/// the effect manager and the state it mutates at the same time.
#[derive(Clone, Debug)]
pub struct Character {
    pub state: CharacterRuntimeState,
    pub effects: EffectManager,
    pub transformation: TransformationController,
}

impl Character {
    pub fn new(id: CharacterId, stats: CharacterStats) -> Self {
        Self {
            state: CharacterRuntimeState::new(id, stats),
            effects: EffectManager::new(id),
            transformation: TransformationController::new(id),
        }
    }

    #[must_use]
    pub fn with_network_id(mut self, network_id: NetworkId) -> Self {
        self.state.network_id = Some(network_id);
        self
    }

    #[must_use]
    pub fn with_team(mut self, team: Team) -> Self {
        self.state.team = team;
        self
    }

    #[must_use]
    pub fn at(mut self, position: Vec3) -> Self {
        self.state.position = position;
        self
    }

    #[must_use]
    pub fn facing(mut self, forward: Vec3) -> Self {
        let dir = forward.normalized();
        if dir != Vec3::ZERO {
            self.state.forward = dir;
        }
        self
    }

    #[must_use]
    pub fn with_visual(mut self, visual: VisualIdentity) -> Self {
        self.state.visual = visual;
        self
    }

    pub fn id(&self) -> CharacterId {
        self.state.id
    }

    pub fn is_alive(&self) -> bool {
        self.state.is_alive()
    }

    pub fn can_move(&self) -> bool {
        self.effects.can_move()
    }

    pub fn can_attack(&self) -> bool {
        self.effects.can_attack()
    }

    pub fn can_use_skills(&self) -> bool {
        self.effects.can_use_skills()
    }

    pub fn apply_effect(
        &mut self,
        descriptor: &EffectDescriptor,
        source: &EffectSource,
    ) -> ApplyOutcome {
        self.effects
            .apply_effect(descriptor, source, &mut self.state)
    }

    pub fn tick_effects(&mut self, dt: Duration) -> TickReport {
        self.effects.tick(dt, &mut self.state)
    }

    /// Snapshot of this character's attributes for effect scaling.
    pub fn as_source(&self) -> EffectSource {
        EffectSource::from_state(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{Bonus, ModifierSource};
    use crate::transformation::TransformationId;

    #[test]
    fn meter_restore_and_drain_report_applied_amounts() {
        let mut meter = ResourceMeter::new(90.0, 100.0);
        assert_eq!(meter.restore(25.0), 10.0);
        assert_eq!(meter.drain(130.0), 100.0);
        assert!(meter.is_depleted());
        assert_eq!(meter.drain(-5.0), 0.0);
    }

    #[test]
    fn lowering_max_health_clamps_current() {
        let mut state = CharacterRuntimeState::new(CharacterId(1), CharacterStats::new(100.0, 0.0));
        let source = ModifierSource::Transformation(TransformationId(1));
        state
            .modifiers
            .insert(StatKind::MaxHealth, source, Bonus::Flat(50.0));
        state.refresh_max_health();
        state.health.restore(50.0);
        assert_eq!(state.health.current, 150.0);

        state.modifiers.remove(StatKind::MaxHealth, source);
        state.refresh_max_health();
        assert_eq!(state.health.maximum, 100.0);
        assert_eq!(state.health.current, 100.0);
    }

    #[test]
    fn damage_reduction_is_clamped() {
        let mut state = CharacterRuntimeState::new(CharacterId(1), CharacterStats::default());
        state.modifiers.insert(
            StatKind::DamageReduction,
            ModifierSource::Transformation(TransformationId(1)),
            Bonus::Flat(250.0),
        );
        assert_eq!(state.damage_reduction_percent(90.0), 90.0);
    }
}
