//! Timed status effects attached to one character.
//!
//! The [`EffectManager`] holds at most one instance per [`StatusEffectKind`].
//! Re-applying a kind either refreshes the existing instance or, for
//! stackable kinds, adds a stack up to the authored cap. Stat-affecting
//! kinds install a modifier keyed by the instance's [`EffectId`], so removal
//! restores exactly the contribution that instance made.
//!
//! Capability queries (`can_move`, `can_use_skills`, ...) are answered from
//! per-capability counters maintained on insert and remove.
mod instance;

pub use instance::{EffectId, EffectSource, StatusEffect};

use std::collections::HashMap;
use std::time::Duration;

use tracing::trace;

use crate::config::EngineConfig;
use crate::skill::{EffectDescriptor, StatusEffectKind};
use crate::state::{CharacterId, CharacterRuntimeState};
use crate::stats::ModifierSource;

/// Result of applying an effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// A new instance was created.
    Applied(EffectId),
    /// An existing instance had its duration reset.
    Refreshed(EffectId),
    /// An existing stackable instance gained a stack (or sat at its cap).
    Stacked { id: EffectId, stacks: u8 },
    /// Rejected: debuffs cannot land on an invulnerable character.
    Blocked,
}

impl ApplyOutcome {
    pub fn is_applied(self) -> bool {
        !matches!(self, Self::Blocked)
    }

    pub fn id(self) -> Option<EffectId> {
        match self {
            Self::Applied(id) | Self::Refreshed(id) | Self::Stacked { id, .. } => Some(id),
            Self::Blocked => None,
        }
    }
}

/// One firing of a periodic effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeriodicTick {
    pub kind: StatusEffectKind,
    pub amount: f32,
    pub caster: Option<CharacterId>,
}

/// What happened during one [`EffectManager::tick`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub expired: Vec<StatusEffectKind>,
    pub periodic: Vec<PeriodicTick>,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.expired.is_empty() && self.periodic.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Blockers {
    movement: u8,
    attacks: u8,
    skills: u8,
    crowd_control: u8,
}

impl Blockers {
    fn track(&mut self, kind: StatusEffectKind, added: bool) {
        let bump = |counter: &mut u8, applies: bool| {
            if applies {
                *counter = if added {
                    counter.saturating_add(1)
                } else {
                    counter.saturating_sub(1)
                };
            }
        };
        bump(&mut self.movement, kind.blocks_movement());
        bump(&mut self.attacks, kind.blocks_attacks());
        bump(&mut self.skills, kind.blocks_skills());
        bump(&mut self.crowd_control, kind.is_crowd_control());
    }
}

/// Active status effects of one character.
#[derive(Clone, Debug)]
pub struct EffectManager {
    owner: CharacterId,
    active: HashMap<StatusEffectKind, StatusEffect>,
    blockers: Blockers,
    next_id: u64,
}

impl EffectManager {
    pub fn new(owner: CharacterId) -> Self {
        Self {
            owner,
            active: HashMap::new(),
            blockers: Blockers::default(),
            next_id: 0,
        }
    }

    // ========================================================================
    // Application
    // ========================================================================

    /// Applies an authored effect, scaled by the caster's attributes.
    pub fn apply_effect(
        &mut self,
        descriptor: &EffectDescriptor,
        source: &EffectSource,
        state: &mut CharacterRuntimeState,
    ) -> ApplyOutcome {
        let kind = descriptor.kind;
        if kind.is_debuff() && self.has_invulnerability() {
            trace!(owner = %self.owner, effect = %kind, "debuff blocked by invulnerability");
            return ApplyOutcome::Blocked;
        }

        let duration = descriptor.duration();
        if let Some(existing) = self.active.get_mut(&kind) {
            existing.remaining = duration;
            existing.duration = duration;
            let id = existing.id;
            if !descriptor.stackable {
                return ApplyOutcome::Refreshed(id);
            }

            let cap = descriptor
                .max_stacks
                .clamp(1, EngineConfig::MAX_EFFECT_STACKS);
            if existing.stacks < cap {
                existing.stacks += 1;
                existing.magnitude = descriptor.power * f32::from(existing.stacks);
                let (magnitude, stacks) = (existing.magnitude, existing.stacks);
                install_modifier(state, kind, id, magnitude);
                return ApplyOutcome::Stacked { id, stacks };
            }
            return ApplyOutcome::Stacked {
                id,
                stacks: existing.stacks,
            };
        }

        let id = self.allocate_id();
        let effect = StatusEffect::from_descriptor(id, descriptor, source);
        self.insert(effect, state);
        ApplyOutcome::Applied(id)
    }

    /// Installs an effect replicated from a peer.
    ///
    /// Remote instances carry no caster attributes, so they never produce
    /// periodic ticks; the peer owning the target reports health changes.
    pub fn apply_remote(
        &mut self,
        kind: StatusEffectKind,
        magnitude: f32,
        duration: Duration,
        state: &mut CharacterRuntimeState,
    ) -> ApplyOutcome {
        if let Some(existing) = self.active.get_mut(&kind) {
            existing.remaining = duration;
            existing.duration = duration;
            existing.magnitude = magnitude;
            let id = existing.id;
            install_modifier(state, kind, id, magnitude);
            return ApplyOutcome::Refreshed(id);
        }

        let id = self.allocate_id();
        self.insert(StatusEffect::remote(id, kind, magnitude, duration), state);
        ApplyOutcome::Applied(id)
    }

    // ========================================================================
    // Time
    // ========================================================================

    /// Advances every effect by `dt`, firing periodic ticks and expiring
    /// effects whose remaining duration reaches zero.
    pub fn tick(&mut self, dt: Duration, state: &mut CharacterRuntimeState) -> TickReport {
        let mut report = TickReport::default();
        for kind in self.sorted_kinds() {
            let Some(effect) = self.active.get_mut(&kind) else {
                continue;
            };
            let step = dt.min(effect.remaining);
            for amount in effect.advance_periodic(step) {
                report.periodic.push(PeriodicTick {
                    kind,
                    amount,
                    caster: effect.source.caster,
                });
            }
            effect.remaining -= step;
            if effect.remaining.is_zero() {
                self.remove(kind, state);
                report.expired.push(kind);
            }
        }
        report
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Removes one kind unconditionally, reverting its stat modifier.
    pub fn remove(
        &mut self,
        kind: StatusEffectKind,
        state: &mut CharacterRuntimeState,
    ) -> Option<StatusEffect> {
        let effect = self.active.remove(&kind)?;
        state.modifiers.remove_source(ModifierSource::Effect(effect.id));
        self.blockers.track(kind, false);
        Some(effect)
    }

    /// Removes every dispellable effect. Returns the removed kinds.
    pub fn dispel_all(&mut self, state: &mut CharacterRuntimeState) -> Vec<StatusEffectKind> {
        let targets: Vec<_> = self
            .sorted_kinds()
            .into_iter()
            .filter(|kind| self.active.get(kind).is_some_and(|e| e.dispellable))
            .collect();
        for kind in &targets {
            self.remove(*kind, state);
        }
        targets
    }

    /// Removes `kind` if present and dispellable.
    pub fn dispel_kind(
        &mut self,
        kind: StatusEffectKind,
        state: &mut CharacterRuntimeState,
    ) -> bool {
        let dispellable = self.active.get(&kind).is_some_and(|e| e.dispellable);
        dispellable && self.remove(kind, state).is_some()
    }

    /// Removes effects that end when their holder takes damage.
    pub fn break_on_damage(&mut self, state: &mut CharacterRuntimeState) -> Vec<StatusEffectKind> {
        let targets: Vec<_> = self
            .sorted_kinds()
            .into_iter()
            .filter(|kind| self.active.get(kind).is_some_and(|e| e.break_on_damage))
            .collect();
        for kind in &targets {
            self.remove(*kind, state);
        }
        targets
    }

    /// Removes everything, dispellable or not.
    pub fn clear(&mut self, state: &mut CharacterRuntimeState) -> usize {
        let kinds = self.sorted_kinds();
        for kind in &kinds {
            self.remove(*kind, state);
        }
        kinds.len()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn owner(&self) -> CharacterId {
        self.owner
    }

    pub fn get(&self, kind: StatusEffectKind) -> Option<&StatusEffect> {
        self.active.get(&kind)
    }

    pub fn has(&self, kind: StatusEffectKind) -> bool {
        self.active.contains_key(&kind)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Active effects in kind order.
    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        let mut effects: Vec<_> = self.active.values().collect();
        effects.sort_by_key(|e| e.kind);
        effects.into_iter()
    }

    pub fn has_invulnerability(&self) -> bool {
        self.has(StatusEffectKind::Invulnerability)
    }

    pub fn has_invisibility(&self) -> bool {
        self.has(StatusEffectKind::Invisibility)
    }

    pub fn can_move(&self) -> bool {
        self.blockers.movement == 0
    }

    pub fn can_attack(&self) -> bool {
        self.blockers.attacks == 0
    }

    pub fn can_use_skills(&self) -> bool {
        self.blockers.skills == 0
    }

    pub fn is_under_crowd_control(&self) -> bool {
        self.blockers.crowd_control > 0
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn allocate_id(&mut self) -> EffectId {
        self.next_id += 1;
        EffectId(self.next_id)
    }

    fn insert(&mut self, effect: StatusEffect, state: &mut CharacterRuntimeState) {
        install_modifier(state, effect.kind, effect.id, effect.magnitude);
        self.blockers.track(effect.kind, true);
        self.active.insert(effect.kind, effect);
    }

    fn sorted_kinds(&self) -> Vec<StatusEffectKind> {
        let mut kinds: Vec<_> = self.active.keys().copied().collect();
        kinds.sort();
        kinds
    }
}

fn install_modifier(
    state: &mut CharacterRuntimeState,
    kind: StatusEffectKind,
    id: EffectId,
    magnitude: f32,
) {
    if let Some((stat, bonus)) = kind.stat_modifier(magnitude) {
        state
            .modifiers
            .insert(stat, ModifierSource::Effect(id), bonus);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::CharacterStats;

    fn setup() -> (EffectManager, CharacterRuntimeState) {
        let id = CharacterId(1);
        (
            EffectManager::new(id),
            CharacterRuntimeState::new(id, CharacterStats::default()),
        )
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn reapplying_refreshes_duration_without_duplicating() {
        let (mut effects, mut state) = setup();
        let source = EffectSource::default();
        let stun = EffectDescriptor::new(StatusEffectKind::Stun, 3.0, 0.0);

        let first = effects.apply_effect(&stun, &source, &mut state);
        effects.tick(secs(2), &mut state);
        let second = effects.apply_effect(&stun, &source, &mut state);

        assert_eq!(second, ApplyOutcome::Refreshed(first.id().unwrap()));
        assert_eq!(effects.len(), 1);
        assert_eq!(effects.get(StatusEffectKind::Stun).unwrap().remaining, secs(3));
    }

    #[test]
    fn stacks_accumulate_up_to_cap() {
        let (mut effects, mut state) = setup();
        let source = EffectSource::default();
        let attack = EffectDescriptor::new(StatusEffectKind::AttackUp, 10.0, 5.0).stackable(2);

        effects.apply_effect(&attack, &source, &mut state);
        effects.apply_effect(&attack, &source, &mut state);
        let capped = effects.apply_effect(&attack, &source, &mut state);

        assert!(matches!(capped, ApplyOutcome::Stacked { stacks: 2, .. }));
        assert_eq!(state.damage_bonus_percent(), 10.0);
    }

    #[test]
    fn expiry_reverts_exactly_its_modifier() {
        let (mut effects, mut state) = setup();
        let source = EffectSource::default();
        effects.apply_effect(
            &EffectDescriptor::new(StatusEffectKind::AttackUp, 2.0, 20.0),
            &source,
            &mut state,
        );
        effects.apply_effect(
            &EffectDescriptor::new(StatusEffectKind::DefenseUp, 5.0, 30.0),
            &source,
            &mut state,
        );

        let report = effects.tick(secs(2), &mut state);
        assert_eq!(report.expired, vec![StatusEffectKind::AttackUp]);
        assert_eq!(state.damage_bonus_percent(), 0.0);
        assert_eq!(state.damage_reduction_percent(90.0), 30.0);
    }

    #[test]
    fn invulnerability_blocks_new_debuffs() {
        let (mut effects, mut state) = setup();
        let source = EffectSource::default();
        effects.apply_effect(
            &EffectDescriptor::new(StatusEffectKind::Invulnerability, 5.0, 0.0),
            &source,
            &mut state,
        );

        let outcome = effects.apply_effect(
            &EffectDescriptor::new(StatusEffectKind::Poison, 5.0, 0.0),
            &source,
            &mut state,
        );
        assert_eq!(outcome, ApplyOutcome::Blocked);
        assert!(!effects.has(StatusEffectKind::Poison));

        let buff = effects.apply_effect(
            &EffectDescriptor::new(StatusEffectKind::SpeedUp, 5.0, 10.0),
            &source,
            &mut state,
        );
        assert!(buff.is_applied());
    }

    #[test]
    fn capability_counters_follow_blockers() {
        let (mut effects, mut state) = setup();
        let source = EffectSource::default();
        effects.apply_effect(
            &EffectDescriptor::new(StatusEffectKind::Root, 1.0, 0.0),
            &source,
            &mut state,
        );
        effects.apply_effect(
            &EffectDescriptor::new(StatusEffectKind::Silence, 3.0, 0.0),
            &source,
            &mut state,
        );
        assert!(!effects.can_move());
        assert!(effects.can_attack());
        assert!(!effects.can_use_skills());
        assert!(effects.is_under_crowd_control());

        effects.tick(secs(1), &mut state);
        assert!(effects.can_move());
        assert!(!effects.can_use_skills());

        effects.tick(secs(2), &mut state);
        assert!(effects.can_use_skills());
        assert!(!effects.is_under_crowd_control());
    }

    #[test]
    fn periodic_ticks_use_captured_caster_scaling() {
        let (mut effects, mut state) = setup();
        let source = EffectSource {
            caster: Some(CharacterId(9)),
            skill: None,
            strength: 0.0,
            intelligence: 10.0,
        };
        let poison = EffectDescriptor::new(StatusEffectKind::Poison, 3.0, 0.0)
            .periodic(4.0, 1.0)
            .with_scaling(0.0, 0.5);
        effects.apply_effect(&poison, &source, &mut state);

        let report = effects.tick(Duration::from_millis(2_500), &mut state);
        assert_eq!(report.periodic.len(), 2);
        assert!(report.periodic.iter().all(|t| t.amount == 9.0));
        assert_eq!(report.periodic[0].caster, Some(CharacterId(9)));

        let report = effects.tick(secs(5), &mut state);
        assert_eq!(report.periodic.len(), 1);
        assert_eq!(report.expired, vec![StatusEffectKind::Poison]);
    }

    #[test]
    fn dispel_respects_dispellable_flag() {
        let (mut effects, mut state) = setup();
        let source = EffectSource::default();
        effects.apply_effect(
            &EffectDescriptor::new(StatusEffectKind::Burn, 5.0, 0.0),
            &source,
            &mut state,
        );
        effects.apply_effect(
            &EffectDescriptor::new(StatusEffectKind::Fear, 5.0, 0.0).undispellable(),
            &source,
            &mut state,
        );

        assert!(!effects.dispel_kind(StatusEffectKind::Fear, &mut state));
        assert_eq!(effects.dispel_all(&mut state), vec![StatusEffectKind::Burn]);
        assert!(effects.has(StatusEffectKind::Fear));

        assert_eq!(effects.clear(&mut state), 1);
        assert!(effects.can_move());
    }

    #[test]
    fn remote_application_updates_magnitude() {
        let (mut effects, mut state) = setup();
        effects.apply_remote(StatusEffectKind::AttackUp, 10.0, secs(4), &mut state);
        let outcome = effects.apply_remote(StatusEffectKind::AttackUp, 25.0, secs(4), &mut state);

        assert!(matches!(outcome, ApplyOutcome::Refreshed(_)));
        assert_eq!(state.damage_bonus_percent(), 25.0);
        assert!(effects.tick(secs(1), &mut state).periodic.is_empty());
    }
}
