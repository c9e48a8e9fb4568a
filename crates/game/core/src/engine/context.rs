//! Per-invocation execution context.
//!
//! Handlers read validated inputs from the context and write their effects
//! through it. Sync events are queued in an outbox that the engine publishes
//! only after the handler returned successfully.

use std::sync::Arc;

use super::{CastTarget, ExecutionReport, SkillError, World};
use crate::combat::{self, DamageOutcome, HealOutcome};
use crate::config::EngineConfig;
use crate::env::VisualRequest;
use crate::skill::{AssetRef, EffectDescriptor, SkillDefinition, SyncFlags};
use crate::state::{Character, CharacterId, NetworkId, Quat, Vec3};
use crate::sync::{EffectCategory, SyncEvent};

pub struct ExecutionContext<'a> {
    pub skill: &'a Arc<SkillDefinition>,
    pub caster: CharacterId,
    pub target: &'a CastTarget,
    pub world: World<'a>,
    pub config: &'a EngineConfig,
    pub report: ExecutionReport,
    outbox: Vec<SyncEvent>,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(
        skill: &'a Arc<SkillDefinition>,
        caster: CharacterId,
        target: &'a CastTarget,
        world: World<'a>,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            skill,
            caster,
            target,
            world,
            config,
            report: ExecutionReport::new(skill.id, caster),
            outbox: Vec::new(),
        }
    }

    pub fn into_parts(self) -> (ExecutionReport, Vec<SyncEvent>) {
        (self.report, self.outbox)
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub fn caster(&self) -> Result<&Character, SkillError> {
        self.world
            .roster
            .get(self.caster)
            .ok_or(SkillError::CasterNotFound(self.caster))
    }

    /// The caster, required to be alive.
    pub fn live_caster(&self) -> Result<&Character, SkillError> {
        let caster = self.caster()?;
        if !caster.is_alive() {
            return Err(SkillError::CasterDead(self.caster));
        }
        Ok(caster)
    }

    pub fn caster_mut(&mut self) -> Result<&mut Character, SkillError> {
        self.world
            .roster
            .get_mut(self.caster)
            .ok_or(SkillError::CasterNotFound(self.caster))
    }

    /// A living character other systems may aim at.
    pub fn live_target(&self, id: CharacterId) -> Result<&Character, SkillError> {
        match self.world.roster.get(id) {
            None => Err(SkillError::InvalidTarget {
                target: id,
                reason: "not in roster",
            }),
            Some(target) if !target.is_alive() => Err(SkillError::InvalidTarget {
                target: id,
                reason: "dead",
            }),
            Some(target) => Ok(target),
        }
    }

    /// The explicitly chosen target, which must exist and be alive.
    pub fn required_target(&self) -> Result<CharacterId, SkillError> {
        let id = self
            .target
            .character
            .ok_or(SkillError::MissingTarget(self.skill.id))?;
        self.live_target(id)?;
        Ok(id)
    }

    pub fn position_of(&self, id: CharacterId) -> Option<Vec3> {
        self.world.roster.get(id).map(|c| c.state.position)
    }

    pub fn network_id(&self, id: CharacterId) -> Option<NetworkId> {
        self.world
            .roster
            .get(id)
            .and_then(|c| c.state.network_id.clone())
    }

    pub fn syncs(&self, flag: SyncFlags) -> bool {
        self.skill.sync.contains(flag)
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Damages `target` and handles a resulting death.
    pub fn deal_damage(&mut self, target: CharacterId, raw: f32) -> DamageOutcome {
        let Some(victim) = self.world.roster.get_mut(target) else {
            return DamageOutcome::TargetDead;
        };
        let outcome = combat::apply_damage(victim, raw, self.config);
        self.report.damage_dealt += outcome.amount();
        self.report.touch(target);

        if outcome.is_lethal() {
            self.report.killed.push(target);
            if self.world.handle_death(target).is_some() {
                let subject = self.network_id(target);
                self.emit(SyncEvent::TransformationEnded { subject });
            }
        }
        outcome
    }

    pub fn heal(&mut self, target: CharacterId, amount: f32) -> HealOutcome {
        let Some(recipient) = self.world.roster.get_mut(target) else {
            return HealOutcome::TargetDead;
        };
        let outcome = combat::apply_heal(recipient, amount);
        self.report.healing_done += outcome.amount();
        self.report.touch(target);
        outcome
    }

    /// Applies the skill's effects that match `filter` to `recipient`,
    /// queueing a status event for each replicated application.
    pub fn apply_effects_where(
        &mut self,
        recipient: CharacterId,
        filter: impl Fn(&EffectDescriptor) -> bool,
    ) -> usize {
        let skill = self.skill;
        if skill.effects.is_empty() {
            return 0;
        }
        let Some(source) = self
            .world
            .roster
            .get(self.caster)
            .map(|c| c.as_source().with_skill(skill.id))
        else {
            return 0;
        };
        let target_network_id = self.network_id(recipient);
        let Some(character) = self.world.roster.get_mut(recipient) else {
            return 0;
        };
        if !character.is_alive() {
            return 0;
        }

        // Replicate the magnitude the instance ended up with, stacks included.
        let mut applied = Vec::new();
        for descriptor in skill.effects.iter().filter(|d| filter(d)) {
            if character.apply_effect(descriptor, &source).is_applied() {
                let magnitude = character
                    .effects
                    .get(descriptor.kind)
                    .map_or(descriptor.power, |effect| effect.magnitude);
                applied.push((descriptor, magnitude));
            }
        }

        let sync_status = self.syncs(SyncFlags::STATUS_EFFECTS);
        for &(descriptor, magnitude) in &applied {
            if sync_status && descriptor.replicate {
                self.emit(SyncEvent::StatusApplied {
                    target: target_network_id.clone(),
                    kind: descriptor.kind,
                    magnitude,
                    duration: descriptor.duration,
                });
            }
        }
        self.report.effects_applied += applied.len();
        if !applied.is_empty() {
            self.report.touch(recipient);
        }
        applied.len()
    }

    pub fn apply_effects(&mut self, recipient: CharacterId) -> usize {
        self.apply_effects_where(recipient, |_| true)
    }

    /// Spawns a visual locally and queues its replication. A missing asset
    /// is not an error: the visual is simply skipped.
    pub fn spawn_visual(
        &mut self,
        category: EffectCategory,
        effect: Option<&AssetRef>,
        position: Vec3,
        attach_to: Option<CharacterId>,
    ) {
        let Some(effect) = effect.cloned() else {
            return;
        };
        let lifetime = match category {
            EffectCategory::Cast => self.config.cast_effect_lifetime,
            EffectCategory::Hit => self.config.hit_effect_lifetime,
            EffectCategory::Aoe => self.config.aoe_effect_lifetime,
        };
        let rotation = match category {
            EffectCategory::Cast => self
                .world
                .roster
                .get(self.caster)
                .map(|c| Quat::facing(c.state.forward))
                .unwrap_or_default(),
            _ => Quat::IDENTITY,
        };
        let request = VisualRequest {
            effect,
            position,
            rotation,
            lifetime,
            attach_to,
        };
        self.world.env.visuals().spawn(&request);

        if self.syncs(SyncFlags::HIT_EFFECTS) {
            let target = attach_to.and_then(|id| self.network_id(id));
            self.emit(SyncEvent::VisualEffect {
                category,
                effect: request.effect,
                position,
                rotation,
                target,
                duration: lifetime,
            });
        }
    }

    pub fn emit(&mut self, event: SyncEvent) {
        self.outbox.push(event);
    }
}
