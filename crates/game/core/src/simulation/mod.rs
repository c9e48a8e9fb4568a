//! A simulation session: roster, clock, deadlines, and cast gating.
//!
//! [`Simulation`] owns everything the [`SkillEngine`] borrows through a
//! [`World`]. It adds what the engine deliberately leaves to its caller:
//!
//! - **Gating**: [`Simulation::cast`] checks liveness, crowd control,
//!   cooldown, and mana, and consumes resources only after a successful
//!   execution.
//! - **Time**: [`Simulation::advance`] ticks every character's effects and
//!   fires due continuations (transformation reverts, summon dismissals,
//!   follow-up projectiles, projectile expiry).
//! - **Replication inbound**: [`Simulation::apply_remote`] reproduces events
//!   received from peers without re-broadcasting them.
mod cooldown;
mod errors;
mod snapshot;

pub use cooldown::Cooldowns;
pub use errors::{CastError, RemoteError};
pub use snapshot::{CharacterSnapshot, EffectSnapshot, SimulationSnapshot};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::combat;
use crate::engine::{
    CastTarget, ExecutionReport, ExecutionResult, ProjectileLaunch, SkillEngine, World,
};
use crate::env::{ProjectileHandle, SkillEnv, VisualRequest};
use crate::schedule::{ScheduledTask, Scheduler, TimerKey};
use crate::skill::{SkillCatalog, SkillDefinition, SkillId, StatusEffectKind};
use crate::state::{secs, Character, CharacterId, NetworkId, Roster, SimTime};
use crate::sync::SyncEvent;
use crate::transformation::TransformationRequest;

#[derive(Clone, Debug)]
struct InFlight {
    skill: Arc<SkillDefinition>,
    caster: CharacterId,
}

/// What happened during one [`Simulation::advance`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdvanceReport {
    pub now: SimTime,
    pub expired_effects: usize,
    pub periodic_damage: f32,
    pub periodic_healing: f32,
    pub timers_fired: usize,
    /// Characters whose transformation ended on its deadline.
    pub reverted: Vec<CharacterId>,
    pub deaths: Vec<CharacterId>,
    /// Projectiles launched by scheduled continuations.
    pub launches: Vec<ProjectileLaunch>,
    pub events_emitted: usize,
}

#[derive(Debug)]
pub struct Simulation {
    engine: SkillEngine,
    catalog: SkillCatalog,
    roster: Roster,
    timers: Scheduler,
    env: SkillEnv,
    cooldowns: Cooldowns,
    in_flight: HashMap<ProjectileHandle, InFlight>,
    now: SimTime,
}

impl Simulation {
    pub fn new(engine: SkillEngine) -> Self {
        Self {
            engine,
            catalog: SkillCatalog::default(),
            roster: Roster::new(),
            timers: Scheduler::new(),
            env: SkillEnv::default(),
            cooldowns: Cooldowns::new(),
            in_flight: HashMap::new(),
            now: SimTime::ZERO,
        }
    }

    #[must_use]
    pub fn with_env(mut self, env: SkillEnv) -> Self {
        self.env = env;
        self
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: SkillCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn engine(&self) -> &SkillEngine {
        &self.engine
    }

    pub fn catalog(&self) -> &SkillCatalog {
        &self.catalog
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn timers(&self) -> &Scheduler {
        &self.timers
    }

    pub fn cooldowns(&self) -> &Cooldowns {
        &self.cooldowns
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.roster.get(id)
    }

    pub fn character_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.roster.get_mut(id)
    }

    pub fn find_peer(&self, network_id: &NetworkId) -> Option<CharacterId> {
        self.roster.find_by_network_id(network_id)
    }

    pub fn is_in_flight(&self, projectile: ProjectileHandle) -> bool {
        self.in_flight.contains_key(&projectile)
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            now: self.now,
            characters: self.roster.iter().map(CharacterSnapshot::capture).collect(),
            pending_timers: self.timers.len(),
        }
    }

    // ========================================================================
    // Roster
    // ========================================================================

    /// Adds a character, replacing any previous one with the same id.
    pub fn spawn(&mut self, character: Character) -> Option<Character> {
        self.roster.insert(character)
    }

    /// Removes a character and everything scheduled on its behalf.
    pub fn despawn(&mut self, id: CharacterId) -> Option<Character> {
        self.world_at(self.now).dismiss_summons(id);
        self.timers.cancel_owned_by(id);
        self.cooldowns.clear(id);
        self.forget_projectiles_of(&[id]);
        self.roster.remove(id)
    }

    // ========================================================================
    // Casting
    // ========================================================================

    /// Executes `skill` without gating. Useful for scripted effects.
    pub fn execute(
        &mut self,
        skill: &Arc<SkillDefinition>,
        caster: CharacterId,
        target: &CastTarget,
    ) -> ExecutionResult {
        let report = self.execute_tracked(skill, caster, target)?;
        self.run_due_timers(&mut AdvanceReport::default());
        Ok(report)
    }

    /// Gated cast: the caster must be alive, free to use skills, off
    /// cooldown, and able to pay. Mana and cooldown are only consumed when
    /// the execution succeeds.
    pub fn cast(
        &mut self,
        skill: &Arc<SkillDefinition>,
        caster: CharacterId,
        target: &CastTarget,
    ) -> Result<ExecutionReport, CastError> {
        self.check_gates(skill, caster)?;
        let report = self.execute_tracked(skill, caster, target)?;

        if let Some(character) = self.roster.get_mut(caster) {
            character.state.mana.drain(skill.mana_cost);
        }
        self.cooldowns
            .start(caster, skill.id, self.now, skill.cooldown());

        self.run_due_timers(&mut AdvanceReport::default());
        Ok(report)
    }

    /// [`cast`](Self::cast) looking the skill up in the catalog.
    pub fn cast_by_id(
        &mut self,
        skill: SkillId,
        caster: CharacterId,
        target: &CastTarget,
    ) -> Result<ExecutionReport, CastError> {
        let definition = self
            .catalog
            .get(skill)
            .cloned()
            .ok_or(CastError::UnknownSkill(skill))?;
        self.cast(&definition, caster, target)
    }

    fn check_gates(&self, skill: &SkillDefinition, caster: CharacterId) -> Result<(), CastError> {
        let character = self
            .roster
            .get(caster)
            .ok_or(CastError::CasterNotFound(caster))?;
        if !character.is_alive() {
            return Err(CastError::CasterDead(caster));
        }
        if !character.can_use_skills() {
            return Err(CastError::Silenced(caster));
        }
        let remaining = self.cooldowns.remaining(caster, skill.id, self.now);
        if !remaining.is_zero() {
            return Err(CastError::OnCooldown {
                skill: skill.id,
                remaining,
            });
        }
        let available = character.state.mana.current;
        if available < skill.mana_cost {
            return Err(CastError::InsufficientMana {
                required: skill.mana_cost,
                available,
            });
        }
        Ok(())
    }

    fn execute_tracked(
        &mut self,
        skill: &Arc<SkillDefinition>,
        caster: CharacterId,
        target: &CastTarget,
    ) -> ExecutionResult {
        let world = World::new(&mut self.roster, &mut self.timers, &mut self.env, self.now);
        let report = self.engine.execute(skill, caster, target, world)?;
        self.track_projectiles(skill, caster, &report.projectiles);
        self.forget_projectiles_of(&report.killed);
        Ok(report)
    }

    fn track_projectiles(
        &mut self,
        skill: &Arc<SkillDefinition>,
        caster: CharacterId,
        launches: &[ProjectileLaunch],
    ) {
        for launch in launches.iter().filter(|l| !l.resolved) {
            self.in_flight.insert(
                launch.handle,
                InFlight {
                    skill: skill.clone(),
                    caster,
                },
            );
        }
    }

    /// Drops the in-flight projectiles of characters that died or left. Their
    /// expiry timers were cancelled with the rest of their continuations.
    fn forget_projectiles_of(&mut self, casters: &[CharacterId]) {
        if casters.is_empty() {
            return;
        }
        self.in_flight
            .retain(|_, flight| !casters.contains(&flight.caster));
    }

    /// Resolves an untargeted projectile that physics reported hitting
    /// `victim`. Returns `None` for unknown or expired projectiles.
    pub fn projectile_hit(
        &mut self,
        projectile: ProjectileHandle,
        victim: CharacterId,
    ) -> Option<ExecutionResult> {
        let flight = self.in_flight.remove(&projectile)?;
        self.timers.cancel(&TimerKey::ProjectileExpiry {
            owner: flight.caster,
            projectile,
        });
        let world = World::new(&mut self.roster, &mut self.timers, &mut self.env, self.now);
        let result = self
            .engine
            .resolve_projectile_hit(&flight.skill, flight.caster, victim, world);
        if let Ok(report) = &result {
            self.forget_projectiles_of(&report.killed);
        }
        Some(result)
    }

    /// Manually ends `id`'s transformation. Returns false when it was not
    /// transformed.
    pub fn revert_transformation(&mut self, id: CharacterId) -> bool {
        let Some(character) = self.roster.get_mut(id) else {
            return false;
        };
        if character
            .transformation
            .revert_to_original(&mut character.state, &mut self.timers)
            .is_none()
        {
            return false;
        }
        let subject = character.state.network_id.clone();
        self.engine
            .publish(vec![SyncEvent::TransformationEnded { subject }]);
        true
    }

    // ========================================================================
    // Time
    // ========================================================================

    /// Moves the clock forward by `dt`, ticking effects and firing due
    /// continuations.
    pub fn advance(&mut self, dt: Duration) -> AdvanceReport {
        self.now = self.now + dt;
        let mut report = AdvanceReport {
            now: self.now,
            ..AdvanceReport::default()
        };

        let mut deaths = Vec::new();
        for id in self.roster.ids() {
            let Some(character) = self.roster.get_mut(id) else {
                continue;
            };
            if !character.is_alive() {
                continue;
            }
            let ticked = character.tick_effects(dt);
            report.expired_effects += ticked.expired.len();

            for tick in ticked.periodic {
                if tick.kind.is_damage_over_time() {
                    let outcome =
                        combat::apply_damage(character, tick.amount, self.engine.config());
                    report.periodic_damage += outcome.amount();
                    if outcome.is_lethal() {
                        deaths.push(id);
                        break;
                    }
                } else if tick.kind == StatusEffectKind::ManaRegen {
                    character.state.mana.restore(tick.amount);
                } else {
                    report.periodic_healing += combat::apply_heal(character, tick.amount).amount();
                }
            }
        }

        let mut events = Vec::new();
        for id in deaths {
            let mut world = self.world_at(self.now);
            if world.handle_death(id).is_some() {
                let subject = world.roster.get(id).and_then(|c| c.state.network_id.clone());
                events.push(SyncEvent::TransformationEnded { subject });
            }
            report.deaths.push(id);
        }
        self.forget_projectiles_of(&report.deaths);
        report.events_emitted += self.engine.publish(events);

        self.run_due_timers(&mut report);
        if !report.deaths.is_empty() || report.timers_fired > 0 {
            debug!(
                now = %self.now,
                deaths = report.deaths.len(),
                timers = report.timers_fired,
                "advanced simulation"
            );
        }
        report
    }

    fn run_due_timers(&mut self, report: &mut AdvanceReport) {
        let mut events = Vec::new();
        while let Some((at, key, task)) = self.timers.pop_due(self.now) {
            report.timers_fired += 1;
            trace!(?key, %at, "timer fired");
            match task {
                ScheduledTask::RevertTransformation {
                    owner,
                    transformation,
                } => {
                    let Some(character) = self.roster.get_mut(owner) else {
                        continue;
                    };
                    if character
                        .transformation
                        .expire(transformation, &mut character.state, &mut self.timers)
                        .is_some()
                    {
                        let subject = character.state.network_id.clone();
                        events.push(SyncEvent::TransformationEnded { subject });
                        report.reverted.push(owner);
                    }
                }
                ScheduledTask::DismissSummons { owner, generation } => {
                    let current = self
                        .roster
                        .get(owner)
                        .map(|c| c.state.summon_generation);
                    if current == Some(generation) {
                        self.world_at(at).dismiss_summons(owner);
                    }
                }
                ScheduledTask::LaunchProjectile {
                    owner,
                    skill,
                    target,
                    index,
                } => {
                    let world =
                        World::new(&mut self.roster, &mut self.timers, &mut self.env, at);
                    if let Ok(launched) =
                        self.engine
                            .launch_scheduled(&skill, owner, &target, index, world)
                    {
                        self.track_projectiles(&skill, owner, &launched.projectiles);
                        self.forget_projectiles_of(&launched.killed);
                        report.events_emitted += launched.events_emitted;
                        report.launches.extend(launched.projectiles);
                    }
                }
                ScheduledTask::ExpireProjectile { projectile } => {
                    self.in_flight.remove(&projectile);
                }
            }
        }
        report.events_emitted += self.engine.publish(events);
    }

    fn world_at(&mut self, now: SimTime) -> World<'_> {
        World::new(&mut self.roster, &mut self.timers, &mut self.env, now)
    }

    // ========================================================================
    // Replication inbound
    // ========================================================================

    /// Reproduces an event received from a peer. `origin` is the local proxy
    /// of the sending peer, used when the event names no subject itself.
    ///
    /// Nothing applied here is re-broadcast, and remote projectiles never
    /// deal damage locally.
    pub fn apply_remote(
        &mut self,
        origin: Option<CharacterId>,
        event: &SyncEvent,
    ) -> Result<(), RemoteError> {
        match event {
            SyncEvent::ProjectileSpawned {
                skill,
                position,
                direction,
                ..
            } => {
                self.env
                    .projectiles()
                    .spawn_replica(*skill, *position, *direction);
            }
            SyncEvent::VisualEffect {
                effect,
                position,
                rotation,
                target,
                duration,
                ..
            } => {
                let attach_to = target
                    .as_ref()
                    .and_then(|id| self.roster.find_by_network_id(id));
                self.env.visuals().spawn(&VisualRequest {
                    effect: effect.clone(),
                    position: *position,
                    rotation: *rotation,
                    lifetime: *duration,
                    attach_to,
                });
            }
            SyncEvent::StatusApplied {
                target,
                kind,
                magnitude,
                duration,
            } => {
                let id = self.resolve_subject(target.as_ref(), None, event)?;
                if let Some(character) = self.roster.get_mut(id) {
                    character.effects.apply_remote(
                        *kind,
                        *magnitude,
                        secs(*duration),
                        &mut character.state,
                    );
                }
            }
            SyncEvent::MinionSummoned { template, .. } => {
                trace!(%template, "remote companions are simulated by their owner");
            }
            SyncEvent::PlayerTransformed { skill, subject } => {
                let id = self.resolve_subject(subject.as_ref(), origin, event)?;
                let definition = self
                    .catalog
                    .get(*skill)
                    .ok_or(RemoteError::UnknownSkill(*skill))?;
                let model = definition
                    .assets
                    .transformation_model
                    .clone()
                    .ok_or(RemoteError::MissingModel(*skill))?;
                let mut request = TransformationRequest::visual(model);
                request.skill = Some(*skill);
                request.animator = definition.assets.transformation_animator.clone();

                if let Some(character) = self.roster.get_mut(id) {
                    // The peer is authoritative for its own form.
                    let controller = &mut character.transformation;
                    controller.revert_to_original(&mut character.state, &mut self.timers);
                    if let Err(err) = controller.transform_to(
                        &request,
                        &mut character.state,
                        self.now,
                        &mut self.timers,
                    ) {
                        trace!(%err, "remote transformation not applied");
                    }
                }
            }
            SyncEvent::TransformationEnded { subject } => {
                let id = self.resolve_subject(subject.as_ref(), origin, event)?;
                if let Some(character) = self.roster.get_mut(id) {
                    character
                        .transformation
                        .revert_to_original(&mut character.state, &mut self.timers);
                }
            }
        }
        Ok(())
    }

    fn resolve_subject(
        &self,
        subject: Option<&NetworkId>,
        origin: Option<CharacterId>,
        event: &SyncEvent,
    ) -> Result<CharacterId, RemoteError> {
        match subject {
            Some(network_id) => self
                .roster
                .find_by_network_id(network_id)
                .ok_or_else(|| RemoteError::UnknownPeer(network_id.clone())),
            None => origin.ok_or(RemoteError::MissingSubject(event.name())),
        }
    }
}
