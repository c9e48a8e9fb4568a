//! Skill execution pipeline.
//!
//! [`SkillEngine::execute`] dispatches on the skill's kind to exactly one
//! handler. Every handler runs in two phases:
//!
//! 1. **validate**: read-only checks against the world that produce a plan
//!    or an error. Nothing is mutated.
//! 2. **apply**: carries out the plan. Gameplay state changes first; the
//!    sync events describing them are queued and published only once the
//!    handler has returned successfully.
//!
//! A failed execution therefore leaves health, effects, transformation state,
//! and the network channel untouched.
mod context;
mod errors;
mod handlers;
mod world;

pub use context::ExecutionContext;
pub use errors::{SkillError, SkillErrorCategory};
pub use world::World;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::env::{ProjectileHandle, SummonHandle};
use crate::error::GameError;
use crate::skill::{SkillDefinition, SkillId};
use crate::state::{CharacterId, Vec3};
use crate::sync::{SyncChannel, SyncEvent, SyncSink};
use crate::transformation::TransformationId;

/// What a skill is aimed at. Both parts are optional; handlers decide which
/// they need.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CastTarget {
    pub character: Option<CharacterId>,
    pub ground: Option<Vec3>,
}

impl CastTarget {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn character(id: CharacterId) -> Self {
        Self {
            character: Some(id),
            ground: None,
        }
    }

    pub fn ground(point: Vec3) -> Self {
        Self {
            character: None,
            ground: Some(point),
        }
    }
}

/// One projectile created during an execution.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileLaunch {
    pub handle: ProjectileHandle,
    pub skill: SkillId,
    pub position: Vec3,
    pub direction: Vec3,
    pub target: Option<CharacterId>,
    /// Position within a multi-projectile volley.
    pub index: u32,
    /// Whether the hit was resolved at launch. Unresolved projectiles wait
    /// for a hit report from the physics side.
    pub resolved: bool,
}

/// Observable outcome of a successful execution.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExecutionReport {
    pub skill: SkillId,
    pub caster: CharacterId,
    /// Characters whose health or effects changed, in first-touch order.
    pub affected: Vec<CharacterId>,
    pub damage_dealt: f32,
    pub healing_done: f32,
    pub effects_applied: usize,
    pub killed: Vec<CharacterId>,
    pub projectiles: Vec<ProjectileLaunch>,
    pub summons: Vec<SummonHandle>,
    pub destination: Option<Vec3>,
    pub transformation: Option<TransformationId>,
    /// Sync events handed to a connected sink.
    pub events_emitted: usize,
}

impl ExecutionReport {
    pub fn new(skill: SkillId, caster: CharacterId) -> Self {
        Self {
            skill,
            caster,
            ..Self::default()
        }
    }

    pub(crate) fn touch(&mut self, id: CharacterId) {
        if !self.affected.contains(&id) {
            self.affected.push(id);
        }
    }
}

pub type ExecutionResult = Result<ExecutionReport, SkillError>;

/// Stateless skill dispatcher with an injected sync channel.
#[derive(Clone, Debug, Default)]
pub struct SkillEngine {
    config: EngineConfig,
    sync: SyncChannel,
}

impl SkillEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            sync: SyncChannel::detached(),
        }
    }

    #[must_use]
    pub fn with_sync(mut self, sink: Arc<dyn SyncSink>) -> Self {
        self.sync = SyncChannel::new(sink);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sync(&self) -> &SyncChannel {
        &self.sync
    }

    /// Executes `skill` for `caster`.
    ///
    /// Cooldown and mana gating are the caller's concern; see
    /// [`crate::simulation::Simulation::cast`].
    pub fn execute(
        &self,
        skill: &Arc<SkillDefinition>,
        caster: CharacterId,
        target: &CastTarget,
        world: World<'_>,
    ) -> ExecutionResult {
        let mut ctx = ExecutionContext::new(skill, caster, target, world, &self.config);
        let result = handlers::dispatch(&mut ctx);
        self.finish(ctx, result)
    }

    /// Fires projectile `index` of a volley whose first projectile was
    /// launched by an earlier [`execute`](Self::execute).
    pub fn launch_scheduled(
        &self,
        skill: &Arc<SkillDefinition>,
        caster: CharacterId,
        target: &CastTarget,
        index: u32,
        world: World<'_>,
    ) -> ExecutionResult {
        let mut ctx = ExecutionContext::new(skill, caster, target, world, &self.config);
        let result = handlers::launch_continuation(&mut ctx, index);
        self.finish(ctx, result)
    }

    /// Resolves an untargeted projectile that physics reported hitting
    /// `victim`.
    pub fn resolve_projectile_hit(
        &self,
        skill: &Arc<SkillDefinition>,
        caster: CharacterId,
        victim: CharacterId,
        world: World<'_>,
    ) -> ExecutionResult {
        let target = CastTarget::character(victim);
        let mut ctx = ExecutionContext::new(skill, caster, &target, world, &self.config);
        let result = handlers::resolve_reported_hit(&mut ctx, victim);
        self.finish(ctx, result)
    }

    /// Publishes events produced outside an execution (deadline reverts).
    pub fn publish(&self, events: Vec<SyncEvent>) -> usize {
        self.sync.publish(events)
    }

    fn finish(&self, ctx: ExecutionContext<'_>, result: Result<(), SkillError>) -> ExecutionResult {
        let (mut report, outbox) = ctx.into_parts();
        match result {
            Ok(()) => {
                report.events_emitted = self.sync.publish(outbox);
                debug!(
                    skill = %report.skill,
                    caster = %report.caster,
                    affected = report.affected.len(),
                    damage = report.damage_dealt,
                    healing = report.healing_done,
                    events = report.events_emitted,
                    "skill executed"
                );
                Ok(report)
            }
            Err(error) => {
                warn!(
                    skill = %report.skill,
                    caster = %report.caster,
                    code = error.error_code(),
                    category = %error.category(),
                    %error,
                    "skill execution failed"
                );
                Err(error)
            }
        }
    }
}
