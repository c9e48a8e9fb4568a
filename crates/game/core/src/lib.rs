//! Deterministic per-character skill execution.
//!
//! `skill-core` owns the rules for resolving a skill cast against a roster of
//! characters: damage and healing, timed status effects, temporary
//! transformations, summons, and relocation. It never performs I/O. Anything
//! that must leave the process (projectile spawns, visual effects, status
//! applications) is described as a [`sync::SyncEvent`] and handed to an
//! optional [`sync::SyncSink`] only after a cast has fully succeeded.
//!
//! All gameplay mutation flows through [`engine::SkillEngine`]; the
//! [`simulation::Simulation`] wraps it with cooldown and mana gating, a
//! simulated clock, and deadline scheduling.
pub mod combat;
pub mod config;
pub mod effects;
pub mod engine;
pub mod env;
pub mod error;
pub mod schedule;
pub mod simulation;
pub mod skill;
pub mod state;
pub mod stats;
pub mod sync;
pub mod transformation;

pub use combat::{DamageOutcome, HealOutcome};
pub use config::EngineConfig;
pub use effects::{
    ApplyOutcome, EffectId, EffectManager, EffectSource, PeriodicTick, StatusEffect, TickReport,
};
pub use engine::{
    CastTarget, ExecutionReport, ExecutionResult, ProjectileLaunch, SkillEngine, SkillError,
    SkillErrorCategory, World,
};
pub use env::{
    CollisionOracle, HeadlessProjectiles, NoVisuals, ProjectileHandle, ProjectileRequest,
    ProjectileSpawner, SkillEnv, SummonError, SummonFactory, SummonHandle, SummonRequest,
    VisualRequest, VisualSpawner,
};
pub use error::{ErrorSeverity, GameError};
pub use schedule::{ScheduledTask, Scheduler, TimerKey};
pub use simulation::{
    AdvanceReport, CastError, CharacterSnapshot, Cooldowns, EffectSnapshot, RemoteError,
    Simulation, SimulationSnapshot,
};
pub use skill::{
    AssetRef, EffectDescriptor, MovementDirection, MovementMode, MovementSpec, ProjectileSpec,
    Scaling, SkillAssets, SkillCatalog, SkillDefinition, SkillId, SkillKind, StatusEffectKind,
    SummonSpec, SyncFlags, TargetType, TransformationSpec,
};
pub use state::{
    Character, CharacterId, CharacterRuntimeState, NetworkId, Quat, ResourceMeter, Roster,
    SimTime, Team, Vec3, VisualIdentity,
};
pub use stats::{Bonus, BonusStack, CharacterStats, ModifierSource, StatKind, StatModifiers};
pub use sync::{EffectCategory, RecordingSink, SyncChannel, SyncEvent, SyncSink};
pub use transformation::{
    TransformError, TransformationController, TransformationId, TransformationRequest,
    TransformationState,
};
