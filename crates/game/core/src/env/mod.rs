//! Collaborators the engine delegates to.
//!
//! The engine decides *what* happens; these traits are how it reaches the
//! world it cannot see: physics for path checks, the scene for spawning
//! projectiles, visuals, and companions. Every collaborator is optional or
//! has an inert default so the engine stays usable headless.
mod summon;

pub use summon::{SummonError, SummonFactory, SummonHandle, SummonRequest};

use std::fmt;

use crate::skill::{AssetRef, SkillId};
use crate::state::{CharacterId, Quat, Vec3};

/// Opaque handle of a locally spawned projectile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectileHandle(pub u64);

/// Answers whether a straight path is free of obstacles.
pub trait CollisionOracle: Send {
    fn is_path_clear(&self, from: Vec3, to: Vec3) -> bool;
}

/// Everything the scene needs to create a projectile.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileRequest {
    pub owner: CharacterId,
    pub skill: SkillId,
    pub prefab: AssetRef,
    pub position: Vec3,
    pub direction: Vec3,
    pub speed: f32,
    pub lifetime: f32,
    pub homing: bool,
    pub target: Option<CharacterId>,
}

pub trait ProjectileSpawner: Send {
    /// Creates a gameplay projectile owned by this simulation.
    fn spawn(&mut self, request: &ProjectileRequest) -> ProjectileHandle;

    /// Creates a purely cosmetic copy of a projectile fired by a peer.
    fn spawn_replica(&mut self, _skill: SkillId, _position: Vec3, _direction: Vec3) {}
}

/// A visual effect to place in the scene.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualRequest {
    pub effect: AssetRef,
    pub position: Vec3,
    pub rotation: Quat,
    /// Seconds.
    pub lifetime: f32,
    pub attach_to: Option<CharacterId>,
}

pub trait VisualSpawner: Send {
    fn spawn(&mut self, request: &VisualRequest);
}

/// Default projectile spawner: hands out sequential handles and nothing else.
#[derive(Clone, Debug, Default)]
pub struct HeadlessProjectiles {
    next: u64,
}

impl ProjectileSpawner for HeadlessProjectiles {
    fn spawn(&mut self, _request: &ProjectileRequest) -> ProjectileHandle {
        self.next += 1;
        ProjectileHandle(self.next)
    }
}

/// Default visual spawner: ignores every request.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoVisuals;

impl VisualSpawner for NoVisuals {
    fn spawn(&mut self, _request: &VisualRequest) {}
}

/// The set of collaborators a simulation executes against.
pub struct SkillEnv {
    collision: Option<Box<dyn CollisionOracle>>,
    projectiles: Box<dyn ProjectileSpawner>,
    visuals: Box<dyn VisualSpawner>,
    summons: Option<Box<dyn SummonFactory>>,
}

impl Default for SkillEnv {
    fn default() -> Self {
        Self {
            collision: None,
            projectiles: Box::new(HeadlessProjectiles::default()),
            visuals: Box::new(NoVisuals),
            summons: None,
        }
    }
}

impl fmt::Debug for SkillEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SkillEnv")
            .field("collision", &self.collision.is_some())
            .field("summons", &self.summons.is_some())
            .finish_non_exhaustive()
    }
}

impl SkillEnv {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_collision(mut self, oracle: impl CollisionOracle + 'static) -> Self {
        self.collision = Some(Box::new(oracle));
        self
    }

    #[must_use]
    pub fn with_projectiles(mut self, spawner: impl ProjectileSpawner + 'static) -> Self {
        self.projectiles = Box::new(spawner);
        self
    }

    #[must_use]
    pub fn with_visuals(mut self, spawner: impl VisualSpawner + 'static) -> Self {
        self.visuals = Box::new(spawner);
        self
    }

    #[must_use]
    pub fn with_summons(mut self, factory: impl SummonFactory + 'static) -> Self {
        self.summons = Some(Box::new(factory));
        self
    }

    /// Without an oracle every path is clear.
    pub fn is_path_clear(&self, from: Vec3, to: Vec3) -> bool {
        self.collision
            .as_ref()
            .is_none_or(|oracle| oracle.is_path_clear(from, to))
    }

    pub fn projectiles(&mut self) -> &mut dyn ProjectileSpawner {
        self.projectiles.as_mut()
    }

    pub fn visuals(&mut self) -> &mut dyn VisualSpawner {
        self.visuals.as_mut()
    }

    pub fn summons(&mut self) -> Option<&mut (dyn SummonFactory + 'static)> {
        self.summons.as_deref_mut()
    }

    pub fn has_summon_factory(&self) -> bool {
        self.summons.is_some()
    }
}
