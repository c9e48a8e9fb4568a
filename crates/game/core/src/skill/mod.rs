//! Immutable skill definitions.
//!
//! A [`SkillDefinition`] is authored once, shared via `Arc`, and never
//! mutated at runtime. The [`SkillKind`] selects which handler the engine
//! dispatches to; the remaining fields parameterize that handler.
mod effect;

pub use effect::{EffectDescriptor, StatusEffectKind};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::state::secs;
use crate::stats::CharacterStats;

/// Stable identifier of a skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillId(pub u32);

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skill:{}", self.0)
    }
}

/// Opaque reference to an external asset (prefab, model, animator).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssetRef(String);

impl AssetRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which handler executes a skill.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SkillKind {
    /// Single-target damage, delivered by projectile when one is authored.
    Damage,
    /// Damages the target and heals the caster for a share of it.
    DamageAndHeal,
    AoeDamage,
    Movement,
    Buff,
    Heal,
    Summon,
    Transformation,
}

/// How a skill chooses what it affects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TargetType {
    #[default]
    SelfCast,
    Enemy,
    Ally,
    Ground,
    NoTarget,
    Direction,
}

impl TargetType {
    /// Skills that operate around the caster without a chosen target.
    pub const fn is_self_centered(self) -> bool {
        matches!(self, Self::SelfCast | Self::NoTarget)
    }
}

bitflags::bitflags! {
    /// Which categories of a skill's outcome are replicated to peers.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct SyncFlags: u8 {
        const PROJECTILES = 1 << 0;
        const HIT_EFFECTS = 1 << 1;
        const STATUS_EFFECTS = 1 << 2;
    }
}

impl Default for SyncFlags {
    fn default() -> Self {
        Self::all()
    }
}

/// `base + strength * s + intelligence * i`, floored at zero.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Scaling {
    pub base: f32,
    pub strength: f32,
    pub intelligence: f32,
}

impl Scaling {
    pub const fn flat(base: f32) -> Self {
        Self {
            base,
            strength: 0.0,
            intelligence: 0.0,
        }
    }

    pub fn evaluate(&self, stats: &CharacterStats) -> f32 {
        (self.base + stats.strength * self.strength + stats.intelligence * self.intelligence)
            .max(0.0)
    }
}

/// External assets a skill refers to. All optional; handlers that require
/// one fail with a configuration error when it is absent.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillAssets {
    pub projectile: Option<AssetRef>,
    pub cast_effect: Option<AssetRef>,
    pub hit_effect: Option<AssetRef>,
    pub aoe_effect: Option<AssetRef>,
    pub caster_effect: Option<AssetRef>,
    pub transformation_model: Option<AssetRef>,
    pub transformation_animator: Option<AssetRef>,
    pub summon_template: Option<AssetRef>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectileSpec {
    pub speed: f32,
    /// Seconds an untargeted projectile stays eligible for a hit report.
    pub lifetime: f32,
    pub homing: bool,
    /// Projectiles per cast.
    pub hit_count: u32,
    /// Seconds between consecutive projectiles.
    pub hit_delay: f32,
}

impl Default for ProjectileSpec {
    fn default() -> Self {
        Self {
            speed: 15.0,
            lifetime: 5.0,
            homing: false,
            hit_count: 1,
            hit_delay: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum MovementMode {
    #[default]
    Dash,
    Charge,
    Teleport,
    Blink,
    Leap,
    Roll,
}

impl MovementMode {
    /// Instant relocation shows an arrival effect at the destination.
    pub const fn is_instant(self) -> bool {
        matches!(self, Self::Teleport | Self::Blink)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum MovementDirection {
    #[default]
    Forward,
    Backward,
    ToTarget,
    AwayFromTarget,
    GroundPoint,
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementSpec {
    pub mode: MovementMode,
    pub direction: MovementDirection,
    pub distance: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SummonSpec {
    pub count: u32,
    /// Seconds; zero keeps the companions until the next summon.
    pub duration: f32,
    pub damage: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransformationSpec {
    /// Seconds; zero means the form lasts until reverted manually.
    pub duration: f32,
    pub hp_bonus_percent: f32,
    pub damage_bonus_percent: f32,
}

/// Immutable configuration of one skill.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillDefinition {
    pub id: SkillId,
    pub name: String,
    pub kind: SkillKind,
    pub target_type: TargetType,
    /// Seconds.
    pub cooldown: f32,
    pub mana_cost: f32,
    pub cast_range: f32,
    /// Damage or heal amount. A negative base on heal skills means a
    /// percentage of the recipient's maximum health.
    pub amount: Scaling,
    pub life_steal_percent: f32,
    pub aoe_radius: f32,
    pub max_targets: usize,
    pub effects: Vec<EffectDescriptor>,
    pub assets: SkillAssets,
    pub projectile: ProjectileSpec,
    pub movement: Option<MovementSpec>,
    pub summon: SummonSpec,
    pub transformation: TransformationSpec,
    pub sync: SyncFlags,
}

impl SkillDefinition {
    pub fn new(id: SkillId, name: impl Into<String>, kind: SkillKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            target_type: TargetType::default(),
            cooldown: 0.0,
            mana_cost: 0.0,
            cast_range: 10.0,
            amount: Scaling::default(),
            life_steal_percent: 0.0,
            aoe_radius: 0.0,
            max_targets: 1,
            effects: Vec::new(),
            assets: SkillAssets::default(),
            projectile: ProjectileSpec::default(),
            movement: None,
            summon: SummonSpec::default(),
            transformation: TransformationSpec::default(),
            sync: SyncFlags::default(),
        }
    }

    #[must_use]
    pub fn targeting(mut self, target_type: TargetType) -> Self {
        self.target_type = target_type;
        self
    }

    #[must_use]
    pub fn with_amount(mut self, amount: Scaling) -> Self {
        self.amount = amount;
        self
    }

    #[must_use]
    pub fn with_cost(mut self, mana_cost: f32, cooldown: f32) -> Self {
        self.mana_cost = mana_cost;
        self.cooldown = cooldown;
        self
    }

    #[must_use]
    pub fn with_effect(mut self, effect: EffectDescriptor) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_assets(mut self, assets: SkillAssets) -> Self {
        self.assets = assets;
        self
    }

    #[must_use]
    pub fn with_area(mut self, radius: f32, max_targets: usize) -> Self {
        self.aoe_radius = radius;
        self.max_targets = max_targets;
        self
    }

    #[must_use]
    pub fn with_life_steal(mut self, percent: f32) -> Self {
        self.life_steal_percent = percent;
        self
    }

    #[must_use]
    pub fn with_projectile(mut self, projectile: ProjectileSpec) -> Self {
        self.projectile = projectile;
        self
    }

    #[must_use]
    pub fn with_movement(mut self, movement: MovementSpec) -> Self {
        self.movement = Some(movement);
        self
    }

    #[must_use]
    pub fn with_summon(mut self, summon: SummonSpec) -> Self {
        self.summon = summon;
        self
    }

    #[must_use]
    pub fn with_transformation(mut self, transformation: TransformationSpec) -> Self {
        self.transformation = transformation;
        self
    }

    #[must_use]
    pub fn with_sync(mut self, sync: SyncFlags) -> Self {
        self.sync = sync;
        self
    }

    pub fn cooldown(&self) -> Duration {
        secs(self.cooldown)
    }
}

/// Read-only lookup of shared skill definitions by id.
#[derive(Clone, Debug, Default)]
pub struct SkillCatalog {
    skills: BTreeMap<SkillId, Arc<SkillDefinition>>,
}

impl SkillCatalog {
    pub fn new(definitions: impl IntoIterator<Item = SkillDefinition>) -> Self {
        Self {
            skills: definitions
                .into_iter()
                .map(|def| (def.id, Arc::new(def)))
                .collect(),
        }
    }

    pub fn get(&self, id: SkillId) -> Option<&Arc<SkillDefinition>> {
        self.skills.get(&id)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SkillDefinition>> {
        self.skills.values()
    }
}
