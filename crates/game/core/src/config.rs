/// Engine tuning parameters.
///
/// Offsets are in world units, lifetimes in seconds. The defaults mirror the
/// values authored content is balanced against; tests and tools may override
/// individual fields.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineConfig {
    /// Distance in front of the caster where projectiles appear.
    pub projectile_forward_offset: f32,
    /// Height above the caster's origin where projectiles appear.
    pub projectile_height_offset: f32,
    /// Distance in front of the caster where summoned companions appear.
    pub summon_forward_offset: f32,
    /// Gap left between a charging caster and its target.
    pub charge_stop_distance: f32,
    /// Lifetime of cast visuals spawned at the caster.
    pub cast_effect_lifetime: f32,
    /// Lifetime of hit visuals spawned on targets.
    pub hit_effect_lifetime: f32,
    /// Lifetime of area visuals spawned at an AOE center.
    pub aoe_effect_lifetime: f32,
    /// Damage reduction is clamped to this ceiling (percent).
    pub max_damage_reduction: f32,
}

impl EngineConfig {
    // ===== compile-time constants used as type parameters =====
    /// Upper bound on companions tracked per caster.
    pub const MAX_SUMMONS: usize = 8;
    /// Upper bound on stacks of a single status effect kind.
    pub const MAX_EFFECT_STACKS: u8 = 10;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_PROJECTILE_FORWARD_OFFSET: f32 = 1.0;
    pub const DEFAULT_PROJECTILE_HEIGHT_OFFSET: f32 = 1.5;
    pub const DEFAULT_SUMMON_FORWARD_OFFSET: f32 = 2.0;
    pub const DEFAULT_CHARGE_STOP_DISTANCE: f32 = 1.5;
    pub const DEFAULT_MAX_DAMAGE_REDUCTION: f32 = 90.0;

    pub fn new() -> Self {
        Self {
            projectile_forward_offset: Self::DEFAULT_PROJECTILE_FORWARD_OFFSET,
            projectile_height_offset: Self::DEFAULT_PROJECTILE_HEIGHT_OFFSET,
            summon_forward_offset: Self::DEFAULT_SUMMON_FORWARD_OFFSET,
            charge_stop_distance: Self::DEFAULT_CHARGE_STOP_DISTANCE,
            cast_effect_lifetime: 1.0,
            hit_effect_lifetime: 1.0,
            aoe_effect_lifetime: 2.0,
            max_damage_reduction: Self::DEFAULT_MAX_DAMAGE_REDUCTION,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
