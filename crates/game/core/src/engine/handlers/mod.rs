//! One handler per [`SkillKind`].
//!
//! Handlers implement [`SkillHandler`]: `validate` sees the context
//! immutably and returns a plan; `apply` carries the plan out. Shared
//! projectile and hit resolution lives in [`projectile`].
mod area;
mod damage;
mod movement;
mod projectile;
mod summon;
mod support;
mod transformation;

use super::context::ExecutionContext;
use super::SkillError;
use crate::skill::SkillKind;
use crate::state::CharacterId;

pub(super) trait SkillHandler {
    type Plan;

    /// Read-only precondition checks.
    fn validate(ctx: &ExecutionContext<'_>) -> Result<Self::Plan, SkillError>;

    /// Applies a validated plan. May only fail before its first mutation.
    fn apply(ctx: &mut ExecutionContext<'_>, plan: Self::Plan) -> Result<(), SkillError>;
}

fn run<H: SkillHandler>(ctx: &mut ExecutionContext<'_>) -> Result<(), SkillError> {
    let plan = H::validate(ctx)?;
    H::apply(ctx, plan)
}

pub(super) fn dispatch(ctx: &mut ExecutionContext<'_>) -> Result<(), SkillError> {
    match ctx.skill.kind {
        SkillKind::Damage => run::<damage::Damage>(ctx),
        SkillKind::DamageAndHeal => run::<damage::DamageAndHeal>(ctx),
        SkillKind::AoeDamage => run::<area::AreaDamage>(ctx),
        SkillKind::Movement => run::<movement::Movement>(ctx),
        SkillKind::Buff => run::<support::Buff>(ctx),
        SkillKind::Heal => run::<support::Heal>(ctx),
        SkillKind::Summon => run::<summon::Summon>(ctx),
        SkillKind::Transformation => run::<transformation::Transformation>(ctx),
    }
}

pub(super) fn launch_continuation(
    ctx: &mut ExecutionContext<'_>,
    index: u32,
) -> Result<(), SkillError> {
    ctx.live_caster()?;
    if ctx.skill.assets.projectile.is_none() {
        return Err(SkillError::MissingAsset {
            skill: ctx.skill.id,
            asset: "projectile",
        });
    }
    projectile::launch(ctx, index)
}

pub(super) fn resolve_reported_hit(
    ctx: &mut ExecutionContext<'_>,
    victim: CharacterId,
) -> Result<(), SkillError> {
    ctx.caster()?;
    ctx.live_target(victim)?;
    projectile::resolve_hit(ctx, victim)
}
