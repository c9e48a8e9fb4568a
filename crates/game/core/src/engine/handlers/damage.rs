use super::projectile;
use super::SkillHandler;
use crate::engine::context::ExecutionContext;
use crate::engine::SkillError;
use crate::skill::TargetType;
use crate::state::CharacterId;
use crate::sync::EffectCategory;

pub(super) enum Delivery {
    Projectile,
    Instant(CharacterId),
}

/// Single-target damage.
///
/// With a projectile asset the damage rides on a (possibly multi-hit)
/// projectile volley; without one it lands immediately and needs a target.
pub(super) struct Damage;

impl SkillHandler for Damage {
    type Plan = Delivery;

    fn validate(ctx: &ExecutionContext<'_>) -> Result<Delivery, SkillError> {
        ctx.live_caster()?;
        let skill = ctx.skill;

        if skill.assets.projectile.is_some() {
            let needs_target = matches!(skill.target_type, TargetType::Enemy | TargetType::Ally);
            match ctx.target.character {
                Some(id) => {
                    ctx.live_target(id)?;
                }
                None if needs_target => return Err(SkillError::MissingTarget(skill.id)),
                None => {}
            }
            return Ok(Delivery::Projectile);
        }

        Ok(Delivery::Instant(ctx.required_target()?))
    }

    fn apply(ctx: &mut ExecutionContext<'_>, plan: Delivery) -> Result<(), SkillError> {
        cast_visual(ctx)?;
        match plan {
            Delivery::Projectile => projectile::launch_volley(ctx),
            Delivery::Instant(target) => projectile::resolve_hit(ctx, target),
        }
    }
}

/// Damages the target and heals the caster for a share of the damage dealt.
///
/// Both halves happen inside one `apply`; neither can fail once validation
/// passed, so no caller ever observes one without the other.
pub(super) struct DamageAndHeal;

impl SkillHandler for DamageAndHeal {
    type Plan = CharacterId;

    fn validate(ctx: &ExecutionContext<'_>) -> Result<CharacterId, SkillError> {
        ctx.live_caster()?;
        ctx.required_target()
    }

    fn apply(ctx: &mut ExecutionContext<'_>, target: CharacterId) -> Result<(), SkillError> {
        cast_visual(ctx)?;
        if ctx.skill.assets.projectile.is_some() {
            projectile::launch(ctx, 0)
        } else {
            projectile::resolve_hit(ctx, target)
        }
    }
}

pub(super) fn cast_visual(ctx: &mut ExecutionContext<'_>) -> Result<(), SkillError> {
    let position = ctx.caster()?.state.position;
    let effect = ctx.skill.assets.cast_effect.as_ref();
    ctx.spawn_visual(EffectCategory::Cast, effect, position, None);
    Ok(())
}
