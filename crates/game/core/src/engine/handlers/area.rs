use super::damage::cast_visual;
use super::projectile;
use super::SkillHandler;
use crate::engine::context::ExecutionContext;
use crate::engine::SkillError;
use crate::state::{CharacterId, Vec3};
use crate::sync::EffectCategory;

pub(super) struct AreaPlan {
    center: Vec3,
    targets: Vec<CharacterId>,
}

/// Damage to every hostile character around a resolved center.
pub(super) struct AreaDamage;

impl SkillHandler for AreaDamage {
    type Plan = AreaPlan;

    fn validate(ctx: &ExecutionContext<'_>) -> Result<AreaPlan, SkillError> {
        let caster = ctx.live_caster()?;
        let skill = ctx.skill;
        let state = &caster.state;

        let center = if skill.target_type.is_self_centered() {
            state.position
        } else if let Some(ground) = ctx.target.ground {
            ground
        } else if let Some(position) = ctx.target.character.and_then(|id| ctx.position_of(id)) {
            position
        } else {
            state.position + state.forward * skill.aoe_radius
        };

        let limit = if skill.max_targets == 0 {
            usize::MAX
        } else {
            skill.max_targets
        };
        let targets = ctx
            .world
            .roster
            .within_radius(center, skill.aoe_radius)
            .into_iter()
            .filter(|id| *id != ctx.caster)
            .filter(|id| {
                ctx.world
                    .roster
                    .get(*id)
                    .is_some_and(|c| state.team.is_hostile_to(c.state.team))
            })
            .take(limit)
            .collect();

        Ok(AreaPlan { center, targets })
    }

    fn apply(ctx: &mut ExecutionContext<'_>, plan: AreaPlan) -> Result<(), SkillError> {
        cast_visual(ctx)?;
        let aoe = ctx.skill.assets.aoe_effect.as_ref();
        ctx.spawn_visual(EffectCategory::Aoe, aoe, plan.center, None);
        for target in plan.targets {
            projectile::resolve_hit(ctx, target)?;
        }
        Ok(())
    }
}
