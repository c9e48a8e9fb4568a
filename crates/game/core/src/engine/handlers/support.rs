use super::damage::cast_visual;
use super::SkillHandler;
use crate::combat;
use crate::engine::context::ExecutionContext;
use crate::engine::SkillError;
use crate::state::CharacterId;
use crate::sync::EffectCategory;

/// Who receives a supportive skill: the chosen target, the caster, or, for
/// area variants, every ally within range.
fn recipients(ctx: &ExecutionContext<'_>) -> Result<Vec<CharacterId>, SkillError> {
    let caster = ctx.live_caster()?;
    let skill = ctx.skill;

    if skill.aoe_radius > 0.0 && skill.target_type.is_self_centered() {
        let team = caster.state.team;
        let limit = if skill.max_targets == 0 {
            usize::MAX
        } else {
            skill.max_targets
        };
        let allies = ctx
            .world
            .roster
            .within_radius(caster.state.position, skill.aoe_radius)
            .into_iter()
            .filter(|id| {
                *id == ctx.caster
                    || ctx
                        .world
                        .roster
                        .get(*id)
                        .is_some_and(|c| !team.is_hostile_to(c.state.team))
            })
            .take(limit)
            .collect();
        return Ok(allies);
    }

    match ctx.target.character {
        Some(id) => {
            ctx.live_target(id)?;
            Ok(vec![id])
        }
        None => Ok(vec![ctx.caster]),
    }
}

fn hit_visual(ctx: &mut ExecutionContext<'_>, recipient: CharacterId) {
    if let Some(position) = ctx.position_of(recipient) {
        let effect = ctx.skill.assets.hit_effect.as_ref();
        ctx.spawn_visual(EffectCategory::Hit, effect, position, Some(recipient));
    }
}

/// Applies the skill's status effects.
pub(super) struct Buff;

impl SkillHandler for Buff {
    type Plan = Vec<CharacterId>;

    fn validate(ctx: &ExecutionContext<'_>) -> Result<Vec<CharacterId>, SkillError> {
        recipients(ctx)
    }

    fn apply(ctx: &mut ExecutionContext<'_>, plan: Vec<CharacterId>) -> Result<(), SkillError> {
        cast_visual(ctx)?;
        for recipient in plan {
            ctx.apply_effects(recipient);
            hit_visual(ctx, recipient);
        }
        Ok(())
    }
}

/// Restores health, then applies any effects (heal-over-time riders).
pub(super) struct Heal;

impl SkillHandler for Heal {
    type Plan = Vec<CharacterId>;

    fn validate(ctx: &ExecutionContext<'_>) -> Result<Vec<CharacterId>, SkillError> {
        recipients(ctx)
    }

    fn apply(ctx: &mut ExecutionContext<'_>, plan: Vec<CharacterId>) -> Result<(), SkillError> {
        cast_visual(ctx)?;
        for recipient in plan {
            let amount = {
                let caster = &ctx.caster()?.state;
                let Some(target) = ctx.world.roster.get(recipient) else {
                    continue;
                };
                combat::heal_amount(caster, &ctx.skill.amount, &target.state)
            };
            ctx.heal(recipient, amount);
            ctx.apply_effects(recipient);
            hit_visual(ctx, recipient);
        }
        Ok(())
    }
}
