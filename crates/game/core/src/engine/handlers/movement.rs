use super::damage::cast_visual;
use super::SkillHandler;
use crate::engine::context::ExecutionContext;
use crate::engine::SkillError;
use crate::skill::{MovementDirection, MovementSpec};
use crate::state::{CharacterId, Vec3};
use crate::sync::EffectCategory;

pub(super) struct MovementPlan {
    spec: MovementSpec,
    destination: Vec3,
    heading: Vec3,
    target: Option<CharacterId>,
}

/// Relocates the caster: dashes, charges, blinks, teleports.
///
/// Debuffs the skill carries land on the target after arrival (a charge that
/// stuns); everything else applies to the caster.
pub(super) struct Movement;

impl SkillHandler for Movement {
    type Plan = MovementPlan;

    fn validate(ctx: &ExecutionContext<'_>) -> Result<MovementPlan, SkillError> {
        let caster = ctx.live_caster()?;
        let skill = ctx.skill;
        let spec = skill.movement.ok_or(SkillError::MissingAsset {
            skill: skill.id,
            asset: "movement",
        })?;
        if !caster.can_move() {
            return Err(SkillError::Immobilized(ctx.caster));
        }

        let from = caster.state.position;
        let forward = caster.state.forward;
        let target = match ctx.target.character {
            Some(id) => Some(ctx.live_target(id).map(|_| id)?),
            None => None,
        };
        let target_position = target.and_then(|id| ctx.position_of(id));

        let (destination, heading) = match spec.direction {
            MovementDirection::Forward => (from + forward * spec.distance, forward),
            MovementDirection::Backward => (from - forward * spec.distance, forward),
            MovementDirection::ToTarget => {
                let aim = target_position.ok_or(SkillError::MissingTarget(skill.id))?;
                let dir = from.direction_to(aim, forward);
                let gap = from.distance(aim);
                let travel = if gap <= spec.distance {
                    (gap - ctx.config.charge_stop_distance).max(0.0)
                } else {
                    spec.distance
                };
                (from + dir * travel, dir)
            }
            MovementDirection::AwayFromTarget => {
                let threat = target_position.ok_or(SkillError::MissingTarget(skill.id))?;
                let dir = threat.direction_to(from, -forward);
                (from + dir * spec.distance, forward)
            }
            MovementDirection::GroundPoint => match ctx.target.ground {
                Some(point) => {
                    let dir = from.direction_to(point, forward);
                    let travel = from.distance(point).min(spec.distance);
                    (from + dir * travel, dir)
                }
                None => (from + forward * spec.distance, forward),
            },
        };

        if !ctx.world.env.is_path_clear(from, destination) {
            return Err(SkillError::MovementBlocked {
                from,
                to: destination,
            });
        }

        Ok(MovementPlan {
            spec,
            destination,
            heading,
            target,
        })
    }

    fn apply(ctx: &mut ExecutionContext<'_>, plan: MovementPlan) -> Result<(), SkillError> {
        cast_visual(ctx)?;

        let caster = ctx.caster_mut()?;
        caster.state.position = plan.destination;
        let facing = plan.heading.flattened().normalized();
        if facing != Vec3::ZERO {
            caster.state.forward = facing;
        }
        let caster_id = ctx.caster;
        ctx.report.destination = Some(plan.destination);
        ctx.report.touch(caster_id);

        if plan.spec.mode.is_instant() {
            let arrival = ctx.skill.assets.hit_effect.as_ref();
            ctx.spawn_visual(EffectCategory::Hit, arrival, plan.destination, None);
        }

        if let Some(target) = plan.target {
            ctx.apply_effects_where(target, |d| d.kind.is_debuff());
        }
        ctx.apply_effects_where(caster_id, |d| !d.kind.is_debuff());
        Ok(())
    }
}
