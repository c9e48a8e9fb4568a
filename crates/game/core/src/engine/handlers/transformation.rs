use super::SkillHandler;
use crate::engine::context::ExecutionContext;
use crate::engine::SkillError;
use crate::sync::{EffectCategory, SyncEvent};
use crate::transformation::TransformationRequest;

/// Hands the caster to its [`TransformationController`](crate::transformation::TransformationController).
pub(super) struct Transformation;

impl SkillHandler for Transformation {
    type Plan = TransformationRequest;

    fn validate(ctx: &ExecutionContext<'_>) -> Result<TransformationRequest, SkillError> {
        let caster = ctx.live_caster()?;
        let request = TransformationRequest::from_skill(ctx.skill);
        if request.model.is_none() {
            return Err(SkillError::MissingAsset {
                skill: ctx.skill.id,
                asset: "transformation_model",
            });
        }
        if caster.transformation.is_transformed() {
            return Err(SkillError::AlreadyTransformed(ctx.caster));
        }
        Ok(request)
    }

    fn apply(
        ctx: &mut ExecutionContext<'_>,
        request: TransformationRequest,
    ) -> Result<(), SkillError> {
        let skill = ctx.skill;
        let owner = ctx.caster;
        let now = ctx.world.now;

        let character = ctx
            .world
            .roster
            .get_mut(owner)
            .ok_or(SkillError::CasterNotFound(owner))?;
        let id = character
            .transformation
            .transform_to(&request, &mut character.state, now, ctx.world.timers)
            .map_err(|err| SkillError::from_transform(skill.id, owner, err))?
            .id;
        let position = character.state.position;
        let subject = character.state.network_id.clone();

        ctx.report.transformation = Some(id);
        ctx.report.touch(owner);

        let effect = skill
            .assets
            .caster_effect
            .as_ref()
            .or(skill.assets.cast_effect.as_ref());
        ctx.spawn_visual(EffectCategory::Cast, effect, position, Some(owner));
        ctx.apply_effects(owner);
        ctx.emit(SyncEvent::PlayerTransformed {
            skill: skill.id,
            subject,
        });
        Ok(())
    }
}
