use tracing::debug;

use super::damage::cast_visual;
use super::SkillHandler;
use crate::config::EngineConfig;
use crate::engine::context::ExecutionContext;
use crate::engine::SkillError;
use crate::env::SummonRequest;
use crate::schedule::{ScheduledTask, TimerKey};
use crate::state::secs;
use crate::sync::SyncEvent;

/// Asks the summon factory for companions and records them as the caster's
/// single active group, dismissing whatever group came before.
pub(super) struct Summon;

impl SkillHandler for Summon {
    type Plan = SummonRequest;

    fn validate(ctx: &ExecutionContext<'_>) -> Result<SummonRequest, SkillError> {
        let caster = ctx.live_caster()?;
        let skill = ctx.skill;
        let template = skill
            .assets
            .summon_template
            .clone()
            .ok_or(SkillError::MissingAsset {
                skill: skill.id,
                asset: "summon_template",
            })?;
        if !ctx.world.env.has_summon_factory() {
            return Err(SkillError::MissingCollaborator {
                skill: skill.id,
                collaborator: "summon factory",
            });
        }

        let state = &caster.state;
        Ok(SummonRequest {
            owner: ctx.caster,
            skill: skill.id,
            template,
            position: state.position + state.forward * ctx.config.summon_forward_offset,
            count: skill
                .summon
                .count
                .clamp(1, EngineConfig::MAX_SUMMONS as u32),
            damage: skill.summon.damage,
            duration: secs(skill.summon.duration),
        })
    }

    fn apply(ctx: &mut ExecutionContext<'_>, request: SummonRequest) -> Result<(), SkillError> {
        let skill = ctx.skill;
        let owner = ctx.caster;

        // The factory call is the only fallible step; nothing has changed yet.
        let factory = ctx
            .world
            .env
            .summons()
            .ok_or(SkillError::MissingCollaborator {
                skill: skill.id,
                collaborator: "summon factory",
            })?;
        let mut handles = factory
            .summon(&request)
            .map_err(|err| SkillError::SummonFailed(err.to_string()))?;

        let overflow = handles.len().saturating_sub(EngineConfig::MAX_SUMMONS);
        if overflow > 0 {
            let extra: Vec<_> = handles.drain(EngineConfig::MAX_SUMMONS..).collect();
            factory.dismiss(owner, &extra);
        }

        let replaced = ctx.world.dismiss_summons(owner);
        ctx.world
            .timers
            .cancel(&TimerKey::SummonDismissal { owner });

        let caster = ctx.caster_mut()?;
        caster.state.summons.extend(handles.iter().copied());
        caster.state.summon_generation += 1;
        let generation = caster.state.summon_generation;

        if !request.duration.is_zero() {
            let at = ctx.world.now + request.duration;
            ctx.world.timers.schedule(
                at,
                TimerKey::SummonDismissal { owner },
                ScheduledTask::DismissSummons { owner, generation },
            );
        }

        debug!(
            owner = %owner,
            summoned = handles.len(),
            replaced,
            template = %request.template,
            "summoned companions"
        );

        cast_visual(ctx)?;
        ctx.emit(SyncEvent::MinionSummoned {
            skill: skill.id,
            template: request.template,
            position: request.position,
            count: request.count,
            duration: skill.summon.duration.max(0.0),
        });
        ctx.report.summons = handles;
        ctx.report.touch(owner);
        Ok(())
    }
}
