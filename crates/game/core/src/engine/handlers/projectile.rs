use std::time::Duration;

use crate::combat;
use crate::engine::context::ExecutionContext;
use crate::engine::{ProjectileLaunch, SkillError};
use crate::env::ProjectileRequest;
use crate::schedule::{ScheduledTask, TimerKey};
use crate::skill::{SkillKind, SyncFlags};
use crate::state::{secs, CharacterId, Vec3};
use crate::sync::{EffectCategory, SyncEvent};

/// Share of damage dealt that returns to the caster as health.
pub(super) fn drain_ratio(ctx: &ExecutionContext<'_>) -> f32 {
    let skill = ctx.skill;
    if skill.life_steal_percent > 0.0 {
        skill.life_steal_percent / 100.0
    } else if skill.kind == SkillKind::DamageAndHeal {
        1.0
    } else {
        0.0
    }
}

/// Damages `victim`, shows the hit, applies the skill's effects, and heals
/// the caster by the drain ratio.
pub(super) fn resolve_hit(
    ctx: &mut ExecutionContext<'_>,
    victim: CharacterId,
) -> Result<(), SkillError> {
    let raw = combat::outgoing_damage(&ctx.caster()?.state, &ctx.skill.amount);
    let outcome = ctx.deal_damage(victim, raw);

    if let Some(position) = ctx.position_of(victim) {
        let hit = ctx.skill.assets.hit_effect.as_ref();
        ctx.spawn_visual(EffectCategory::Hit, hit, position, Some(victim));
    }
    ctx.apply_effects(victim);

    let drained = outcome.amount() * drain_ratio(ctx);
    if drained > 0.0 {
        let caster = ctx.caster;
        ctx.heal(caster, drained);
    }
    Ok(())
}

/// Creates projectile `index` of the current cast.
///
/// Spawns at the caster's position offset forward and up, aimed at the
/// target, else at the ground point, else along the caster's facing. A
/// targeted projectile resolves its hit immediately; an untargeted one is
/// given a lifetime deadline and waits for a hit report.
pub(super) fn launch(ctx: &mut ExecutionContext<'_>, index: u32) -> Result<(), SkillError> {
    let skill = ctx.skill;
    let prefab = skill
        .assets
        .projectile
        .clone()
        .ok_or(SkillError::MissingAsset {
            skill: skill.id,
            asset: "projectile",
        })?;

    let caster = ctx.caster()?;
    let forward = caster.state.forward;
    let origin = caster.state.position
        + forward * ctx.config.projectile_forward_offset
        + Vec3::UP * ctx.config.projectile_height_offset;

    let target = ctx
        .target
        .character
        .filter(|id| ctx.live_target(*id).is_ok());
    let direction = match (target.and_then(|id| ctx.position_of(id)), ctx.target.ground) {
        (Some(aim), _) | (None, Some(aim)) => origin.direction_to(aim, forward),
        (None, None) => forward,
    };

    let request = ProjectileRequest {
        owner: ctx.caster,
        skill: skill.id,
        prefab,
        position: origin,
        direction,
        speed: skill.projectile.speed,
        lifetime: skill.projectile.lifetime,
        homing: skill.projectile.homing,
        target,
    };
    let handle = ctx.world.env.projectiles().spawn(&request);

    if ctx.syncs(SyncFlags::PROJECTILES) {
        let target_id = target.and_then(|id| ctx.network_id(id));
        ctx.emit(SyncEvent::ProjectileSpawned {
            skill: skill.id,
            position: origin,
            direction,
            target: target_id,
        });
    }

    ctx.report.projectiles.push(ProjectileLaunch {
        handle,
        skill: skill.id,
        position: origin,
        direction,
        target,
        index,
        resolved: target.is_some(),
    });

    match target {
        Some(victim) => resolve_hit(ctx, victim)?,
        None => {
            let lifetime = secs(skill.projectile.lifetime);
            let expires = ctx.world.now + lifetime.max(Duration::from_millis(1));
            ctx.world.timers.schedule(
                expires,
                TimerKey::ProjectileExpiry {
                    owner: ctx.caster,
                    projectile: handle,
                },
                ScheduledTask::ExpireProjectile { projectile: handle },
            );
        }
    }
    Ok(())
}

/// Launches the first projectile now and schedules the rest of the volley.
pub(super) fn launch_volley(ctx: &mut ExecutionContext<'_>) -> Result<(), SkillError> {
    let skill = ctx.skill;
    launch(ctx, 0)?;

    let count = skill.projectile.hit_count.max(1);
    if count == 1 {
        return Ok(());
    }
    let volley = ctx.world.timers.allocate_volley();
    let delay = secs(skill.projectile.hit_delay);
    for index in 1..count {
        let at = ctx.world.now + delay * index;
        ctx.world.timers.schedule(
            at,
            TimerKey::ProjectileLaunch {
                owner: ctx.caster,
                volley,
                index,
            },
            ScheduledTask::LaunchProjectile {
                owner: ctx.caster,
                skill: skill.clone(),
                target: ctx.target.clone(),
                index,
            },
        );
    }
    Ok(())
}
