//! Headless skill duel.
//!
//! Builds a runtime with a manual clock, casts a short rotation, and prints
//! every relay frame as the JSON a peer would receive.
mod demo;

use std::time::Duration;

use anyhow::Result;
use skill_core::{CastTarget, CharacterId, SkillId};
use skill_runtime::{
    RuntimeConfig, RuntimeError, RuntimeHandle, SkillRuntime, WireMessage, init_logging,
};
use tokio::sync::mpsc;
use tracing::{info, warn};

use demo::{BRUTE, DRAGON_FORM, FIRE_BOLT, MAGE, STONE_SKIN, VENOM};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let mut config = RuntimeConfig::from_env();
    // The duel drives the clock itself so output is reproducible.
    config.tick = Duration::ZERO;
    let _guard = init_logging(&config)?;

    let mut runtime = SkillRuntime::builder()
        .config(config)
        .skills(demo::skills())
        .characters(demo::characters())
        .build()
        .await?;
    let mut outbound = runtime.take_outbound();
    let handle = runtime.handle();

    let rotation = [
        (DRAGON_FORM, MAGE, CastTarget::none()),
        (FIRE_BOLT, MAGE, CastTarget::character(BRUTE)),
        (VENOM, MAGE, CastTarget::character(BRUTE)),
        (FIRE_BOLT, MAGE, CastTarget::character(BRUTE)),
        (STONE_SKIN, MAGE, CastTarget::none()),
    ];

    for (skill, caster, target) in rotation {
        cast(&handle, skill, caster, target).await?;
        flush(outbound.as_mut())?;

        let report = handle.advance(Duration::from_secs(1)).await?;
        if !report.reverted.is_empty() || !report.deaths.is_empty() {
            info!(reverted = ?report.reverted, deaths = ?report.deaths, now = %report.now, "tick");
        }
        flush(outbound.as_mut())?;
    }

    handle.advance(Duration::from_secs(5)).await?;
    flush(outbound.as_mut())?;

    let snapshot = handle.snapshot().await?;
    for character in &snapshot.characters {
        println!(
            "{} hp {:.1}/{:.1} mana {:.1} effects {}",
            character.id,
            character.health,
            character.max_health,
            character.mana,
            character.effects.len()
        );
    }

    runtime.shutdown().await?;
    Ok(())
}

async fn cast(
    handle: &RuntimeHandle,
    skill: SkillId,
    caster: CharacterId,
    target: CastTarget,
) -> Result<()> {
    match handle.cast(skill, caster, target).await {
        Ok(report) => {
            info!(
                %skill,
                damage = report.damage_dealt,
                effects = report.effects_applied,
                events = report.events_emitted,
                "cast"
            );
            Ok(())
        }
        Err(RuntimeError::Cast(err)) => {
            warn!(%skill, %err, "cast refused");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

/// Prints every frame queued for the relay so far.
fn flush(outbound: Option<&mut mpsc::Receiver<WireMessage>>) -> Result<()> {
    let Some(outbound) = outbound else {
        return Ok(());
    };
    while let Ok(frame) = outbound.try_recv() {
        println!("{}", frame.to_json()?);
    }
    Ok(())
}
