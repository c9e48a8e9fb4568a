//! Drives the runtime through its public handle with a manual clock.

use std::time::Duration;

use skill_core::{
    AssetRef, CastError, CastTarget, Character, CharacterId, CharacterStats, NetworkId, Scaling,
    SkillAssets, SkillDefinition, SkillId, SkillKind, StatusEffectKind, TargetType, Team,
    TransformationSpec, Vec3,
};
use skill_runtime::{RuntimeConfig, RuntimeError, SkillRuntime, WireMessage};

const HERO: CharacterId = CharacterId(1);
const OGRE: CharacterId = CharacterId(2);

fn manual_config() -> RuntimeConfig {
    RuntimeConfig {
        tick: Duration::ZERO,
        ..RuntimeConfig::default()
    }
}

fn fire_bolt() -> SkillDefinition {
    SkillDefinition::new(SkillId(1), "Fire Bolt", SkillKind::Damage)
        .targeting(TargetType::Enemy)
        .with_amount(Scaling::flat(25.0))
        .with_cost(20.0, 3.0)
        .with_assets(SkillAssets {
            projectile: Some(AssetRef::new("fire_bolt")),
            ..SkillAssets::default()
        })
}

fn bear_form() -> SkillDefinition {
    SkillDefinition::new(SkillId(2), "Bear Form", SkillKind::Transformation)
        .with_assets(SkillAssets {
            transformation_model: Some(AssetRef::new("bear")),
            ..SkillAssets::default()
        })
        .with_transformation(TransformationSpec {
            duration: 10.0,
            hp_bonus_percent: 50.0,
            damage_bonus_percent: 0.0,
        })
}

async fn start(config: RuntimeConfig) -> SkillRuntime {
    SkillRuntime::builder()
        .config(config)
        .skills([fire_bolt(), bear_form()])
        .character(
            Character::new(HERO, CharacterStats::new(100.0, 100.0))
                .with_network_id(NetworkId::new("hero"))
                .with_team(Team(1)),
        )
        .character(
            Character::new(OGRE, CharacterStats::new(200.0, 0.0))
                .with_network_id(NetworkId::new("ogre"))
                .with_team(Team(2))
                .at(Vec3::new(0.0, 0.0, 5.0)),
        )
        .build()
        .await
        .expect("runtime should build")
}

#[tokio::test]
async fn successful_cast_queues_a_relay_frame() {
    let mut runtime = start(manual_config()).await;
    let mut outbound = runtime.take_outbound().expect("sync is enabled");
    let handle = runtime.handle();

    let report = handle
        .cast(SkillId(1), HERO, CastTarget::character(OGRE))
        .await
        .unwrap();
    assert_eq!(report.skill, SkillId(1));

    let frame = outbound.try_recv().expect("one frame per replicated action");
    assert_eq!(frame.name(), "projectile_spawned");
    assert!(matches!(
        frame,
        WireMessage::ProjectileSpawned { skill_id, .. } if skill_id == SkillId(1)
    ));

    let snapshot = handle.snapshot().await.unwrap();
    let hero = snapshot.characters.iter().find(|c| c.id == HERO).unwrap();
    assert_eq!(hero.mana, 80.0);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn refused_cast_surfaces_the_gate_and_sends_nothing() {
    let mut runtime = start(manual_config()).await;
    let mut outbound = runtime.take_outbound().unwrap();
    let handle = runtime.handle();

    handle
        .cast(SkillId(1), HERO, CastTarget::character(OGRE))
        .await
        .unwrap();
    outbound.try_recv().unwrap();

    let err = handle
        .cast(SkillId(1), HERO, CastTarget::character(OGRE))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Cast(CastError::OnCooldown { .. })
    ));
    assert!(outbound.try_recv().is_err());

    handle.advance(Duration::from_secs(3)).await.unwrap();
    handle
        .cast(SkillId(1), HERO, CastTarget::character(OGRE))
        .await
        .unwrap();

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn transformation_reverts_on_advance_and_on_request() {
    let mut runtime = start(manual_config()).await;
    let mut outbound = runtime.take_outbound().unwrap();
    let handle = runtime.handle();

    handle
        .cast(SkillId(2), HERO, CastTarget::none())
        .await
        .unwrap();
    assert_eq!(outbound.try_recv().unwrap().name(), "player_transformed");

    let report = handle.advance(Duration::from_secs(10)).await.unwrap();
    assert_eq!(report.reverted, vec![HERO]);
    assert_eq!(
        outbound.try_recv().unwrap().name(),
        "player_transformation_ended"
    );
    assert!(!handle.revert(HERO).await.unwrap());

    handle.advance(Duration::from_secs(30)).await.unwrap();
    handle
        .cast(SkillId(2), HERO, CastTarget::none())
        .await
        .unwrap();
    assert!(handle.revert(HERO).await.unwrap());

    let snapshot = handle.snapshot().await.unwrap();
    let hero = snapshot.characters.iter().find(|c| c.id == HERO).unwrap();
    assert!(!hero.transformed);
    assert_eq!(hero.max_health, 100.0);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn disconnected_link_keeps_casts_local() {
    let mut runtime = start(manual_config()).await;
    let mut outbound = runtime.take_outbound().unwrap();
    let handle = runtime.handle();

    runtime.link().disconnect();
    handle
        .cast(SkillId(1), HERO, CastTarget::character(OGRE))
        .await
        .unwrap();
    assert!(outbound.try_recv().is_err());

    let snapshot = handle.snapshot().await.unwrap();
    let ogre = snapshot.characters.iter().find(|c| c.id == OGRE).unwrap();
    assert_eq!(ogre.health, 175.0);

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn relay_frames_apply_without_echo() {
    let mut runtime = start(manual_config()).await;
    let mut outbound = runtime.take_outbound().unwrap();
    let handle = runtime.handle();

    let frame = r#"{
        "event": "effect_applied",
        "data": {
            "socketId": "ogre",
            "targetSocketId": "hero",
            "effectType": "silence",
            "power": 0.0,
            "duration": 2.0
        }
    }"#;
    handle
        .receive_frame(Some(NetworkId::new("ogre")), frame)
        .await
        .unwrap();

    let snapshot = handle.snapshot().await.unwrap();
    let hero = snapshot.characters.iter().find(|c| c.id == HERO).unwrap();
    assert_eq!(hero.effects.len(), 1);
    assert_eq!(hero.effects[0].kind, StatusEffectKind::Silence);
    assert!(outbound.try_recv().is_err());

    let err = handle
        .cast(SkillId(1), HERO, CastTarget::character(OGRE))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Cast(CastError::Silenced(HERO))));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn malformed_frames_are_rejected() {
    let runtime = start(manual_config()).await;
    let handle = runtime.handle();

    let err = handle
        .receive_frame(None, r#"{"event": "chat_message", "data": {}}"#)
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Wire(_)));

    let err = handle
        .receive_frame(
            Some(NetworkId::new("ghost")),
            r#"{"event": "player_transformation_ended", "data": {}}"#,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Remote(_)));

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn disabled_sync_has_no_outbound_queue() {
    let mut runtime = start(RuntimeConfig {
        sync_enabled: false,
        ..manual_config()
    })
    .await;
    assert!(runtime.take_outbound().is_none());
    assert!(!runtime.link().is_connected());

    let handle = runtime.handle();
    handle
        .cast(SkillId(1), HERO, CastTarget::character(OGRE))
        .await
        .unwrap();

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn spawn_and_despawn_through_the_handle() {
    let runtime = start(manual_config()).await;
    let handle = runtime.handle();

    handle
        .spawn(Character::new(CharacterId(3), CharacterStats::new(50.0, 0.0)))
        .await
        .unwrap();
    assert_eq!(handle.snapshot().await.unwrap().characters.len(), 3);

    assert!(handle.despawn(CharacterId(3)).await.unwrap());
    assert!(!handle.despawn(CharacterId(3)).await.unwrap());

    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn handle_fails_after_shutdown() {
    let runtime = start(manual_config()).await;
    let handle = runtime.handle();
    runtime.shutdown().await.unwrap();

    let err = handle.snapshot().await.unwrap_err();
    assert!(matches!(err, RuntimeError::CommandChannelClosed));
}

#[tokio::test(start_paused = true)]
async fn fixed_step_advances_the_clock() {
    let mut runtime = start(RuntimeConfig {
        tick: Duration::from_millis(100),
        ..RuntimeConfig::default()
    })
    .await;
    let mut outbound = runtime.take_outbound().unwrap();
    let handle = runtime.handle();

    handle
        .cast(SkillId(2), HERO, CastTarget::none())
        .await
        .unwrap();
    outbound.recv().await.unwrap();

    let ended = outbound.recv().await.unwrap();
    assert_eq!(ended.name(), "player_transformation_ended");

    runtime.shutdown().await.unwrap();
}
