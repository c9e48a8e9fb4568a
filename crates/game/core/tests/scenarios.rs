//! End-to-end behavior of the skill engine through a [`Simulation`].

use std::sync::{Arc, Mutex};
use std::time::Duration;

use skill_core::{
    AssetRef, CastTarget, Character, CharacterId, CharacterStats, EffectDescriptor, EffectSource,
    EngineConfig, ErrorSeverity, GameError, NetworkId, ProjectileHandle, ProjectileRequest,
    ProjectileSpawner, RecordingSink, Scaling, SkillAssets, SkillDefinition, SkillEngine, SkillEnv,
    SkillError, SkillErrorCategory, SkillId, SkillKind, Simulation, StatusEffectKind, SyncEvent,
    SyncFlags, TargetType, Team, TransformationSpec, Vec3, VisualIdentity,
};

const HERO: CharacterId = CharacterId(1);
const OGRE: CharacterId = CharacterId(2);

fn hero() -> Character {
    Character::new(HERO, CharacterStats::new(100.0, 100.0))
        .with_network_id(NetworkId::new("hero"))
        .with_team(Team(1))
        .with_visual(VisualIdentity::new(AssetRef::new("paladin")))
}

fn ogre() -> Character {
    Character::new(OGRE, CharacterStats::new(200.0, 0.0))
        .with_network_id(NetworkId::new("ogre"))
        .with_team(Team(2))
        .at(Vec3::new(0.0, 0.0, 10.0))
}

fn bear_form(model: Option<&str>) -> Arc<SkillDefinition> {
    Arc::new(
        SkillDefinition::new(SkillId(10), "Bear Form", SkillKind::Transformation)
            .with_assets(SkillAssets {
                transformation_model: model.map(AssetRef::new),
                ..SkillAssets::default()
            })
            .with_transformation(TransformationSpec {
                duration: 30.0,
                hp_bonus_percent: 50.0,
                damage_bonus_percent: 30.0,
            }),
    )
}

fn fire_bolt() -> Arc<SkillDefinition> {
    Arc::new(
        SkillDefinition::new(SkillId(20), "Fire Bolt", SkillKind::Damage)
            .targeting(TargetType::Enemy)
            .with_amount(Scaling::flat(25.0))
            .with_assets(SkillAssets {
                projectile: Some(AssetRef::new("fire_bolt")),
                ..SkillAssets::default()
            }),
    )
}

/// Keeps every projectile request so tests can compare against replication.
#[derive(Clone, Default)]
struct SpyProjectiles {
    spawned: Arc<Mutex<Vec<ProjectileRequest>>>,
}

impl SpyProjectiles {
    fn requests(&self) -> Vec<ProjectileRequest> {
        self.spawned.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl ProjectileSpawner for SpyProjectiles {
    fn spawn(&mut self, request: &ProjectileRequest) -> ProjectileHandle {
        let mut spawned = self.spawned.lock().unwrap();
        spawned.push(request.clone());
        ProjectileHandle(spawned.len() as u64)
    }
}

fn session(sink: &Arc<RecordingSink>) -> Simulation {
    let engine = SkillEngine::new(EngineConfig::default()).with_sync(sink.clone());
    let mut sim = Simulation::new(engine);
    sim.spawn(hero());
    sim.spawn(ogre());
    sim
}

#[test]
fn transformation_applies_bonuses_and_reverts_on_deadline() {
    let sink = Arc::new(RecordingSink::new());
    let mut sim = session(&sink);

    let report = sim
        .execute(&bear_form(Some("bear")), HERO, &CastTarget::none())
        .expect("transformation should succeed");
    assert!(report.transformation.is_some());

    let hero = sim.character(HERO).unwrap();
    assert!(hero.transformation.is_transformed());
    assert_eq!(hero.state.visual.model, Some(AssetRef::new("bear")));
    assert_eq!(hero.state.max_health(), 150.0);
    assert_eq!(hero.state.health.current, 150.0);
    assert_eq!(hero.state.damage_bonus_percent(), 30.0);
    assert!(
        sink.events()
            .iter()
            .any(|e| matches!(e, SyncEvent::PlayerTransformed { skill, .. } if *skill == SkillId(10)))
    );

    let early = sim.advance(Duration::from_secs(29));
    assert!(early.reverted.is_empty());
    assert!(sim.character(HERO).unwrap().transformation.is_transformed());

    let report = sim.advance(Duration::from_secs(1));
    assert_eq!(report.reverted, vec![HERO]);

    let hero = sim.character(HERO).unwrap();
    assert!(!hero.transformation.is_transformed());
    assert_eq!(hero.state.visual.model, Some(AssetRef::new("paladin")));
    assert_eq!(hero.state.max_health(), 100.0);
    assert_eq!(hero.state.health.current, 100.0);
    assert_eq!(hero.state.damage_bonus_percent(), 0.0);
    assert!(matches!(
        sink.events().last(),
        Some(SyncEvent::TransformationEnded { .. })
    ));
}

#[test]
fn transformation_without_model_fails_cleanly() {
    let sink = Arc::new(RecordingSink::new());
    let mut sim = session(&sink);
    let before = sim.character(HERO).unwrap().state.clone();

    let err = sim
        .execute(&bear_form(None), HERO, &CastTarget::none())
        .unwrap_err();

    assert!(matches!(err, SkillError::MissingAsset { .. }));
    assert_eq!(err.category(), SkillErrorCategory::Configuration);
    assert_eq!(err.severity(), ErrorSeverity::Validation);
    assert!(!err.severity().is_internal());

    let hero = sim.character(HERO).unwrap();
    assert!(!hero.transformation.is_transformed());
    assert_eq!(hero.state, before);
    assert!(sink.events().is_empty());
    assert_eq!(sink.send_attempts(), 0);
    assert!(sim.timers().is_empty());
}

#[test]
fn connected_projectile_replicates_exactly_what_was_spawned() {
    let sink = Arc::new(RecordingSink::new());
    let spy = SpyProjectiles::default();
    let mut sim = session(&sink).with_env(SkillEnv::new().with_projectiles(spy.clone()));

    let report = sim
        .execute(&fire_bolt(), HERO, &CastTarget::character(OGRE))
        .expect("fire bolt should hit");

    let local = spy.requests();
    assert_eq!(local.len(), 1);
    let events = sink.events();
    let spawned: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            SyncEvent::ProjectileSpawned {
                position,
                direction,
                target,
                ..
            } => Some((*position, *direction, target.clone())),
            _ => None,
        })
        .collect();
    assert_eq!(
        spawned,
        vec![(local[0].position, local[0].direction, Some(NetworkId::new("ogre")))]
    );
    assert_eq!(report.events_emitted, events.len());
    assert_eq!(report.damage_dealt, 25.0);
    assert_eq!(sim.character(OGRE).unwrap().state.health.current, 175.0);
}

#[test]
fn disconnected_projectile_still_spawns_locally() {
    let sink = Arc::new(RecordingSink::disconnected());
    let spy = SpyProjectiles::default();
    let mut sim = session(&sink).with_env(SkillEnv::new().with_projectiles(spy.clone()));

    let report = sim
        .execute(&fire_bolt(), HERO, &CastTarget::character(OGRE))
        .expect("disconnection is not a gameplay error");

    assert_eq!(spy.requests().len(), 1);
    assert_eq!(report.projectiles.len(), 1);
    assert_eq!(report.events_emitted, 0);
    assert_eq!(sink.send_attempts(), 0);
    assert_eq!(sim.character(OGRE).unwrap().state.health.current, 175.0);
}

#[test]
fn reapplying_plain_effect_refreshes_duration_only() {
    let mut ogre = ogre();
    let source = EffectSource::default();
    ogre.apply_effect(
        &EffectDescriptor::new(StatusEffectKind::AttackDown, 5.0, 10.0),
        &source,
    );
    ogre.apply_effect(
        &EffectDescriptor::new(StatusEffectKind::AttackDown, 8.0, 40.0),
        &source,
    );

    assert_eq!(ogre.effects.len(), 1);
    let effect = ogre.effects.get(StatusEffectKind::AttackDown).unwrap();
    assert_eq!(effect.duration, Duration::from_secs(8));
    assert_eq!(effect.remaining, Duration::from_secs(8));
    assert_eq!(effect.magnitude, 10.0);
    assert_eq!(effect.stacks, 1);
}

#[test]
fn invulnerable_character_survives_lethal_damage() {
    let sink = Arc::new(RecordingSink::new());
    let mut sim = session(&sink);
    sim.character_mut(OGRE).unwrap().apply_effect(
        &EffectDescriptor::new(StatusEffectKind::Invulnerability, 10.0, 0.0),
        &EffectSource::default(),
    );
    let smite = Arc::new(
        SkillDefinition::new(SkillId(30), "Smite", SkillKind::Damage)
            .targeting(TargetType::Enemy)
            .with_amount(Scaling::flat(10_000.0)),
    );

    let report = sim
        .execute(&smite, HERO, &CastTarget::character(OGRE))
        .expect("the cast itself succeeds");

    let ogre = sim.character(OGRE).unwrap();
    assert!(ogre.effects.has_invulnerability());
    assert_eq!(ogre.state.health.current, 200.0);
    assert!(ogre.is_alive());
    assert!(report.killed.is_empty());
    assert_eq!(report.damage_dealt, 0.0);
}

#[test]
fn revert_is_idempotent_and_round_trips_stats() {
    let sink = Arc::new(RecordingSink::new());
    let mut sim = session(&sink);
    let before = sim.character(HERO).unwrap().state.clone();

    sim.execute(&bear_form(Some("bear")), HERO, &CastTarget::none())
        .unwrap();
    assert!(sim.revert_transformation(HERO));
    let once = sim.character(HERO).unwrap().state.clone();
    assert!(!sim.revert_transformation(HERO));
    let twice = sim.character(HERO).unwrap().state.clone();

    assert_eq!(once, twice);
    assert_eq!(once.max_health(), before.max_health());
    assert_eq!(once.damage_bonus_percent(), before.damage_bonus_percent());
    assert_eq!(once.visual, before.visual);
    assert!(once.modifiers.is_empty());

    let ended = sink
        .events()
        .iter()
        .filter(|e| matches!(e, SyncEvent::TransformationEnded { .. }))
        .count();
    assert_eq!(ended, 1);
    assert!(sim.timers().is_empty());
}

#[test]
fn second_transformation_is_rejected_without_mutation() {
    let sink = Arc::new(RecordingSink::new());
    let mut sim = session(&sink);
    sim.execute(&bear_form(Some("bear")), HERO, &CastTarget::none())
        .unwrap();
    let transformed = sim.character(HERO).unwrap().state.clone();
    let events = sink.events().len();

    let err = sim
        .execute(&bear_form(Some("wolf")), HERO, &CastTarget::none())
        .unwrap_err();

    assert_eq!(err.category(), SkillErrorCategory::StateConflict);
    assert_eq!(sim.character(HERO).unwrap().state, transformed);
    assert_eq!(sink.events().len(), events);
    assert_eq!(sim.timers().len(), 1);
}

#[test]
fn unsynced_skill_keeps_effects_local() {
    let sink = Arc::new(RecordingSink::new());
    let mut sim = session(&sink);
    let skill = Arc::new(
        SkillDefinition::new(SkillId(40), "Quiet Bolt", SkillKind::Damage)
            .targeting(TargetType::Enemy)
            .with_amount(Scaling::flat(5.0))
            .with_assets(SkillAssets {
                projectile: Some(AssetRef::new("bolt")),
                hit_effect: Some(AssetRef::new("spark")),
                ..SkillAssets::default()
            })
            .with_effect(EffectDescriptor::new(StatusEffectKind::SpeedDown, 3.0, 30.0))
            .with_sync(SyncFlags::empty()),
    );

    let report = sim
        .execute(&skill, HERO, &CastTarget::character(OGRE))
        .unwrap();

    assert_eq!(report.events_emitted, 0);
    assert!(sink.events().is_empty());
    assert!(sim.character(OGRE).unwrap().effects.has(StatusEffectKind::SpeedDown));
}
