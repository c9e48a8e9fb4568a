//! Content for the demo duel: a small catalog and two opposing characters.
use skill_core::{
    AssetRef, Character, CharacterId, CharacterStats, EffectDescriptor, NetworkId, Scaling,
    SkillAssets, SkillDefinition, SkillId, SkillKind, StatusEffectKind, TargetType, Team,
    TransformationSpec, Vec3, VisualIdentity,
};

pub const MAGE: CharacterId = CharacterId(1);
pub const BRUTE: CharacterId = CharacterId(2);

pub const FIRE_BOLT: SkillId = SkillId(1);
pub const VENOM: SkillId = SkillId(2);
pub const STONE_SKIN: SkillId = SkillId(3);
pub const DRAGON_FORM: SkillId = SkillId(4);

pub fn skills() -> Vec<SkillDefinition> {
    vec![
        SkillDefinition::new(FIRE_BOLT, "Fire Bolt", SkillKind::Damage)
            .targeting(TargetType::Enemy)
            .with_amount(Scaling {
                base: 20.0,
                strength: 0.0,
                intelligence: 0.5,
            })
            .with_cost(15.0, 1.5)
            .with_assets(SkillAssets {
                projectile: Some(AssetRef::new("fire_bolt")),
                hit_effect: Some(AssetRef::new("fire_burst")),
                ..SkillAssets::default()
            }),
        SkillDefinition::new(VENOM, "Venom", SkillKind::Damage)
            .targeting(TargetType::Enemy)
            .with_amount(Scaling::flat(5.0))
            .with_cost(20.0, 6.0)
            .with_effect(
                EffectDescriptor::new(StatusEffectKind::Poison, 6.0, 0.0).periodic(4.0, 1.0),
            ),
        SkillDefinition::new(STONE_SKIN, "Stone Skin", SkillKind::Buff)
            .targeting(TargetType::SelfCast)
            .with_cost(10.0, 12.0)
            .with_effect(EffectDescriptor::new(StatusEffectKind::DefenseUp, 8.0, 25.0)),
        SkillDefinition::new(DRAGON_FORM, "Dragon Form", SkillKind::Transformation)
            .with_cost(40.0, 30.0)
            .with_assets(SkillAssets {
                transformation_model: Some(AssetRef::new("dragon")),
                cast_effect: Some(AssetRef::new("dragon_smoke")),
                ..SkillAssets::default()
            })
            .with_transformation(TransformationSpec {
                duration: 5.0,
                hp_bonus_percent: 40.0,
                damage_bonus_percent: 25.0,
            }),
    ]
}

pub fn characters() -> Vec<Character> {
    vec![
        Character::new(MAGE, CharacterStats::new(120.0, 150.0))
            .with_network_id(NetworkId::new("mage"))
            .with_team(Team(1))
            .with_visual(VisualIdentity::new(AssetRef::new("mage"))),
        Character::new(BRUTE, CharacterStats::new(260.0, 0.0))
            .with_network_id(NetworkId::new("brute"))
            .with_team(Team(2))
            .at(Vec3::new(0.0, 0.0, 8.0)),
    ]
}
