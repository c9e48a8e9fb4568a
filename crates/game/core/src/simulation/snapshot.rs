use crate::skill::{AssetRef, StatusEffectKind};
use crate::state::{Character, CharacterId, NetworkId, SimTime, Vec3};

/// Read-only summary of one active effect.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectSnapshot {
    pub kind: StatusEffectKind,
    pub magnitude: f32,
    pub stacks: u8,
    /// Seconds.
    pub remaining: f32,
}

/// Read-only summary of a character for observers outside the simulation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterSnapshot {
    pub id: CharacterId,
    pub network_id: Option<NetworkId>,
    pub position: Vec3,
    pub health: f32,
    pub max_health: f32,
    pub mana: f32,
    pub alive: bool,
    pub model: Option<AssetRef>,
    pub transformed: bool,
    pub effects: Vec<EffectSnapshot>,
    pub summons: usize,
}

impl CharacterSnapshot {
    pub fn capture(character: &Character) -> Self {
        let state = &character.state;
        Self {
            id: state.id,
            network_id: state.network_id.clone(),
            position: state.position,
            health: state.health.current,
            max_health: state.health.maximum,
            mana: state.mana.current,
            alive: state.is_alive(),
            model: state.visual.model.clone(),
            transformed: character.transformation.is_transformed(),
            effects: character
                .effects
                .iter()
                .map(|effect| EffectSnapshot {
                    kind: effect.kind,
                    magnitude: effect.magnitude,
                    stacks: effect.stacks,
                    remaining: effect.remaining.as_secs_f32(),
                })
                .collect(),
            summons: state.summons.len(),
        }
    }
}

/// Everything observable at one instant.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationSnapshot {
    pub now: SimTime,
    pub characters: Vec<CharacterSnapshot>,
    pub pending_timers: usize,
}
