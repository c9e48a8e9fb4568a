//! Relay wire format.
//!
//! Frames are JSON objects `{"event": <name>, "data": {...}}` with camelCase
//! fields. Peers are addressed by socket id; an empty id means "none".
use serde::{Deserialize, Serialize};

use skill_core::{
    AssetRef, EffectCategory, NetworkId, Quat, SkillId, StatusEffectKind, SyncEvent, Vec3,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum WireMessage {
    #[serde(rename_all = "camelCase")]
    ProjectileSpawned {
        skill_id: SkillId,
        spawn_position: Vec3,
        direction: Vec3,
        #[serde(default, with = "socket_id")]
        target_socket_id: Option<NetworkId>,
    },

    #[serde(rename_all = "camelCase")]
    VisualEffectSpawned {
        effect_type: EffectCategory,
        effect_prefab_name: AssetRef,
        position: Vec3,
        rotation: Quat,
        #[serde(default, with = "socket_id")]
        target_socket_id: Option<NetworkId>,
        duration: f32,
    },

    #[serde(rename_all = "camelCase")]
    EffectApplied {
        #[serde(default, with = "socket_id")]
        target_socket_id: Option<NetworkId>,
        effect_type: StatusEffectKind,
        power: f32,
        duration: f32,
    },

    #[serde(rename_all = "camelCase")]
    MinionSummoned {
        skill_id: SkillId,
        template_name: AssetRef,
        position: Vec3,
        count: u32,
        duration: f32,
    },

    #[serde(rename_all = "camelCase")]
    PlayerTransformed {
        skill_id: SkillId,
        #[serde(default, with = "socket_id")]
        target_socket_id: Option<NetworkId>,
    },

    #[serde(rename_all = "camelCase")]
    PlayerTransformationEnded {
        #[serde(default, with = "socket_id")]
        target_socket_id: Option<NetworkId>,
    },
}

impl WireMessage {
    pub fn from_event(event: &SyncEvent) -> Self {
        match event.clone() {
            SyncEvent::ProjectileSpawned {
                skill,
                position,
                direction,
                target,
            } => Self::ProjectileSpawned {
                skill_id: skill,
                spawn_position: position,
                direction,
                target_socket_id: target,
            },
            SyncEvent::VisualEffect {
                category,
                effect,
                position,
                rotation,
                target,
                duration,
            } => Self::VisualEffectSpawned {
                effect_type: category,
                effect_prefab_name: effect,
                position,
                rotation,
                target_socket_id: target,
                duration,
            },
            SyncEvent::StatusApplied {
                target,
                kind,
                magnitude,
                duration,
            } => Self::EffectApplied {
                target_socket_id: target,
                effect_type: kind,
                power: magnitude,
                duration,
            },
            SyncEvent::MinionSummoned {
                skill,
                template,
                position,
                count,
                duration,
            } => Self::MinionSummoned {
                skill_id: skill,
                template_name: template,
                position,
                count,
                duration,
            },
            SyncEvent::PlayerTransformed { skill, subject } => Self::PlayerTransformed {
                skill_id: skill,
                target_socket_id: subject,
            },
            SyncEvent::TransformationEnded { subject } => Self::PlayerTransformationEnded {
                target_socket_id: subject,
            },
        }
    }

    pub fn into_event(self) -> SyncEvent {
        match self {
            Self::ProjectileSpawned {
                skill_id,
                spawn_position,
                direction,
                target_socket_id,
            } => SyncEvent::ProjectileSpawned {
                skill: skill_id,
                position: spawn_position,
                direction,
                target: target_socket_id,
            },
            Self::VisualEffectSpawned {
                effect_type,
                effect_prefab_name,
                position,
                rotation,
                target_socket_id,
                duration,
            } => SyncEvent::VisualEffect {
                category: effect_type,
                effect: effect_prefab_name,
                position,
                rotation,
                target: target_socket_id,
                duration,
            },
            Self::EffectApplied {
                target_socket_id,
                effect_type,
                power,
                duration,
            } => SyncEvent::StatusApplied {
                target: target_socket_id,
                kind: effect_type,
                magnitude: power,
                duration,
            },
            Self::MinionSummoned {
                skill_id,
                template_name,
                position,
                count,
                duration,
            } => SyncEvent::MinionSummoned {
                skill: skill_id,
                template: template_name,
                position,
                count,
                duration,
            },
            Self::PlayerTransformed {
                skill_id,
                target_socket_id,
            } => SyncEvent::PlayerTransformed {
                skill: skill_id,
                subject: target_socket_id,
            },
            Self::PlayerTransformationEnded { target_socket_id } => {
                SyncEvent::TransformationEnded {
                    subject: target_socket_id,
                }
            }
        }
    }

    /// Event name on the relay.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ProjectileSpawned { .. } => "projectile_spawned",
            Self::VisualEffectSpawned { .. } => "visual_effect_spawned",
            Self::EffectApplied { .. } => "effect_applied",
            Self::MinionSummoned { .. } => "minion_summoned",
            Self::PlayerTransformed { .. } => "player_transformed",
            Self::PlayerTransformationEnded { .. } => "player_transformation_ended",
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(frame: &str) -> serde_json::Result<Self> {
        serde_json::from_str(frame)
    }
}

/// The relay addresses "no peer" as `""`. Frames always carry the field
/// on the way out; a missing or empty id decodes to `None`.
mod socket_id {
    use serde::{Deserialize, Deserializer, Serializer};
    use skill_core::NetworkId;

    pub fn serialize<S>(id: &Option<NetworkId>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(id.as_ref().map_or("", NetworkId::as_str))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NetworkId>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let id = Option::<String>::deserialize(deserializer)?;
        Ok(id.filter(|id| !id.is_empty()).map(NetworkId::new))
    }
}
