use std::time::Duration;

use crate::engine::SkillError;
use crate::error::{ErrorSeverity, GameError};
use crate::skill::SkillId;
use crate::state::{CharacterId, NetworkId};

/// Why [`Simulation::cast`](super::Simulation::cast) refused or failed.
///
/// Gating failures consume neither mana nor cooldown.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum CastError {
    #[error("caster {0} is not in the roster")]
    CasterNotFound(CharacterId),

    #[error("caster {0} is dead")]
    CasterDead(CharacterId),

    #[error("caster {0} cannot use skills right now")]
    Silenced(CharacterId),

    #[error("{skill} is on cooldown for another {remaining:?}")]
    OnCooldown { skill: SkillId, remaining: Duration },

    #[error("not enough mana: need {required}, have {available}")]
    InsufficientMana { required: f32, available: f32 },

    #[error("{0} is not in the catalog")]
    UnknownSkill(SkillId),

    #[error(transparent)]
    Execution(#[from] SkillError),
}

impl GameError for CastError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CasterNotFound(_) | Self::UnknownSkill(_) => ErrorSeverity::Validation,
            Self::Execution(inner) => inner.severity(),
            _ => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CasterNotFound(_) => "CAST_CASTER_NOT_FOUND",
            Self::CasterDead(_) => "CAST_CASTER_DEAD",
            Self::Silenced(_) => "CAST_SILENCED",
            Self::OnCooldown { .. } => "CAST_ON_COOLDOWN",
            Self::InsufficientMana { .. } => "CAST_INSUFFICIENT_MANA",
            Self::UnknownSkill(_) => "CAST_UNKNOWN_SKILL",
            Self::Execution(inner) => inner.error_code(),
        }
    }
}

/// Why a replicated event could not be applied locally.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("no local character for peer `{0}`")]
    UnknownPeer(NetworkId),

    #[error("`{0}` event names no character")]
    MissingSubject(&'static str),

    #[error("{0} is not in the catalog")]
    UnknownSkill(SkillId),

    #[error("{0} has no transformation model")]
    MissingModel(SkillId),
}

impl GameError for RemoteError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownPeer(_) => "REMOTE_UNKNOWN_PEER",
            Self::MissingSubject(_) => "REMOTE_MISSING_SUBJECT",
            Self::UnknownSkill(_) => "REMOTE_UNKNOWN_SKILL",
            Self::MissingModel(_) => "REMOTE_MISSING_MODEL",
        }
    }
}
