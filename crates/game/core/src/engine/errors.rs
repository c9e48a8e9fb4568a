//! Error types for skill execution.

use crate::error::{ErrorSeverity, GameError};
use crate::skill::SkillId;
use crate::state::{CharacterId, Vec3};
use crate::transformation::TransformError;

/// Coarse classification used by callers deciding how to report a fizzle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SkillErrorCategory {
    /// Authored content is missing something the handler needs.
    Configuration,
    /// The chosen target is absent or unusable.
    Target,
    /// The request conflicts with the character's current state.
    StateConflict,
}

/// Why a skill execution was aborted.
///
/// Every variant is produced before any gameplay state is mutated, so a
/// failed execution leaves the world exactly as it was.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum SkillError {
    #[error("caster {0} is not in the roster")]
    CasterNotFound(CharacterId),

    #[error("caster {0} is dead")]
    CasterDead(CharacterId),

    #[error("{skill} is missing required asset `{asset}`")]
    MissingAsset { skill: SkillId, asset: &'static str },

    #[error("{skill} needs a {collaborator} collaborator")]
    MissingCollaborator {
        skill: SkillId,
        collaborator: &'static str,
    },

    #[error("{0} requires a target")]
    MissingTarget(SkillId),

    #[error("target {target} is invalid: {reason}")]
    InvalidTarget {
        target: CharacterId,
        reason: &'static str,
    },

    #[error("character {0} is already transformed")]
    AlreadyTransformed(CharacterId),

    #[error("character {0} cannot move")]
    Immobilized(CharacterId),

    #[error("path from {from:?} to {to:?} is blocked")]
    MovementBlocked { from: Vec3, to: Vec3 },

    #[error("summon failed: {0}")]
    SummonFailed(String),
}

impl SkillError {
    pub fn category(&self) -> SkillErrorCategory {
        match self {
            Self::MissingAsset { .. } | Self::MissingCollaborator { .. } => {
                SkillErrorCategory::Configuration
            }
            Self::CasterNotFound(_)
            | Self::MissingTarget(_)
            | Self::InvalidTarget { .. } => SkillErrorCategory::Target,
            Self::CasterDead(_)
            | Self::AlreadyTransformed(_)
            | Self::Immobilized(_)
            | Self::MovementBlocked { .. }
            | Self::SummonFailed(_) => SkillErrorCategory::StateConflict,
        }
    }

    pub(crate) fn from_transform(
        skill: SkillId,
        caster: CharacterId,
        error: TransformError,
    ) -> Self {
        match error {
            TransformError::MissingModel => Self::MissingAsset {
                skill,
                asset: "transformation_model",
            },
            TransformError::AlreadyTransformed(_) => Self::AlreadyTransformed(caster),
        }
    }
}

impl GameError for SkillError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::CasterNotFound(_)
            | Self::MissingAsset { .. }
            | Self::MissingCollaborator { .. } => ErrorSeverity::Validation,
            _ => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CasterNotFound(_) => "SKILL_CASTER_NOT_FOUND",
            Self::CasterDead(_) => "SKILL_CASTER_DEAD",
            Self::MissingAsset { .. } => "SKILL_MISSING_ASSET",
            Self::MissingCollaborator { .. } => "SKILL_MISSING_COLLABORATOR",
            Self::MissingTarget(_) => "SKILL_MISSING_TARGET",
            Self::InvalidTarget { .. } => "SKILL_INVALID_TARGET",
            Self::AlreadyTransformed(_) => "SKILL_ALREADY_TRANSFORMED",
            Self::Immobilized(_) => "SKILL_IMMOBILIZED",
            Self::MovementBlocked { .. } => "SKILL_MOVEMENT_BLOCKED",
            Self::SummonFailed(_) => "SKILL_SUMMON_FAILED",
        }
    }
}
