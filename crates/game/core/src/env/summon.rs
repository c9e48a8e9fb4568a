use std::time::Duration;

use crate::skill::{AssetRef, SkillId};
use crate::state::{CharacterId, Vec3};

/// Opaque handle of a companion created by a [`SummonFactory`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SummonHandle(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub struct SummonRequest {
    pub owner: CharacterId,
    pub skill: SkillId,
    pub template: AssetRef,
    pub position: Vec3,
    pub count: u32,
    pub damage: f32,
    /// Zero for companions without a time limit.
    pub duration: Duration,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SummonError {
    #[error("summon template `{0}` is not available")]
    TemplateUnavailable(AssetRef),

    #[error("summon rejected: {0}")]
    Rejected(String),
}

/// Creates and removes companions in the scene.
///
/// The engine only records which handles belong to which caster; the
/// companions' behavior is the factory's concern.
pub trait SummonFactory: Send {
    fn summon(&mut self, request: &SummonRequest) -> Result<Vec<SummonHandle>, SummonError>;

    fn dismiss(&mut self, owner: CharacterId, handles: &[SummonHandle]);
}
