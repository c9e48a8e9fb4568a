//! Temporary form changes.
//!
//! A character is either in its normal form or in exactly one transformed
//! form. Transforming swaps the visual identity, stores the original so it
//! can be restored, and installs max-health and damage bonuses keyed by the
//! transformation. A finite duration registers a revert deadline with the
//! [`Scheduler`]; manual or forced reverts cancel that deadline, and a late
//! deadline for a transformation that already ended is ignored.

use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::error::{ErrorSeverity, GameError};
use crate::schedule::{ScheduledTask, Scheduler, TimerKey};
use crate::skill::{AssetRef, SkillDefinition, SkillId};
use crate::state::{secs, CharacterId, CharacterRuntimeState, SimTime, VisualIdentity};
use crate::stats::{Bonus, ModifierSource, StatKind};

/// Identifier of one transformation episode of one character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransformationId(pub u64);

impl fmt::Display for TransformationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "form:{}", self.0)
    }
}

/// Parameters of a requested transformation.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct TransformationRequest {
    pub skill: Option<SkillId>,
    pub model: Option<AssetRef>,
    /// Replacement animation controller; the original one is kept if absent.
    pub animator: Option<AssetRef>,
    /// Zero keeps the form until reverted manually.
    pub duration: Duration,
    pub hp_bonus_percent: f32,
    pub damage_bonus_percent: f32,
}

impl TransformationRequest {
    pub fn from_skill(skill: &SkillDefinition) -> Self {
        Self {
            skill: Some(skill.id),
            model: skill.assets.transformation_model.clone(),
            animator: skill.assets.transformation_animator.clone(),
            duration: secs(skill.transformation.duration),
            hp_bonus_percent: skill.transformation.hp_bonus_percent,
            damage_bonus_percent: skill.transformation.damage_bonus_percent,
        }
    }

    /// Visual-only request used for proxies of remote players.
    pub fn visual(model: AssetRef) -> Self {
        Self {
            model: Some(model),
            ..Self::default()
        }
    }
}

/// Bookkeeping for an active transformation.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformationState {
    pub id: TransformationId,
    pub skill: Option<SkillId>,
    /// Identity to restore on revert.
    pub original: VisualIdentity,
    pub model: AssetRef,
    /// Flat max-health granted.
    pub hp_bonus: f32,
    pub damage_bonus_percent: f32,
    pub started_at: SimTime,
    pub expires_at: Option<SimTime>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("transformation has no model to switch to")]
    MissingModel,

    #[error("character {0} is already transformed")]
    AlreadyTransformed(CharacterId),
}

impl GameError for TransformError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::MissingModel => ErrorSeverity::Validation,
            Self::AlreadyTransformed(_) => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingModel => "TRANSFORM_MISSING_MODEL",
            Self::AlreadyTransformed(_) => "TRANSFORM_ALREADY_ACTIVE",
        }
    }
}

#[derive(Clone, Debug)]
pub struct TransformationController {
    owner: CharacterId,
    active: Option<TransformationState>,
    next_id: u64,
}

impl TransformationController {
    pub fn new(owner: CharacterId) -> Self {
        Self {
            owner,
            active: None,
            next_id: 0,
        }
    }

    pub fn is_transformed(&self) -> bool {
        self.active.is_some()
    }

    pub fn current(&self) -> Option<&TransformationState> {
        self.active.as_ref()
    }

    /// Switches `state` into the requested form.
    ///
    /// Fails without touching anything when no model is given or when a
    /// transformation is already active.
    pub fn transform_to(
        &mut self,
        request: &TransformationRequest,
        state: &mut CharacterRuntimeState,
        now: SimTime,
        timers: &mut Scheduler,
    ) -> Result<&TransformationState, TransformError> {
        let model = request.model.clone().ok_or(TransformError::MissingModel)?;
        if self.active.is_some() {
            return Err(TransformError::AlreadyTransformed(self.owner));
        }

        self.next_id += 1;
        let id = TransformationId(self.next_id);
        let source = ModifierSource::Transformation(id);

        let original = state.visual.clone();
        state.visual = VisualIdentity {
            model: Some(model.clone()),
            animator: request.animator.clone().or_else(|| original.animator.clone()),
        };

        let hp_bonus = (state.stats.max_health * request.hp_bonus_percent / 100.0).max(0.0);
        if hp_bonus > 0.0 {
            state
                .modifiers
                .insert(StatKind::MaxHealth, source, Bonus::Flat(hp_bonus));
            state.refresh_max_health();
            state.health.restore(hp_bonus);
        }
        if request.damage_bonus_percent != 0.0 {
            state.modifiers.insert(
                StatKind::DamageBonus,
                source,
                Bonus::Flat(request.damage_bonus_percent),
            );
        }

        let expires_at = (!request.duration.is_zero()).then(|| now + request.duration);
        if let Some(at) = expires_at {
            timers.schedule(
                at,
                TimerKey::TransformationRevert { owner: self.owner },
                ScheduledTask::RevertTransformation {
                    owner: self.owner,
                    transformation: id,
                },
            );
        }

        debug!(owner = %self.owner, %id, model = %model, hp_bonus, "transformed");
        Ok(self.active.insert(TransformationState {
            id,
            skill: request.skill,
            original,
            model,
            hp_bonus,
            damage_bonus_percent: request.damage_bonus_percent,
            started_at: now,
            expires_at,
        }))
    }

    /// Restores the original form and withdraws the bonuses. Idempotent:
    /// returns `None` when already in normal form.
    pub fn revert_to_original(
        &mut self,
        state: &mut CharacterRuntimeState,
        timers: &mut Scheduler,
    ) -> Option<TransformationState> {
        let ended = self.active.take()?;
        timers.cancel(&TimerKey::TransformationRevert { owner: self.owner });

        state
            .modifiers
            .remove_source(ModifierSource::Transformation(ended.id));
        state.refresh_max_health();
        state.visual = ended.original.clone();

        debug!(owner = %self.owner, id = %ended.id, "reverted to original form");
        Some(ended)
    }

    /// Deadline handler: reverts only if `id` is still the active form.
    pub fn expire(
        &mut self,
        id: TransformationId,
        state: &mut CharacterRuntimeState,
        timers: &mut Scheduler,
    ) -> Option<TransformationState> {
        if self.active.as_ref().map(|t| t.id) != Some(id) {
            return None;
        }
        self.revert_to_original(state, timers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::CharacterStats;

    fn setup() -> (TransformationController, CharacterRuntimeState, Scheduler) {
        let id = CharacterId(1);
        let mut state = CharacterRuntimeState::new(id, CharacterStats::new(100.0, 50.0));
        state.visual = VisualIdentity::new(AssetRef::new("paladin"))
            .with_animator(AssetRef::new("paladin_anim"));
        (TransformationController::new(id), state, Scheduler::new())
    }

    fn bear(duration: u64) -> TransformationRequest {
        TransformationRequest {
            model: Some(AssetRef::new("bear")),
            duration: Duration::from_secs(duration),
            hp_bonus_percent: 50.0,
            damage_bonus_percent: 25.0,
            ..TransformationRequest::default()
        }
    }

    #[test]
    fn transform_swaps_model_and_grants_bonuses() {
        let (mut ctl, mut state, mut timers) = setup();
        ctl.transform_to(&bear(30), &mut state, SimTime(1_000), &mut timers)
            .unwrap();

        assert_eq!(state.visual.model, Some(AssetRef::new("bear")));
        assert_eq!(state.visual.animator, Some(AssetRef::new("paladin_anim")));
        assert_eq!(state.health.maximum, 150.0);
        assert_eq!(state.health.current, 150.0);
        assert_eq!(state.damage_bonus_percent(), 25.0);
        assert_eq!(
            timers.deadline(&TimerKey::TransformationRevert {
                owner: CharacterId(1)
            }),
            Some(SimTime(31_000))
        );
    }

    #[test]
    fn second_transform_is_rejected_without_changes() {
        let (mut ctl, mut state, mut timers) = setup();
        ctl.transform_to(&bear(30), &mut state, SimTime::ZERO, &mut timers)
            .unwrap();
        let snapshot = state.clone();

        let mut wolf = bear(10);
        wolf.model = Some(AssetRef::new("wolf"));
        let err = ctl
            .transform_to(&wolf, &mut state, SimTime::ZERO, &mut timers)
            .unwrap_err();

        assert_eq!(err, TransformError::AlreadyTransformed(CharacterId(1)));
        assert_eq!(state, snapshot);
    }

    #[test]
    fn missing_model_fails_cleanly() {
        let (mut ctl, mut state, mut timers) = setup();
        let err = ctl
            .transform_to(
                &TransformationRequest::default(),
                &mut state,
                SimTime::ZERO,
                &mut timers,
            )
            .unwrap_err();
        assert_eq!(err, TransformError::MissingModel);
        assert!(!ctl.is_transformed());
        assert!(timers.is_empty());
    }

    #[test]
    fn revert_restores_and_clamps_health() {
        let (mut ctl, mut state, mut timers) = setup();
        ctl.transform_to(&bear(30), &mut state, SimTime::ZERO, &mut timers)
            .unwrap();
        state.health.drain(10.0);

        let ended = ctl.revert_to_original(&mut state, &mut timers);
        assert!(ended.is_some());
        assert_eq!(state.visual.model, Some(AssetRef::new("paladin")));
        assert_eq!(state.health.maximum, 100.0);
        assert_eq!(state.health.current, 100.0);
        assert!(state.modifiers.is_empty());
        assert!(timers.is_empty());

        assert!(ctl.revert_to_original(&mut state, &mut timers).is_none());
    }

    #[test]
    fn stale_deadline_is_ignored() {
        let (mut ctl, mut state, mut timers) = setup();
        let first = ctl
            .transform_to(&bear(30), &mut state, SimTime::ZERO, &mut timers)
            .unwrap()
            .id;
        ctl.revert_to_original(&mut state, &mut timers);
        ctl.transform_to(&bear(0), &mut state, SimTime::ZERO, &mut timers)
            .unwrap();

        assert!(ctl.expire(first, &mut state, &mut timers).is_none());
        assert!(ctl.is_transformed());
    }
}
