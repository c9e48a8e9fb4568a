use tracing::debug;

use crate::env::SkillEnv;
use crate::schedule::Scheduler;
use crate::state::{CharacterId, Roster, SimTime};
use crate::transformation::TransformationState;

/// Mutable view of everything a skill execution may touch.
///
/// Borrowed from the owning session for the duration of one call, so the
/// engine itself stays stateless apart from configuration and its sync
/// channel.
#[derive(Debug)]
pub struct World<'a> {
    pub roster: &'a mut Roster,
    pub timers: &'a mut Scheduler,
    pub env: &'a mut SkillEnv,
    pub now: SimTime,
}

impl<'a> World<'a> {
    pub fn new(
        roster: &'a mut Roster,
        timers: &'a mut Scheduler,
        env: &'a mut SkillEnv,
        now: SimTime,
    ) -> Self {
        Self {
            roster,
            timers,
            env,
            now,
        }
    }

    /// Applies the consequences of `id` reaching zero health: effects are
    /// cleared, an active transformation is reverted, companions are
    /// dismissed, and every continuation the character owns is cancelled.
    ///
    /// Returns the transformation that ended, if any.
    pub fn handle_death(&mut self, id: CharacterId) -> Option<TransformationState> {
        let character = self.roster.get_mut(id)?;
        let cleared = character.effects.clear(&mut character.state);
        let ended = character
            .transformation
            .revert_to_original(&mut character.state, self.timers);
        let cancelled = self.timers.cancel_owned_by(id);
        self.dismiss_summons(id);

        debug!(
            character = %id,
            cleared,
            cancelled,
            reverted = ended.is_some(),
            "character died"
        );
        ended
    }

    /// Dismisses the companions owned by `owner`. Returns how many there were.
    pub fn dismiss_summons(&mut self, owner: CharacterId) -> usize {
        let Some(character) = self.roster.get_mut(owner) else {
            return 0;
        };
        let handles: Vec<_> = character.state.summons.drain(..).collect();
        if handles.is_empty() {
            return 0;
        }
        if let Some(factory) = self.env.summons() {
            factory.dismiss(owner, &handles);
        }
        handles.len()
    }
}
