use std::collections::HashMap;
use std::time::Duration;

use crate::skill::SkillId;
use crate::state::{CharacterId, SimTime};

/// Per-caster, per-skill readiness deadlines.
#[derive(Clone, Debug, Default)]
pub struct Cooldowns {
    ready_at: HashMap<(CharacterId, SkillId), SimTime>,
}

impl Cooldowns {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time left before `skill` is usable again; zero when ready.
    pub fn remaining(&self, caster: CharacterId, skill: SkillId, now: SimTime) -> Duration {
        self.ready_at
            .get(&(caster, skill))
            .map_or(Duration::ZERO, |ready| ready.saturating_duration_since(now))
    }

    pub fn is_ready(&self, caster: CharacterId, skill: SkillId, now: SimTime) -> bool {
        self.remaining(caster, skill, now).is_zero()
    }

    pub fn start(&mut self, caster: CharacterId, skill: SkillId, now: SimTime, cooldown: Duration) {
        if cooldown.is_zero() {
            self.ready_at.remove(&(caster, skill));
        } else {
            self.ready_at.insert((caster, skill), now + cooldown);
        }
    }

    /// Forgets every cooldown of `caster`.
    pub fn clear(&mut self, caster: CharacterId) {
        self.ready_at.retain(|(owner, _), _| *owner != caster);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_elapses_with_time() {
        let mut cooldowns = Cooldowns::new();
        let (caster, skill) = (CharacterId(1), SkillId(7));
        cooldowns.start(caster, skill, SimTime(1_000), Duration::from_secs(2));

        assert_eq!(
            cooldowns.remaining(caster, skill, SimTime(1_500)),
            Duration::from_millis(1_500)
        );
        assert!(cooldowns.is_ready(caster, skill, SimTime(3_000)));
        assert!(cooldowns.is_ready(CharacterId(2), skill, SimTime(1_500)));
    }

    #[test]
    fn clear_forgets_one_caster() {
        let mut cooldowns = Cooldowns::new();
        cooldowns.start(CharacterId(1), SkillId(1), SimTime::ZERO, Duration::from_secs(5));
        cooldowns.start(CharacterId(2), SkillId(1), SimTime::ZERO, Duration::from_secs(5));
        cooldowns.clear(CharacterId(1));

        assert!(cooldowns.is_ready(CharacterId(1), SkillId(1), SimTime::ZERO));
        assert!(!cooldowns.is_ready(CharacterId(2), SkillId(1), SimTime::ZERO));
    }
}
