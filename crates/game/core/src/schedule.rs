//! Deadline scheduling for deferred engine work.
//!
//! Anything that must happen "later" (a transformation reverting, a summon
//! group being dismissed, the next projectile of a volley) is registered here
//! under a [`TimerKey`] instead of being left to a detached task. Every entry
//! is cancellable by key, and all entries owned by a character can be
//! dropped at once when that character dies or leaves the roster.
//!
//! The scheduler never reads a clock. [`Scheduler::pop_due`] hands back due
//! tasks one at a time so a task may schedule follow-ups that fall due within
//! the same advance.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::engine::CastTarget;
use crate::env::ProjectileHandle;
use crate::skill::SkillDefinition;
use crate::state::{CharacterId, SimTime};
use crate::transformation::TransformationId;

/// Identity of a pending continuation. At most one entry exists per key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerKey {
    TransformationRevert {
        owner: CharacterId,
    },
    SummonDismissal {
        owner: CharacterId,
    },
    ProjectileLaunch {
        owner: CharacterId,
        volley: u64,
        index: u32,
    },
    ProjectileExpiry {
        owner: CharacterId,
        projectile: ProjectileHandle,
    },
}

impl TimerKey {
    pub fn owner(&self) -> CharacterId {
        match *self {
            Self::TransformationRevert { owner }
            | Self::SummonDismissal { owner }
            | Self::ProjectileLaunch { owner, .. }
            | Self::ProjectileExpiry { owner, .. } => owner,
        }
    }
}

/// Work to perform when a deadline passes.
#[derive(Clone, Debug)]
pub enum ScheduledTask {
    RevertTransformation {
        owner: CharacterId,
        transformation: TransformationId,
    },
    DismissSummons {
        owner: CharacterId,
        generation: u64,
    },
    LaunchProjectile {
        owner: CharacterId,
        skill: Arc<SkillDefinition>,
        target: CastTarget,
        index: u32,
    },
    ExpireProjectile {
        projectile: ProjectileHandle,
    },
}

#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    queue: BTreeMap<(SimTime, u64), (TimerKey, ScheduledTask)>,
    keys: HashMap<TimerKey, (SimTime, u64)>,
    seq: u64,
    volleys: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `task` to fire at `at`. An existing entry under the same key
    /// is replaced and returned.
    pub fn schedule(
        &mut self,
        at: SimTime,
        key: TimerKey,
        task: ScheduledTask,
    ) -> Option<ScheduledTask> {
        let replaced = self.cancel(&key);
        self.seq += 1;
        let slot = (at, self.seq);
        self.queue.insert(slot, (key, task));
        self.keys.insert(key, slot);
        replaced
    }

    pub fn cancel(&mut self, key: &TimerKey) -> Option<ScheduledTask> {
        let slot = self.keys.remove(key)?;
        self.queue.remove(&slot).map(|(_, task)| task)
    }

    /// Cancels every entry owned by `owner`. Returns how many were dropped.
    pub fn cancel_owned_by(&mut self, owner: CharacterId) -> usize {
        let owned: Vec<TimerKey> = self
            .keys
            .keys()
            .filter(|key| key.owner() == owner)
            .copied()
            .collect();
        owned
            .iter()
            .filter(|key| self.cancel(key).is_some())
            .count()
    }

    /// Removes and returns the earliest entry due at or before `now`.
    pub fn pop_due(&mut self, now: SimTime) -> Option<(SimTime, TimerKey, ScheduledTask)> {
        let (&slot, _) = self.queue.first_key_value()?;
        if slot.0 > now {
            return None;
        }
        let (key, task) = self.queue.remove(&slot)?;
        self.keys.remove(&key);
        Some((slot.0, key, task))
    }

    pub fn deadline(&self, key: &TimerKey) -> Option<SimTime> {
        self.keys.get(key).map(|slot| slot.0)
    }

    pub fn is_scheduled(&self, key: &TimerKey) -> bool {
        self.keys.contains_key(key)
    }

    pub fn next_deadline(&self) -> Option<SimTime> {
        self.queue.first_key_value().map(|(slot, _)| slot.0)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Fresh id grouping the projectiles of one multi-hit cast.
    pub fn allocate_volley(&mut self) -> u64 {
        self.volleys += 1;
        self.volleys
    }
}
