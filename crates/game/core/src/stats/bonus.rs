//! Bonus application following the layered stack architecture.
//!
//! Flat → %Inc → More → Less
//!
//! Every entry is keyed by the [`ModifierSource`] that installed it, so the
//! exact contribution of one status effect or one transformation can be
//! withdrawn without disturbing anything else stacked on the same stat.

use crate::effects::EffectId;
use crate::transformation::TransformationId;

/// Owner of a stat contribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModifierSource {
    Effect(EffectId),
    Transformation(TransformationId),
}

/// A single bonus that can be applied to a stat value.
///
/// - **Flat**: additive, applied first
/// - **Increased**: percentages summed, then multiplied once
/// - **More** / **Less**: sequential multipliers
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bonus {
    Flat(f32),

    /// Stored as percentage (20.0 = +20%).
    Increased(f32),

    /// Stored as percentage (50.0 = ×1.5).
    More(f32),

    /// Stored as percentage (10.0 = ×0.9, 100.0 = ×0).
    Less(f32),
}

/// Ordered set of keyed bonuses for one stat.
///
/// ```
/// # use skill_core::stats::{Bonus, BonusStack, ModifierSource};
/// # use skill_core::effects::EffectId;
/// let mut stack = BonusStack::default();
/// stack.insert(ModifierSource::Effect(EffectId(1)), Bonus::Flat(10.0));
/// stack.insert(ModifierSource::Effect(EffectId(2)), Bonus::Increased(50.0));
/// assert_eq!(stack.apply(10.0), 30.0);
///
/// stack.remove(ModifierSource::Effect(EffectId(1)));
/// assert_eq!(stack.apply(10.0), 15.0);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BonusStack {
    entries: Vec<(ModifierSource, Bonus)>,
}

impl BonusStack {
    /// Installs `bonus` for `source`, replacing whatever that source
    /// previously contributed to this stat.
    pub fn insert(&mut self, source: ModifierSource, bonus: Bonus) -> Option<Bonus> {
        match self.entries.iter_mut().find(|(s, _)| *s == source) {
            Some((_, existing)) => Some(core::mem::replace(existing, bonus)),
            None => {
                self.entries.push((source, bonus));
                None
            }
        }
    }

    /// Withdraws the contribution of `source`, if any.
    pub fn remove(&mut self, source: ModifierSource) -> Option<Bonus> {
        let index = self.entries.iter().position(|(s, _)| *s == source)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains(&self, source: ModifierSource) -> bool {
        self.entries.iter().any(|(s, _)| *s == source)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Applies all bonuses to `base`.
    pub fn apply(&self, base: f32) -> f32 {
        let mut flat = 0.0;
        let mut increased = 0.0;
        for (_, bonus) in &self.entries {
            match *bonus {
                Bonus::Flat(v) => flat += v,
                Bonus::Increased(p) => increased += p,
                _ => {}
            }
        }

        let mut value = (base + flat) * (1.0 + increased / 100.0);
        for (_, bonus) in &self.entries {
            match *bonus {
                Bonus::More(p) => value *= 1.0 + p / 100.0,
                Bonus::Less(p) => value *= (1.0 - p / 100.0).max(0.0),
                _ => {}
            }
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectId;

    fn effect(id: u64) -> ModifierSource {
        ModifierSource::Effect(EffectId(id))
    }

    #[test]
    fn layers_apply_in_order() {
        let mut stack = BonusStack::default();
        stack.insert(effect(1), Bonus::Flat(5.0));
        stack.insert(effect(2), Bonus::Increased(20.0));
        stack.insert(effect(3), Bonus::Increased(30.0));
        stack.insert(effect(4), Bonus::More(100.0));
        stack.insert(effect(5), Bonus::Less(50.0));
        // (10 + 5) * 1.5 * 2 * 0.5
        assert_eq!(stack.apply(10.0), 22.5);
    }

    #[test]
    fn insert_replaces_same_source() {
        let mut stack = BonusStack::default();
        assert_eq!(stack.insert(effect(1), Bonus::Flat(5.0)), None);
        assert_eq!(
            stack.insert(effect(1), Bonus::Flat(15.0)),
            Some(Bonus::Flat(5.0))
        );
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.apply(0.0), 15.0);
    }

    #[test]
    fn remove_only_touches_named_source() {
        let mut stack = BonusStack::default();
        stack.insert(effect(1), Bonus::Flat(5.0));
        stack.insert(
            ModifierSource::Transformation(TransformationId(1)),
            Bonus::Flat(100.0),
        );
        stack.remove(effect(1));
        assert_eq!(stack.apply(0.0), 100.0);
        assert_eq!(stack.remove(effect(1)), None);
    }

    #[test]
    fn full_less_floors_at_zero() {
        let mut stack = BonusStack::default();
        stack.insert(effect(1), Bonus::Less(150.0));
        assert_eq!(stack.apply(40.0), 0.0);
    }
}
