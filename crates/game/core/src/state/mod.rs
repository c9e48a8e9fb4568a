//! Per-character runtime state and the roster that owns it.
//!
//! Identifiers, spatial primitives, and the simulated clock live here so that
//! every other module can share them without depending on the engine.
mod character;
mod roster;

pub use character::{Character, CharacterRuntimeState, ResourceMeter, VisualIdentity};
pub use roster::Roster;

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};
use std::time::Duration;

/// Stable identifier of a character inside one simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterId(pub u32);

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Transport-level identity of a character (the peer's socket id).
///
/// Only characters that are replicated carry one. Sync events refer to
/// targets by network id because remote peers do not share `CharacterId`s.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkId(String);

impl NetworkId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Allegiance used for enemy/ally target filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Team(pub u8);

impl Team {
    /// Characters with no allegiance are hostile to everyone.
    pub const NEUTRAL: Self = Self(0);

    pub fn is_hostile_to(self, other: Team) -> bool {
        self == Self::NEUTRAL || other == Self::NEUTRAL || self != other
    }
}

// ============================================================================
// Spatial primitives
// ============================================================================

/// World-space vector. `y` is up.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);
    pub const FORWARD: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(self, other: Vec3) -> f32 {
        (other - self).length()
    }

    /// Unit vector in the same direction, or zero for a degenerate input.
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len <= f32::EPSILON || !len.is_finite() {
            Vec3::ZERO
        } else {
            self * (1.0 / len)
        }
    }

    /// Drops the vertical component.
    pub fn flattened(self) -> Vec3 {
        Vec3::new(self.x, 0.0, self.z)
    }

    /// Direction from `self` towards `to`, or `fallback` when they coincide.
    pub fn direction_to(self, to: Vec3, fallback: Vec3) -> Vec3 {
        let dir = (to - self).normalized();
        if dir == Vec3::ZERO { fallback } else { dir }
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// Orientation quaternion carried by visual effect events.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Rotation about the up axis that turns `Vec3::FORWARD` into `direction`.
    pub fn facing(direction: Vec3) -> Quat {
        let flat = direction.flattened().normalized();
        if flat == Vec3::ZERO {
            return Quat::IDENTITY;
        }
        let half = flat.x.atan2(flat.z) * 0.5;
        Quat {
            x: 0.0,
            y: half.sin(),
            z: 0.0,
            w: half.cos(),
        }
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ============================================================================
// Simulated clock
// ============================================================================

/// Milliseconds since the simulation started.
///
/// The engine never reads a wall clock; callers advance time explicitly, which
/// keeps timed behavior deterministic under test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: Self = Self(0);

    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    pub fn saturating_duration_since(self, earlier: SimTime) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for SimTime {
    type Output = SimTime;
    fn add(self, rhs: Duration) -> SimTime {
        let ms = u64::try_from(rhs.as_millis()).unwrap_or(u64::MAX);
        SimTime(self.0.saturating_add(ms))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Converts authored seconds into a duration. Non-positive or non-finite
/// values map to zero.
pub fn secs(value: f32) -> Duration {
    if value.is_finite() && value > 0.0 {
        Duration::from_secs_f32(value.min(u32::MAX as f32))
    } else {
        Duration::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_zero_vector_stays_zero() {
        assert_eq!(Vec3::ZERO.normalized(), Vec3::ZERO);
        let unit = Vec3::new(3.0, 0.0, 4.0).normalized();
        assert!((unit.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn direction_to_falls_back_when_points_coincide() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(p.direction_to(p, Vec3::FORWARD), Vec3::FORWARD);
    }

    #[test]
    fn neutral_team_is_hostile_to_everyone() {
        assert!(Team::NEUTRAL.is_hostile_to(Team::NEUTRAL));
        assert!(Team(1).is_hostile_to(Team(2)));
        assert!(!Team(1).is_hostile_to(Team(1)));
    }

    #[test]
    fn sim_time_adds_durations() {
        let t = SimTime::from_millis(500) + Duration::from_millis(1_500);
        assert_eq!(t, SimTime::from_millis(2_000));
        assert_eq!(
            t.saturating_duration_since(SimTime::from_millis(2_500)),
            Duration::ZERO
        );
    }

    #[test]
    fn secs_rejects_negative_and_nan() {
        assert_eq!(secs(-1.0), Duration::ZERO);
        assert_eq!(secs(f32::NAN), Duration::ZERO);
        assert_eq!(secs(2.5), Duration::from_millis(2_500));
    }
}
