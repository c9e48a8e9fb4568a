//! Replication events and the sink they are delivered to.
//!
//! The engine describes every externally visible consequence of a cast as a
//! [`SyncEvent`]. Events are collected while a handler runs and handed to the
//! [`SyncChannel`] only after the handler succeeded, in the order they were
//! produced. Delivery is best effort: with no sink attached, or with the
//! sink reporting itself disconnected, events are dropped and never queued
//! for later.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::skill::{AssetRef, SkillId, StatusEffectKind};
use crate::state::{NetworkId, Quat, Vec3};

/// What a replicated visual effect represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case")]
pub enum EffectCategory {
    Cast,
    Hit,
    Aoe,
}

/// A gameplay consequence peers need to reproduce.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SyncEvent {
    ProjectileSpawned {
        skill: SkillId,
        position: Vec3,
        direction: Vec3,
        target: Option<NetworkId>,
    },
    VisualEffect {
        category: EffectCategory,
        effect: AssetRef,
        position: Vec3,
        rotation: Quat,
        target: Option<NetworkId>,
        /// Seconds.
        duration: f32,
    },
    StatusApplied {
        target: Option<NetworkId>,
        kind: StatusEffectKind,
        magnitude: f32,
        /// Seconds.
        duration: f32,
    },
    MinionSummoned {
        skill: SkillId,
        template: AssetRef,
        position: Vec3,
        count: u32,
        /// Seconds; zero for companions without a time limit.
        duration: f32,
    },
    PlayerTransformed {
        skill: SkillId,
        /// Character that changed form, when it is not the sender itself.
        subject: Option<NetworkId>,
    },
    TransformationEnded {
        subject: Option<NetworkId>,
    },
}

impl SyncEvent {
    /// Event name on the relay protocol.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ProjectileSpawned { .. } => "projectile_spawned",
            Self::VisualEffect { .. } => "visual_effect_spawned",
            Self::StatusApplied { .. } => "effect_applied",
            Self::MinionSummoned { .. } => "minion_summoned",
            Self::PlayerTransformed { .. } => "player_transformed",
            Self::TransformationEnded { .. } => "player_transformation_ended",
        }
    }
}

/// Outbound transport for sync events.
///
/// Implementations must not block; `send` is called from inside engine
/// execution.
pub trait SyncSink: Send + Sync {
    fn is_connected(&self) -> bool;

    fn send(&self, event: SyncEvent);
}

/// Optional sink plus the connectivity gate in front of it.
#[derive(Clone, Default)]
pub struct SyncChannel {
    sink: Option<Arc<dyn SyncSink>>,
}

impl fmt::Debug for SyncChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncChannel")
            .field("attached", &self.sink.is_some())
            .finish()
    }
}

impl SyncChannel {
    pub fn new(sink: Arc<dyn SyncSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// A channel with no sink; every publish is a no-op.
    pub fn detached() -> Self {
        Self { sink: None }
    }

    pub fn is_attached(&self) -> bool {
        self.sink.is_some()
    }

    pub fn is_connected(&self) -> bool {
        self.sink.as_ref().is_some_and(|sink| sink.is_connected())
    }

    /// Sends `events` in order. Returns how many were handed to the sink.
    pub fn publish(&self, events: Vec<SyncEvent>) -> usize {
        if events.is_empty() {
            return 0;
        }
        let Some(sink) = self.sink.as_ref() else {
            trace!(count = events.len(), "no sync sink attached; events dropped");
            return 0;
        };
        if !sink.is_connected() {
            trace!(count = events.len(), "sync sink disconnected; events dropped");
            return 0;
        }
        let count = events.len();
        for event in events {
            sink.send(event);
        }
        count
    }
}

/// In-memory sink that records every event it is sent.
///
/// Connectivity can be toggled to exercise the disconnected path.
#[derive(Debug)]
pub struct RecordingSink {
    events: Mutex<Vec<SyncEvent>>,
    connected: AtomicBool,
    attempts: AtomicUsize,
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            connected: AtomicBool::new(true),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn disconnected() -> Self {
        let sink = Self::new();
        sink.set_connected(false);
        sink
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Copy of everything recorded so far.
    pub fn events(&self) -> Vec<SyncEvent> {
        self.lock().clone()
    }

    /// Drains the recorded events.
    pub fn take(&self) -> Vec<SyncEvent> {
        std::mem::take(&mut *self.lock())
    }

    /// Number of `send` calls, including any made while disconnected.
    pub fn send_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SyncEvent>> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SyncSink for RecordingSink {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn send(&self, event: SyncEvent) {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ended() -> SyncEvent {
        SyncEvent::TransformationEnded { subject: None }
    }

    #[test]
    fn detached_channel_drops_silently() {
        assert_eq!(SyncChannel::detached().publish(vec![ended()]), 0);
    }

    #[test]
    fn disconnected_sink_is_never_called() {
        let sink = Arc::new(RecordingSink::disconnected());
        let channel = SyncChannel::new(sink.clone());

        assert_eq!(channel.publish(vec![ended(), ended()]), 0);
        assert_eq!(sink.send_attempts(), 0);

        sink.set_connected(true);
        assert_eq!(channel.publish(vec![ended()]), 1);
        assert_eq!(sink.events(), vec![ended()]);
    }

    #[test]
    fn relay_names() {
        assert_eq!(ended().name(), "player_transformation_ended");
        assert_eq!(EffectCategory::Aoe.to_string(), "aoe");
    }
}
