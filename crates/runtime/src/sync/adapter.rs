use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

use skill_core::{SyncEvent, SyncSink};

use super::wire::WireMessage;

/// Connectivity flag shared between the adapter and the transport.
#[derive(Clone, Debug, Default)]
pub struct SyncLink {
    connected: Arc<AtomicBool>,
}

impl SyncLink {
    pub fn new(connected: bool) -> Self {
        Self {
            connected: Arc::new(AtomicBool::new(connected)),
        }
    }

    pub fn connect(&self) {
        self.connected.store(true, Ordering::Release);
    }

    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::Release);
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }
}

/// [`SyncSink`] that queues relay frames on a bounded channel.
///
/// `send` never blocks: when the queue is full or the transport has gone
/// away the frame is dropped. Replication is best effort and a lost frame
/// never affects local gameplay.
#[derive(Debug)]
pub struct ChannelSyncAdapter {
    frames: mpsc::Sender<WireMessage>,
    link: SyncLink,
}

impl ChannelSyncAdapter {
    /// Creates an adapter and the receiving end the transport drains.
    pub fn channel(capacity: usize, link: SyncLink) -> (Self, mpsc::Receiver<WireMessage>) {
        let (frames, rx) = mpsc::channel(capacity.max(1));
        (Self { frames, link }, rx)
    }

    pub fn link(&self) -> &SyncLink {
        &self.link
    }
}

impl SyncSink for ChannelSyncAdapter {
    fn is_connected(&self) -> bool {
        self.link.is_connected() && !self.frames.is_closed()
    }

    fn send(&self, event: SyncEvent) {
        let message = WireMessage::from_event(&event);
        match self.frames.try_send(message) {
            Ok(()) => {}
            Err(TrySendError::Full(message)) => {
                debug!(event = message.name(), "relay queue full; frame dropped");
            }
            Err(TrySendError::Closed(message)) => {
                debug!(event = message.name(), "relay closed; frame dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skill_core::{NetworkId, SyncChannel};

    fn ended() -> SyncEvent {
        SyncEvent::TransformationEnded {
            subject: Some(NetworkId::new("p1")),
        }
    }

    #[tokio::test]
    async fn connected_adapter_queues_frames() {
        let (adapter, mut rx) = ChannelSyncAdapter::channel(4, SyncLink::new(true));
        let channel = SyncChannel::new(Arc::new(adapter));

        assert_eq!(channel.publish(vec![ended()]), 1);
        let frame = rx.recv().await.unwrap();
        assert_eq!(frame.name(), "player_transformation_ended");
    }

    #[tokio::test]
    async fn disconnected_adapter_is_skipped() {
        let link = SyncLink::new(false);
        let (adapter, mut rx) = ChannelSyncAdapter::channel(4, link.clone());
        let channel = SyncChannel::new(Arc::new(adapter));

        assert_eq!(channel.publish(vec![ended()]), 0);
        assert!(rx.try_recv().is_err());

        link.connect();
        assert_eq!(channel.publish(vec![ended()]), 1);
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn full_or_closed_queues_drop_frames() {
        let (adapter, rx) = ChannelSyncAdapter::channel(1, SyncLink::new(true));
        adapter.send(ended());
        adapter.send(ended());
        assert!(adapter.is_connected());

        drop(rx);
        assert!(!adapter.is_connected());
        adapter.send(ended());
    }
}
