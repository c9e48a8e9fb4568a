//! Network replication plumbing.
//!
//! [`ChannelSyncAdapter`] is the process-side end of the relay: the engine
//! publishes [`skill_core::SyncEvent`]s into it, it converts them into
//! [`WireMessage`]s and queues them for the transport. The transport reports
//! connectivity back through a shared [`SyncLink`].
mod adapter;
mod wire;

pub use adapter::{ChannelSyncAdapter, SyncLink};
pub use wire::WireMessage;
