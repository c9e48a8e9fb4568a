//! Async host for the skill engine.
//!
//! `skill-runtime` owns a [`skill_core::Simulation`] inside a background
//! worker, advances it on a fixed step, and connects its sync channel to an
//! in-process relay. Consumers embed [`SkillRuntime`] and talk to the worker
//! through the cloneable [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`sync`] adapts the core sync sink to a channel and the relay wire format
//! - [`config`] and [`logging`] bootstrap the process
//! - `workers` keeps the simulation task internal to the crate
pub mod api;
pub mod config;
pub mod logging;
pub mod runtime;
pub mod sync;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use config::RuntimeConfig;
pub use logging::{LoggingGuard, init_logging};
pub use runtime::{SkillRuntime, SkillRuntimeBuilder};
pub use sync::{ChannelSyncAdapter, SyncLink, WireMessage};
