//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up the command channel and
//! the outbound relay queue, and exposes a builder-based API for clients.
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use skill_core::{Character, Simulation, SkillCatalog, SkillDefinition, SkillEngine, SkillEnv};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::config::RuntimeConfig;
use crate::sync::{ChannelSyncAdapter, SyncLink, WireMessage};
use crate::workers::{Command, SimulationWorker};

/// Main runtime that drives a [`Simulation`] on a background task.
///
/// [`RuntimeHandle`] provides a cloneable façade for clients. Relay frames
/// produced by successful casts are available through
/// [`take_outbound`](Self::take_outbound).
pub struct SkillRuntime {
    handle: RuntimeHandle,
    worker: JoinHandle<()>,
    outbound: Option<mpsc::Receiver<WireMessage>>,
    link: SyncLink,
}

impl SkillRuntime {
    pub fn builder() -> SkillRuntimeBuilder {
        SkillRuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    /// Connectivity flag of the relay transport.
    ///
    /// Disconnecting it makes every cast stay local until it is reconnected.
    pub fn link(&self) -> &SyncLink {
        &self.link
    }

    /// Takes the receiving end of the relay queue.
    ///
    /// Returns `None` when sync is disabled or the queue was already taken.
    pub fn take_outbound(&mut self) -> Option<mpsc::Receiver<WireMessage>> {
        self.outbound.take()
    }

    /// Stops the worker and waits for it to finish.
    pub async fn shutdown(self) -> Result<()> {
        // A closed channel means the worker has already stopped.
        let _ = self.handle.shutdown().await;
        drop(self.handle);

        self.worker.await.map_err(RuntimeError::WorkerJoin)?;
        info!("skill runtime stopped");
        Ok(())
    }
}

/// Builder for [`SkillRuntime`].
pub struct SkillRuntimeBuilder {
    config: RuntimeConfig,
    catalog: SkillCatalog,
    env: SkillEnv,
    characters: Vec<Character>,
}

impl SkillRuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            catalog: SkillCatalog::default(),
            env: SkillEnv::default(),
            characters: Vec::new(),
        }
    }

    /// Override runtime configuration.
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(mut self, catalog: SkillCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Convenience for building the catalog from plain definitions.
    pub fn skills(self, definitions: impl IntoIterator<Item = SkillDefinition>) -> Self {
        self.catalog(SkillCatalog::new(definitions))
    }

    /// Collision, spawner, and summon collaborators used by the engine.
    pub fn env(mut self, env: SkillEnv) -> Self {
        self.env = env;
        self
    }

    pub fn character(mut self, character: Character) -> Self {
        self.characters.push(character);
        self
    }

    pub fn characters(mut self, characters: impl IntoIterator<Item = Character>) -> Self {
        self.characters.extend(characters);
        self
    }

    /// Build the runtime and start its worker.
    pub async fn build(self) -> Result<SkillRuntime> {
        let mut engine = SkillEngine::new(self.config.engine.clone());
        let link = SyncLink::new(self.config.sync_enabled);

        let outbound = if self.config.sync_enabled {
            let (adapter, frames) =
                ChannelSyncAdapter::channel(self.config.sync_buffer_size, link.clone());
            engine = engine.with_sync(Arc::new(adapter));
            Some(frames)
        } else {
            None
        };

        let mut simulation = Simulation::new(engine)
            .with_catalog(self.catalog)
            .with_env(self.env);
        for character in self.characters {
            simulation.spawn(character);
        }

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let handle = RuntimeHandle::new(command_tx);

        let worker = SimulationWorker::new(simulation, command_rx, self.config.tick);
        let worker = tokio::spawn(async move {
            worker.run().await;
        });

        info!(
            sync_enabled = self.config.sync_enabled,
            "skill runtime started"
        );

        Ok(SkillRuntime {
            handle,
            worker,
            outbound,
            link,
        })
    }
}
