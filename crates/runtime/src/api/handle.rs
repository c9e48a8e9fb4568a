//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! casting, moving the clock, and feeding frames received from peers.
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use skill_core::{
    AdvanceReport, CastTarget, Character, CharacterId, ExecutionReport, ExecutionResult,
    NetworkId, ProjectileHandle, SimulationSnapshot, SkillId,
};

use super::errors::{Result, RuntimeError};
use crate::sync::WireMessage;
use crate::workers::Command;

/// Client-facing handle to interact with the runtime.
#[derive(Clone, Debug)]
pub struct RuntimeHandle {
    command_tx: mpsc::Sender<Command>,
}

impl RuntimeHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>) -> Self {
        Self { command_tx }
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Adds a character, replacing any previous one with the same id.
    pub async fn spawn(&self, character: Character) -> Result<()> {
        let character = Box::new(character);
        self.request(|reply| Command::Spawn { character, reply })
            .await
    }

    pub async fn despawn(&self, character: CharacterId) -> Result<bool> {
        self.request(|reply| Command::Despawn { character, reply })
            .await
    }

    /// Casts a catalog skill with cooldown and mana gating.
    pub async fn cast(
        &self,
        skill: SkillId,
        caster: CharacterId,
        target: CastTarget,
    ) -> Result<ExecutionReport> {
        let report = self
            .request(|reply| Command::Cast {
                skill,
                caster,
                target,
                reply,
            })
            .await??;
        Ok(report)
    }

    /// Ends a transformation early. Returns false when there was none.
    pub async fn revert(&self, character: CharacterId) -> Result<bool> {
        self.request(|reply| Command::Revert { character, reply })
            .await
    }

    /// Moves the simulation clock forward by `dt`.
    pub async fn advance(&self, dt: Duration) -> Result<AdvanceReport> {
        self.request(|reply| Command::Advance { dt, reply }).await
    }

    /// Reports that an untargeted projectile hit `victim`.
    pub async fn projectile_hit(
        &self,
        projectile: ProjectileHandle,
        victim: CharacterId,
    ) -> Result<Option<ExecutionResult>> {
        self.request(|reply| Command::ProjectileHit {
            projectile,
            victim,
            reply,
        })
        .await
    }

    /// Applies a message received from `sender`. Nothing is re-broadcast.
    pub async fn apply_remote(
        &self,
        sender: Option<NetworkId>,
        message: WireMessage,
    ) -> Result<()> {
        self.request(|reply| Command::ApplyRemote {
            sender,
            message,
            reply,
        })
        .await??;
        Ok(())
    }

    /// Decodes a JSON relay frame and applies it.
    pub async fn receive_frame(&self, sender: Option<NetworkId>, frame: &str) -> Result<()> {
        let message = WireMessage::from_json(frame)?;
        self.apply_remote(sender, message).await
    }

    /// Read-only view of every character.
    pub async fn snapshot(&self) -> Result<SimulationSnapshot> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    pub(crate) async fn shutdown(&self) -> Result<()> {
        self.command_tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }
}
