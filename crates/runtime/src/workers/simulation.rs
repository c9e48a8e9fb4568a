//! Simulation worker that owns the authoritative [`skill_core::Simulation`].
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), runs them
//! against the simulation, and advances the clock on a fixed step.
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, trace, warn};

use skill_core::{
    AdvanceReport, CastError, CastTarget, Character, CharacterId, ExecutionReport, ExecutionResult,
    GameError, NetworkId, ProjectileHandle, RemoteError, Simulation, SimulationSnapshot, SkillId,
};

use crate::sync::WireMessage;

/// Commands that can be sent to the simulation worker.
pub(crate) enum Command {
    Spawn {
        character: Box<Character>,
        reply: oneshot::Sender<()>,
    },
    Despawn {
        character: CharacterId,
        reply: oneshot::Sender<bool>,
    },
    /// Gated cast of a catalog skill.
    Cast {
        skill: SkillId,
        caster: CharacterId,
        target: CastTarget,
        reply: oneshot::Sender<Result<ExecutionReport, CastError>>,
    },
    Revert {
        character: CharacterId,
        reply: oneshot::Sender<bool>,
    },
    /// Moves the clock manually, on top of the fixed step.
    Advance {
        dt: Duration,
        reply: oneshot::Sender<AdvanceReport>,
    },
    ProjectileHit {
        projectile: ProjectileHandle,
        victim: CharacterId,
        reply: oneshot::Sender<Option<ExecutionResult>>,
    },
    /// A frame received from a peer.
    ApplyRemote {
        sender: Option<NetworkId>,
        message: WireMessage,
        reply: oneshot::Sender<Result<(), RemoteError>>,
    },
    Snapshot {
        reply: oneshot::Sender<SimulationSnapshot>,
    },
    Shutdown,
}

/// Background task that processes skill commands.
pub(crate) struct SimulationWorker {
    simulation: Simulation,
    command_rx: mpsc::Receiver<Command>,
    tick: Duration,
}

impl SimulationWorker {
    pub(crate) fn new(
        simulation: Simulation,
        command_rx: mpsc::Receiver<Command>,
        tick: Duration,
    ) -> Self {
        info!(
            characters = simulation.roster().len(),
            skills = simulation.catalog().len(),
            tick_ms = tick.as_millis() as u64,
            "simulation worker initialized"
        );
        Self {
            simulation,
            command_rx,
            tick,
        }
    }

    /// Main worker loop. Ends on [`Command::Shutdown`] or when every handle
    /// has been dropped.
    pub(crate) async fn run(mut self) {
        if self.tick.is_zero() {
            while let Some(cmd) = self.command_rx.recv().await {
                if !self.handle_command(cmd) {
                    break;
                }
            }
        } else {
            let mut ticker = time::interval(self.tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    cmd = self.command_rx.recv() => {
                        let Some(cmd) = cmd else { break };
                        if !self.handle_command(cmd) {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        self.step(self.tick);
                    }
                }
            }
        }
        debug!(now = %self.simulation.now(), "simulation worker stopped");
    }

    fn step(&mut self, dt: Duration) -> AdvanceReport {
        let report = self.simulation.advance(dt);
        if !report.deaths.is_empty() {
            info!(deaths = ?report.deaths, now = %report.now, "characters died");
        }
        trace!(now = %report.now, timers = report.timers_fired, "tick");
        report
    }

    /// Returns false when the worker should stop.
    fn handle_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Spawn { character, reply } => {
                self.simulation.spawn(*character);
                if reply.send(()).is_err() {
                    debug!("Spawn reply channel closed (caller dropped)");
                }
            }
            Command::Despawn { character, reply } => {
                let removed = self.simulation.despawn(character).is_some();
                if reply.send(removed).is_err() {
                    debug!("Despawn reply channel closed (caller dropped)");
                }
            }
            Command::Cast {
                skill,
                caster,
                target,
                reply,
            } => {
                let result = self.simulation.cast_by_id(skill, caster, &target);
                if let Err(err) = &result {
                    debug!(%skill, %caster, code = err.error_code(), %err, "cast refused");
                }
                if reply.send(result).is_err() {
                    debug!("Cast reply channel closed (caller dropped)");
                }
            }
            Command::Revert { character, reply } => {
                let reverted = self.simulation.revert_transformation(character);
                if reply.send(reverted).is_err() {
                    debug!("Revert reply channel closed (caller dropped)");
                }
            }
            Command::Advance { dt, reply } => {
                let report = self.step(dt);
                if reply.send(report).is_err() {
                    debug!("Advance reply channel closed (caller dropped)");
                }
            }
            Command::ProjectileHit {
                projectile,
                victim,
                reply,
            } => {
                let result = self.simulation.projectile_hit(projectile, victim);
                if reply.send(result).is_err() {
                    debug!("ProjectileHit reply channel closed (caller dropped)");
                }
            }
            Command::ApplyRemote {
                sender,
                message,
                reply,
            } => {
                let result = self.apply_remote(sender, message);
                if reply.send(result).is_err() {
                    debug!("ApplyRemote reply channel closed (caller dropped)");
                }
            }
            Command::Snapshot { reply } => {
                if reply.send(self.simulation.snapshot()).is_err() {
                    debug!("Snapshot reply channel closed (caller dropped)");
                }
            }
            Command::Shutdown => return false,
        }
        true
    }

    fn apply_remote(
        &mut self,
        sender: Option<NetworkId>,
        message: WireMessage,
    ) -> Result<(), RemoteError> {
        let origin = sender
            .as_ref()
            .and_then(|id| self.simulation.find_peer(id));
        let name = message.name();
        let result = self.simulation.apply_remote(origin, &message.into_event());
        if let Err(err) = &result {
            warn!(event = name, code = err.error_code(), %err, "remote event not applied");
        }
        result
    }
}
