//! Background tasks owned by the runtime.
mod simulation;

pub(crate) use simulation::{Command, SimulationWorker};
