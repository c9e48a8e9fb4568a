//! Public API surface of the runtime: errors and the client handle.
mod errors;
mod handle;

pub use errors::{Result, RuntimeError};
pub use handle::RuntimeHandle;
