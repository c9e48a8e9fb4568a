//! Unified error types surfaced by the runtime API.
//!
//! Wraps worker coordination failures together with the core's cast and
//! replication errors so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use skill_core::{CastError, ErrorSeverity, GameError, RemoteError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("simulation worker command channel closed")]
    CommandChannelClosed,

    #[error("simulation worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("simulation worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Cast(#[from] CastError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("malformed relay frame")]
    Wire(#[from] serde_json::Error),

    #[error("failed to prepare log directory")]
    LogDirectory(#[source] std::io::Error),

    #[error("a global tracing subscriber is already installed")]
    LoggingInstalled(#[source] tracing_subscriber::util::TryInitError),
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Cast(inner) => inner.severity(),
            Self::Remote(inner) => inner.severity(),
            Self::Wire(_) => ErrorSeverity::Validation,
            Self::LogDirectory(_) | Self::LoggingInstalled(_) => ErrorSeverity::Fatal,
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) | Self::WorkerJoin(_) => {
                ErrorSeverity::Internal
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            Self::Cast(inner) => inner.error_code(),
            Self::Remote(inner) => inner.error_code(),
            Self::Wire(_) => "RUNTIME_WIRE",
            Self::LogDirectory(_) => "RUNTIME_LOG_DIRECTORY",
            Self::LoggingInstalled(_) => "RUNTIME_LOGGING_INSTALLED",
        }
    }
}
