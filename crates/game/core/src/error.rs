//! Common error infrastructure for skill-core.
//!
//! Domain-specific errors (`SkillError`, `CastError`, `TransformError`) live
//! next to the operations that produce them. This module only provides the
//! shared classification used by logging and by the runtime when deciding
//! whether a failed command is worth surfacing to the player.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the same request may succeed later (cooldown, blocked path)
/// - **Validation**: the request is malformed for the current content
/// - **Internal**: state the engine should never reach
/// - **Fatal**: the simulation cannot continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Temporary condition; retrying later or with another target can succeed.
    Recoverable,

    /// Invalid input or content; should not be retried unchanged.
    ///
    /// Examples: skill without its required asset, unknown caster
    Validation,

    /// Unexpected state inconsistency. Indicates a bug.
    Internal,

    /// Unrecoverable error.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all skill-core errors.
///
/// - All error enums implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Used as a structured logging field and in tests.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_helpers_classify_levels() {
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert!(!ErrorSeverity::Validation.is_recoverable());
        assert!(ErrorSeverity::Internal.is_internal());
        assert!(ErrorSeverity::Fatal.is_internal());
        assert_eq!(ErrorSeverity::Validation.as_str(), "validation");
    }
}
