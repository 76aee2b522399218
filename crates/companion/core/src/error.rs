//! Common error infrastructure for companion-core.
//!
//! Domain errors (`FollowError`, `CooldownError`) live next to the component
//! that raises them. None of them escape a controller tick: the controller
//! logs them at a level derived from [`ErrorSeverity`] and turns the request
//! into a no-op.

use crate::state::EntityId;

/// Severity level of an error, used to pick the log level and recovery path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum ErrorSeverity {
    /// Bad reference or unknown identifier. The request becomes a no-op.
    ///
    /// Examples: unknown ability id, entity not found
    InvalidInput,

    /// The request is not valid in the current state. Logged at error level,
    /// no state change.
    ///
    /// Examples: start following while already following
    Precondition,

    /// Something is briefly unavailable. Not an error for the caller; the
    /// companion defers or re-resolves next tick.
    ///
    /// Examples: owner mid-transfer between maps
    Transient,

    /// The relationship is over and the companion must be dismissed.
    ///
    /// Examples: leader gone for good, companion out of range
    Terminal,
}

impl ErrorSeverity {
    /// Returns true if the condition is expected to clear by itself.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient)
    }

    /// Returns true if the condition ends the follow relationship.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminal)
    }
}

/// Common trait for all companion-core errors.
pub trait CompanionError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Logs an error raised for `companion` at the level matching its severity.
pub(crate) fn report<E: CompanionError>(companion: EntityId, error: &E) {
    let severity = error.severity();
    if severity.is_transient() {
        tracing::trace!(code = error.error_code(), %companion, "{error}");
    } else if severity.is_terminal() {
        tracing::debug!(code = error.error_code(), %companion, "{error}");
    } else {
        tracing::error!(code = error.error_code(), %companion, "{error}");
    }
}
