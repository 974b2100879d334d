//! Error types for the assertion engine.
//!
//! Only abnormal conditions are errors here. A value that does not meet its
//! expected verdict is a failed [`AssertionOutcome`](crate::AssertionOutcome),
//! and a malformed verb input is a [`GroupDefect`](crate::GroupDefect) on the
//! enclosing group. What remains are faults raised by the type model itself
//! and engine-level limits, both of which abort the current assertion group.

use thiserror::Error;

use crate::config::ConfigError;

/// A fault raised by a type model while checking, coercing or sorting.
///
/// Implementations of [`TypeHandle`](crate::TypeHandle) return this when a
/// predicate cannot produce a verdict at all. The engine never recovers from
/// it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeFault {
    /// The capability ran but failed abnormally.
    #[error("{reason}")]
    Failed {
        /// Why the capability failed.
        reason: String,
    },

    /// The type does not provide the requested capability.
    #[error("operation not supported: {operation}")]
    Unsupported {
        /// The missing capability (`coerce`, `sort`, ...).
        operation: &'static str,
    },
}

impl TypeFault {
    /// Creates a new failed fault.
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Creates a new unsupported-operation fault.
    #[must_use]
    pub const fn unsupported(operation: &'static str) -> Self {
        Self::Unsupported { operation }
    }
}

/// Errors that abort an assertion group.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A type's `check`, `coerce` or `sort` capability faulted.
    #[error("{type_name}->{operation} faulted: {source}")]
    CollaboratorFault {
        /// Display name of the faulting type.
        type_name: String,
        /// The capability that was invoked.
        operation: &'static str,
        /// The underlying fault.
        #[source]
        source: TypeFault,
    },

    /// Following `parent` did not reach a root within the traversal cap.
    #[error("ancestor chain of {type_name} exceeds {limit} levels")]
    AncestorChainTooLong {
        /// Display name of the type whose chain was walked.
        type_name: String,
        /// The configured traversal cap.
        limit: usize,
    },

    /// The engine configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EngineError {
    /// Wraps a [`TypeFault`] raised by `type_name`.
    #[must_use]
    pub fn collaborator(
        type_name: impl Into<String>,
        operation: &'static str,
        source: TypeFault,
    ) -> Self {
        Self::CollaboratorFault {
            type_name: type_name.into(),
            operation,
            source,
        }
    }

    /// Creates a new ancestor-chain-too-long error.
    #[must_use]
    pub fn chain_too_long(type_name: impl Into<String>, limit: usize) -> Self {
        Self::AncestorChainTooLong {
            type_name: type_name.into(),
            limit,
        }
    }

    /// Returns `true` if the type model itself is at fault.
    #[must_use]
    pub const fn is_collaborator_fault(&self) -> bool {
        matches!(
            self,
            Self::CollaboratorFault { .. } | Self::AncestorChainTooLong { .. }
        )
    }
}
