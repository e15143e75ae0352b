//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::ElementId;

/// Domain errors represent traversal and rendering failures.
///
/// The traversal variants (`EmptyRoot`, `NoReachableNodes`, `TraversalAborted`)
/// are local to one system: callers skip that system and keep going.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("system {system} has no usable root element")]
    EmptyRoot { system: ElementId },

    #[error("root {root} of system {system} has connectors but none resolve to a system element")]
    NoReachableNodes { system: ElementId, root: ElementId },

    #[error("traversal of system {system} aborted after {limit} nodes")]
    TraversalAborted { system: ElementId, limit: usize },

    #[error("inconsistent tree: {reason}")]
    SerializationInconsistency { reason: String },

    #[error("invalid model: {message}")]
    InvalidModel { message: String },
}

impl DomainError {
    /// True for failures that only remove one system from the output.
    pub fn is_traversal_failure(&self) -> bool {
        matches!(
            self,
            DomainError::EmptyRoot { .. }
                | DomainError::NoReachableNodes { .. }
                | DomainError::TraversalAborted { .. }
        )
    }

    pub(crate) fn inconsistent(reason: impl Into<String>) -> Self {
        DomainError::SerializationInconsistency {
            reason: reason.into(),
        }
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
