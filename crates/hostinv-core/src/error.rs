//! Error types for the groups table controller.

use thiserror::Error;

/// Primary error type for controller operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InventoryError {
    /// A list or mutating request was rejected or could not be delivered.
    #[error("{operation} request failed: {message}")]
    Network {
        /// Operation identifier (e.g. `list_groups`).
        operation: &'static str,
        /// HTTP status when the server answered.
        status: Option<u16>,
        /// Human-readable failure description.
        message: String,
    },
    /// User input was rejected before any request was issued.
    #[error("invalid {field}: {message}")]
    Validation {
        /// Offending input field.
        field: &'static str,
        /// Human-readable failure description.
        message: String,
    },
    /// The capability boundary withheld the requested action.
    #[error("action unavailable: {reason}")]
    ActionUnavailable {
        /// User-facing explanation.
        reason: String,
    },
    /// A confirm was issued while no matching workflow was open.
    #[error("no {workflow} workflow is open")]
    NoActiveWorkflow {
        /// Workflow identifier.
        workflow: &'static str,
    },
}

impl InventoryError {
    /// Construct a network failure without an HTTP status.
    pub fn network(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Network {
            operation,
            status: None,
            message: message.into(),
        }
    }

    /// Construct a network failure for a server response.
    pub fn http(operation: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self::Network {
            operation,
            status: Some(status),
            message: message.into(),
        }
    }

    /// Construct a validation failure.
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Whether the failure came from the remote API.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

/// Convenience alias for controller results.
pub type InventoryResult<T> = Result<T, InventoryError>;
