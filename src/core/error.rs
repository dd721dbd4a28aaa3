//! Error handling logic

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error types raised by the simulator, the search engine and the API facade.
///
/// Every failure is local to the call that produced it. Nothing here is fatal
/// to the process; the facade turns each variant into a structured response.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QsimError {
    /// Malformed input: non-positive qubit count, empty possibility map,
    /// zero step budget, equal control/target, all-non-positive weights.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// InvalidArgument failure message
        message: String,
    },

    /// A qubit index outside `[0, num_qubits)`.
    #[error("Invalid qubit index {index}: register has {num_qubits} qubit(s)")]
    InvalidQubitIndex {
        /// The offending index
        index: usize,
        /// Size of the register the index was checked against
        num_qubits: usize,
    },

    /// The requested register would exceed the configured qubit ceiling
    /// (or the allocator refused the amplitude buffer).
    #[error("Resource exceeded: {requested} qubit(s) requested, ceiling is {ceiling}")]
    ResourceExceeded {
        /// Requested qubit count
        requested: usize,
        /// Configured ceiling
        ceiling: usize,
    },

    /// A circuit with this identifier is already registered.
    #[error("Duplicate identifier: circuit '{id}' already exists")]
    DuplicateIdentifier {
        /// The identifier that collided
        id: String,
    },

    /// No circuit is registered under this identifier.
    #[error("Not found: no circuit registered as '{id}'")]
    NotFound {
        /// The identifier that was looked up
        id: String,
    },

    /// Post-gate norm check detected drift. Signals an implementation bug,
    /// never bad input.
    #[error("Numerical instability: state norm {norm} deviates from 1 by more than {tolerance}")]
    NumericalInstability {
        /// Sum of squared amplitude magnitudes that was observed
        norm: f64,
        /// Tolerance that was exceeded
        tolerance: f64,
    },
}

impl QsimError {
    /// Shorthand for building an `InvalidArgument`.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        QsimError::InvalidArgument { message: message.into() }
    }

    /// The serialisable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            QsimError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            QsimError::InvalidQubitIndex { .. } => ErrorKind::InvalidQubitIndex,
            QsimError::ResourceExceeded { .. } => ErrorKind::ResourceExceeded,
            QsimError::DuplicateIdentifier { .. } => ErrorKind::DuplicateIdentifier,
            QsimError::NotFound { .. } => ErrorKind::NotFound,
            QsimError::NumericalInstability { .. } => ErrorKind::NumericalInstability,
        }
    }
}

/// Error taxonomy as exposed across the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidArgument,
    InvalidQubitIndex,
    ResourceExceeded,
    DuplicateIdentifier,
    NotFound,
    NumericalInstability,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::InvalidQubitIndex => "InvalidQubitIndex",
            ErrorKind::ResourceExceeded => "ResourceExceeded",
            ErrorKind::DuplicateIdentifier => "DuplicateIdentifier",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::NumericalInstability => "NumericalInstability",
        };
        f.write_str(name)
    }
}
