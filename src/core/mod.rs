// src/core/mod.rs

//! Core data structures and types

pub mod error;
pub mod state;
pub mod constants;

pub use error::{ErrorKind, QsimError};
pub use state::{BasisProbability, StateVector};
pub use constants::{AMPLITUDE_TOLERANCE, DEFAULT_MAX_QUBITS, DEFAULT_MAX_STEPS, DEFAULT_NORM_TOLERANCE};
