// src/validation/mod.rs

//! Norm checks for state vectors.
//!
//! Unitary gates and renormalised measurement both keep the squared norm at 1.
//! These checks are the self-test for that invariant: a failure means the
//! simulator itself is wrong, not that the caller passed bad input.

use crate::core::{QsimError, StateVector, DEFAULT_NORM_TOLERANCE};

/// Checks that the sum of squared amplitude magnitudes is 1 within `tolerance`
/// (default `1e-9`).
///
/// # Returns
/// * `Ok(())` if normalized within tolerance.
/// * `Err(QsimError::NumericalInstability)` otherwise.
pub fn check_normalization(state: &StateVector, tolerance: Option<f64>) -> Result<(), QsimError> {
    let tolerance = tolerance.unwrap_or(DEFAULT_NORM_TOLERANCE);
    let norm = state.norm_squared();
    if (norm - 1.0).abs() > tolerance || !norm.is_finite() {
        Err(QsimError::NumericalInstability { norm, tolerance })
    } else {
        Ok(())
    }
}

/// Full validation: length is a power of two matching the qubit count, every
/// amplitude is finite, and the state is normalized.
pub fn validate_state(state: &StateVector, norm_tolerance: Option<f64>) -> Result<(), QsimError> {
    if state.dim() != 1usize << state.num_qubits() {
        return Err(QsimError::invalid_argument(format!(
            "state of {} qubit(s) has {} amplitudes",
            state.num_qubits(),
            state.dim()
        )));
    }
    if let Some(i) = state.amplitudes().iter().position(|c| !(c.re.is_finite() && c.im.is_finite())) {
        tracing::error!(index = i, "non-finite amplitude");
        return Err(QsimError::NumericalInstability {
            norm: f64::NAN,
            tolerance: norm_tolerance.unwrap_or(DEFAULT_NORM_TOLERANCE),
        });
    }
    check_normalization(state, norm_tolerance)
}
