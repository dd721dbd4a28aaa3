//! Numerical constants shared by the simulator and the search engine.

/// Default hard ceiling on register size. 2^30 complex128 entries is ~17 GB.
pub const DEFAULT_MAX_QUBITS: usize = 30;

/// Allowed deviation of the squared norm from 1 after a gate.
pub const DEFAULT_NORM_TOLERANCE: f64 = 1e-9;

/// Probabilities at or below this are treated as zero when reporting state.
pub const AMPLITUDE_TOLERANCE: f64 = 1e-12;

/// Default step budget for the tunnelling search.
pub const DEFAULT_MAX_STEPS: usize = 1000;
