// src/simulation/engine.rs
use crate::core::{BasisProbability, QsimError, StateVector, DEFAULT_MAX_QUBITS, DEFAULT_NORM_TOLERANCE};
use crate::operations::{Gate, Matrix2, Operation};
use crate::validation::check_normalization;
use num_complex::Complex;
use num_traits::Zero;
use rand::SeedableRng;
use rand::distr::{Distribution, StandardUniform};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace, warn};

/// Settings for creating registers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Largest register that may be allocated.
    pub max_qubits: usize,
    /// Seed for measurement sampling. `None` draws a fresh seed.
    pub seed: Option<u64>,
    /// Allowed drift of the squared norm after a gate.
    pub norm_tolerance: f64,
    /// Run the norm self-check after every gate.
    pub verify_norm: bool,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            max_qubits: DEFAULT_MAX_QUBITS,
            seed: None,
            norm_tolerance: DEFAULT_NORM_TOLERANCE,
            verify_norm: true,
        }
    }
}

impl SimulatorConfig {
    /// Default config with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed), ..Self::default() }
    }

    /// Rejects settings that cannot describe a usable register.
    pub fn validate(&self) -> Result<(), QsimError> {
        if self.max_qubits < 1 || self.max_qubits >= usize::BITS as usize {
            return Err(QsimError::invalid_argument(format!(
                "max_qubits must be in [1, {}), got {}",
                usize::BITS,
                self.max_qubits
            )));
        }
        if !(self.norm_tolerance.is_finite() && self.norm_tolerance > 0.0) {
            return Err(QsimError::invalid_argument(format!(
                "norm_tolerance must be positive, got {}",
                self.norm_tolerance
            )));
        }
        Ok(())
    }
}

/// Exact statevector simulation of an n-qubit register.
///
/// The register exclusively owns its 2^n amplitude buffer. It is created in
/// `|0...0⟩`, evolved in place by gates and collapsed in place by measurement.
/// Qubit 0 is the most significant bit of a basis index (leftmost character
/// of a bitstring label).
#[derive(Debug)]
pub struct QuantumRegister {
    state: StateVector,
    rng: StdRng,
    norm_tolerance: f64,
    verify_norm: bool,
}

impl QuantumRegister {
    /// Creates an n-qubit register with the default configuration.
    pub fn new(num_qubits: usize) -> Result<Self, QsimError> {
        Self::with_config(num_qubits, &SimulatorConfig::default())
    }

    /// Creates an n-qubit register.
    ///
    /// # Errors
    /// * `InvalidArgument` if `num_qubits < 1`.
    /// * `ResourceExceeded` if `num_qubits` exceeds `config.max_qubits`. The
    ///   check happens before any allocation.
    pub fn with_config(num_qubits: usize, config: &SimulatorConfig) -> Result<Self, QsimError> {
        if num_qubits < 1 {
            return Err(QsimError::invalid_argument("a register needs at least one qubit"));
        }
        if num_qubits > config.max_qubits {
            warn!(requested = num_qubits, ceiling = config.max_qubits, "qubit ceiling exceeded");
            return Err(QsimError::ResourceExceeded { requested: num_qubits, ceiling: config.max_qubits });
        }

        let state = StateVector::zero_state(num_qubits).map_err(|e| match e {
            QsimError::ResourceExceeded { requested, .. } => {
                QsimError::ResourceExceeded { requested, ceiling: config.max_qubits }
            }
            other => other,
        })?;
        let seed = config.seed.unwrap_or_else(rand::random::<u64>);
        debug!(num_qubits, seed, "register allocated");

        Ok(Self {
            state,
            rng: StdRng::seed_from_u64(seed),
            norm_tolerance: config.norm_tolerance,
            verify_norm: config.verify_norm,
        })
    }

    /// Fresh 2-qubit register prepared in `(|00⟩ + |11⟩)/√2`.
    pub fn bell_state(config: &SimulatorConfig) -> Result<Self, QsimError> {
        let mut register = Self::with_config(2, config)?;
        register.prepare_bell()?;
        Ok(register)
    }

    /// Fresh n-qubit register prepared in `(|0...0⟩ + |1...1⟩)/√2`.
    pub fn ghz_state(num_qubits: usize, config: &SimulatorConfig) -> Result<Self, QsimError> {
        let mut register = Self::with_config(num_qubits, config)?;
        register.prepare_ghz()?;
        Ok(register)
    }

    /// Applies H(0), CNOT(0→1) to this register. Needs at least two qubits.
    pub fn prepare_bell(&mut self) -> Result<(), QsimError> {
        if self.num_qubits() < 2 {
            return Err(QsimError::invalid_argument("a Bell pair needs at least two qubits"));
        }
        self.apply_gate(Gate::H, 0)?;
        self.apply_controlled(Gate::X, 0, 1)
    }

    /// Applies H(0) then CNOT(i→i+1) for every neighbouring pair.
    pub fn prepare_ghz(&mut self) -> Result<(), QsimError> {
        self.apply_gate(Gate::H, 0)?;
        for i in 0..self.num_qubits() - 1 {
            self.apply_controlled(Gate::X, i, i + 1)?;
        }
        Ok(())
    }

    /// Number of qubits; fixed for the register's lifetime.
    pub fn num_qubits(&self) -> usize {
        self.state.num_qubits()
    }

    /// Read-only view of the state.
    pub fn state(&self) -> &StateVector {
        &self.state
    }

    /// Read-only view of the amplitudes.
    pub fn amplitudes(&self) -> &[Complex<f64>] {
        self.state.amplitudes()
    }

    /// `|amplitude|^2` of a basis index.
    pub fn probability_of(&self, index: usize) -> Result<f64, QsimError> {
        self.state
            .amplitudes()
            .get(index)
            .map(|a| a.norm_sqr())
            .ok_or_else(|| QsimError::invalid_argument(format!("basis index {} out of range 0..{}", index, self.state.dim())))
    }

    /// Sum of squared amplitude magnitudes.
    pub fn norm_squared(&self) -> f64 {
        self.state.norm_squared()
    }

    /// Returns the register to `|0...0⟩`.
    pub fn reset(&mut self) {
        self.state.reset();
        debug!(num_qubits = self.num_qubits(), "register reset");
    }

    /// Basis probabilities, sorted descending, optionally capped at `top_n`.
    pub fn probabilities(&self, top_n: Option<usize>) -> Vec<BasisProbability> {
        self.state.probabilities(top_n)
    }

    /// Applies one operation. Measurements return their bits, gates return an
    /// empty vector.
    pub fn apply(&mut self, op: &Operation) -> Result<Vec<u8>, QsimError> {
        match op {
            Operation::Single { gate, target } => self.apply_gate(*gate, *target).map(|_| Vec::new()),
            Operation::Controlled { gate, control, target } => {
                self.apply_controlled(*gate, *control, *target).map(|_| Vec::new())
            }
            Operation::Swap { a, b } => self.apply_swap(*a, *b).map(|_| Vec::new()),
            Operation::Measure { targets } if targets.is_empty() => self.measure_all(),
            Operation::Measure { targets } => self.measure(targets),
        }
    }

    /// Applies a single-qubit gate.
    ///
    /// The amplitudes are split into blocks of `2 * stride` where `stride` is
    /// the weight of the target bit; in each block the lower half has the bit
    /// at 0 and the upper half at 1, so zipping the halves walks every pair.
    ///
    /// # Errors
    /// * `InvalidQubitIndex` if `target` is out of range.
    /// * `InvalidArgument` for a non-finite rotation angle. The state is
    ///   untouched in both cases.
    pub fn apply_gate(&mut self, gate: Gate, target: usize) -> Result<(), QsimError> {
        gate.validate()?;
        self.check_qubit(target)?;
        let m = gate.matrix();
        let stride = self.bit_weight(target);
        for block in self.state.amplitudes_mut().chunks_exact_mut(2 * stride) {
            let (lo, hi) = block.split_at_mut(stride);
            apply_matrix_to_pairs(&m, lo, hi);
        }
        trace!(gate = gate.symbol(), target, "gate applied");
        self.verify()
    }

    /// Applies `gate` to `target` wherever `control` is 1.
    ///
    /// # Errors
    /// * `InvalidQubitIndex` if either index is out of range.
    /// * `InvalidArgument` if `control == target` or the angle is not finite.
    pub fn apply_controlled(&mut self, gate: Gate, control: usize, target: usize) -> Result<(), QsimError> {
        gate.validate()?;
        self.check_pair(control, target)?;
        let c_mask = self.bit_weight(control);
        let t_mask = self.bit_weight(target);
        let amps = self.state.amplitudes_mut();

        match gate {
            Gate::X => for_each_controlled_pair(amps, c_mask, t_mask, |lo, hi| lo.swap_with_slice(hi)),
            Gate::Z => for_each_controlled_pair(amps, c_mask, t_mask, |_, hi| {
                for amp in hi.iter_mut() {
                    *amp = -*amp;
                }
            }),
            _ => {
                let m = gate.matrix();
                for_each_controlled_pair(amps, c_mask, t_mask, |lo, hi| apply_matrix_to_pairs(&m, lo, hi));
            }
        }
        trace!(gate = gate.symbol(), control, target, "controlled gate applied");
        self.verify()
    }

    /// CNOT (controlled X).
    pub fn cnot(&mut self, control: usize, target: usize) -> Result<(), QsimError> {
        self.apply_controlled(Gate::X, control, target)
    }

    /// CZ (controlled Z).
    pub fn cz(&mut self, control: usize, target: usize) -> Result<(), QsimError> {
        self.apply_controlled(Gate::Z, control, target)
    }

    /// Exchanges qubits `a` and `b`.
    pub fn apply_swap(&mut self, a: usize, b: usize) -> Result<(), QsimError> {
        self.check_pair(a, b)?;
        let (a_mask, b_mask) = (self.bit_weight(a), self.bit_weight(b));
        let (low, high) = (a_mask.min(b_mask), a_mask.max(b_mask));
        for block in self.state.amplitudes_mut().chunks_exact_mut(2 * high) {
            let (h0, h1) = block.split_at_mut(high);
            // |..0..1..> in h0 trades places with |..1..0..> in h1
            for (c0, c1) in h0.chunks_exact_mut(2 * low).zip(h1.chunks_exact_mut(2 * low)) {
                c0[low..].swap_with_slice(&mut c1[..low]);
            }
        }
        trace!(a, b, "swap applied");
        self.verify()
    }

    /// Measures every qubit; returns one bit per qubit, qubit 0 first.
    pub fn measure_all(&mut self) -> Result<Vec<u8>, QsimError> {
        let all: Vec<usize> = (0..self.num_qubits()).collect();
        self.measure(&all)
    }

    /// Measures `qubits` (in the given order) and collapses the state.
    ///
    /// A basis index is drawn with probability `|amplitude|^2`; its bits on
    /// the measured qubits are the outcome, which has exactly the marginal
    /// probability of that partial outcome. Amplitudes inconsistent with the
    /// outcome are zeroed and the survivors renormalised.
    pub fn measure(&mut self, qubits: &[usize]) -> Result<Vec<u8>, QsimError> {
        if qubits.is_empty() {
            return self.measure_all();
        }
        for &q in qubits {
            self.check_qubit(q)?;
        }

        let chosen = self.sample_index();
        let outcome: Vec<u8> = qubits.iter().map(|&q| self.bit_of(chosen, q)).collect();

        let mask = qubits.iter().fold(0usize, |acc, &q| acc | self.bit_weight(q));
        let pattern = chosen & mask;
        let amps = self.state.amplitudes_mut();
        let mut kept = 0.0;
        for (i, amp) in amps.iter_mut().enumerate() {
            if i & mask == pattern {
                kept += amp.norm_sqr();
            } else {
                *amp = Complex::zero();
            }
        }
        let scale = 1.0 / kept.sqrt();
        for amp in amps.iter_mut() {
            *amp *= scale;
        }

        debug!(?qubits, ?outcome, probability = kept, "measured");
        self.verify()?;
        Ok(outcome)
    }

    /// Draws a basis index with probability `|amplitude|^2`.
    fn sample_index(&mut self) -> usize {
        let amps = self.state.amplitudes();
        let total: f64 = amps.iter().map(|a| a.norm_sqr()).sum();
        let u: f64 = StandardUniform.sample(&mut self.rng);
        let threshold = u * total;

        let mut cumulative = 0.0;
        let mut last_nonzero = 0;
        for (i, amp) in amps.iter().enumerate() {
            let p = amp.norm_sqr();
            if p > 0.0 {
                cumulative += p;
                last_nonzero = i;
                if threshold < cumulative {
                    return i;
                }
            }
        }
        // rounding left the threshold past the final cumulative sum
        last_nonzero
    }

    /// Norm self-check; drift is an implementation bug and is logged loudly.
    fn verify(&self) -> Result<(), QsimError> {
        if !self.verify_norm {
            return Ok(());
        }
        check_normalization(&self.state, Some(self.norm_tolerance)).inspect_err(|e| {
            error!(error = %e, num_qubits = self.num_qubits(), "state norm drifted");
        })
    }

    fn check_qubit(&self, qubit: usize) -> Result<(), QsimError> {
        if qubit >= self.num_qubits() {
            return Err(QsimError::InvalidQubitIndex { index: qubit, num_qubits: self.num_qubits() });
        }
        Ok(())
    }

    fn check_pair(&self, a: usize, b: usize) -> Result<(), QsimError> {
        self.check_qubit(a)?;
        self.check_qubit(b)?;
        if a == b {
            return Err(QsimError::invalid_argument(format!(
                "two-qubit operation needs distinct qubits, got {} twice",
                a
            )));
        }
        Ok(())
    }

    /// Weight of qubit `q`'s bit in a basis index (qubit 0 is the MSB).
    fn bit_weight(&self, qubit: usize) -> usize {
        1 << (self.num_qubits() - 1 - qubit)
    }

    fn bit_of(&self, index: usize, qubit: usize) -> u8 {
        u8::from(index & self.bit_weight(qubit) != 0)
    }
}

/// Calls `f(lo, hi)` for every run of amplitudes with the control bit set,
/// where `lo` has the target bit at 0 and `hi` the matching entries at 1.
fn for_each_controlled_pair<F>(amps: &mut [Complex<f64>], c_mask: usize, t_mask: usize, mut f: F)
where
    F: FnMut(&mut [Complex<f64>], &mut [Complex<f64>]),
{
    if t_mask < c_mask {
        for block in amps.chunks_exact_mut(2 * c_mask) {
            let (_, control_set) = block.split_at_mut(c_mask);
            for pair in control_set.chunks_exact_mut(2 * t_mask) {
                let (lo, hi) = pair.split_at_mut(t_mask);
                f(lo, hi);
            }
        }
    } else {
        for block in amps.chunks_exact_mut(2 * t_mask) {
            let (t0, t1) = block.split_at_mut(t_mask);
            for (c0, c1) in t0.chunks_exact_mut(2 * c_mask).zip(t1.chunks_exact_mut(2 * c_mask)) {
                f(&mut c0[c_mask..], &mut c1[c_mask..]);
            }
        }
    }
}

/// `(a0, a1) <- (m00*a0 + m01*a1, m10*a0 + m11*a1)` over two equal-length slices.
fn apply_matrix_to_pairs(m: &Matrix2, lo: &mut [Complex<f64>], hi: &mut [Complex<f64>]) {
    for (a0, a1) in lo.iter_mut().zip(hi.iter_mut()) {
        let (x, y) = (*a0, *a1);
        *a0 = m[0][0] * x + m[0][1] * y;
        *a1 = m[1][0] * x + m[1][1] * y;
    }
}
