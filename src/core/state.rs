// src/core/state.rs

use super::constants::AMPLITUDE_TOLERANCE;
use super::error::QsimError;
use num_complex::Complex;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;

/// Dense amplitude buffer of an n-qubit register.
///
/// Index `k` holds the amplitude of the basis state whose bitstring is the
/// binary expansion of `k`, with qubit 0 as the most significant bit. The same
/// convention is used by gate application, probability extraction and
/// measurement.
#[derive(Debug, Clone, PartialEq)] // Avoid Eq for floating-point complex numbers
pub struct StateVector {
    num_qubits: usize,
    amplitudes: Vec<Complex<f64>>,
}

impl StateVector {
    /// Allocates `|0...0⟩` for `num_qubits` qubits.
    ///
    /// The buffer is reserved with `try_reserve_exact`, so an allocation the
    /// system refuses surfaces as `ResourceExceeded` instead of an abort.
    pub(crate) fn zero_state(num_qubits: usize) -> Result<Self, QsimError> {
        let exceeded = || QsimError::ResourceExceeded { requested: num_qubits, ceiling: usize::BITS as usize - 1 };
        let dim = 1usize.checked_shl(num_qubits as u32).filter(|d| *d > 0).ok_or_else(exceeded)?;

        let mut amplitudes = Vec::new();
        amplitudes.try_reserve_exact(dim).map_err(|_| exceeded())?;
        amplitudes.resize(dim, Complex::zero());
        amplitudes[0] = Complex::one();

        Ok(Self { num_qubits, amplitudes })
    }

    /// Builds a state from explicit amplitudes. The length must be a power of two.
    pub fn from_amplitudes(amplitudes: Vec<Complex<f64>>) -> Result<Self, QsimError> {
        let dim = amplitudes.len();
        if dim < 2 || !dim.is_power_of_two() {
            return Err(QsimError::invalid_argument(format!(
                "state vector length must be a power of two >= 2, got {}",
                dim
            )));
        }
        Ok(Self { num_qubits: dim.trailing_zeros() as usize, amplitudes })
    }

    /// Number of qubits represented.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Dimension (2^n).
    pub fn dim(&self) -> usize {
        self.amplitudes.len()
    }

    /// Read-only view of the amplitudes.
    pub fn amplitudes(&self) -> &[Complex<f64>] {
        &self.amplitudes
    }

    pub(crate) fn amplitudes_mut(&mut self) -> &mut [Complex<f64>] {
        &mut self.amplitudes
    }

    /// Sum of squared magnitudes.
    pub fn norm_squared(&self) -> f64 {
        self.amplitudes.iter().map(|c| c.norm_sqr()).sum()
    }

    /// Puts all amplitude mass back on `|0...0⟩`.
    pub(crate) fn reset(&mut self) {
        self.amplitudes.fill(Complex::zero());
        self.amplitudes[0] = Complex::one();
    }

    /// Bitstring label of basis index `index`, qubit 0 first.
    pub fn bitstring(&self, index: usize) -> String {
        bitstring(index, self.num_qubits)
    }

    /// Basis states with non-negligible probability, sorted by descending
    /// probability (ties by ascending index).
    ///
    /// With `top_n` set, a bounded min-heap keeps only the `top_n` largest
    /// entries so the full 2^n array is never sorted or materialised.
    pub fn probabilities(&self, top_n: Option<usize>) -> Vec<BasisProbability> {
        let significant = self
            .amplitudes
            .iter()
            .enumerate()
            .map(|(index, amp)| RankedBasis { probability: amp.norm_sqr(), index })
            .filter(|r| r.probability > AMPLITUDE_TOLERANCE);

        let mut ranked: Vec<RankedBasis> = match top_n {
            Some(0) => Vec::new(),
            Some(n) => {
                // never more entries than basis states
                let n = n.min(self.dim());
                let mut heap: BinaryHeap<Reverse<RankedBasis>> = BinaryHeap::with_capacity(n + 1);
                for entry in significant {
                    heap.push(Reverse(entry));
                    if heap.len() > n {
                        heap.pop();
                    }
                }
                heap.into_iter().map(|Reverse(r)| r).collect()
            }
            None => significant.collect(),
        };

        ranked.sort_by(|a, b| b.cmp(a));
        ranked
            .into_iter()
            .map(|r| BasisProbability { bitstring: self.bitstring(r.index), probability: r.probability })
            .collect()
    }
}

impl fmt::Display for StateVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StateVector[")?;
        for (i, c) in self.amplitudes.iter().enumerate() {
            write!(f, "{}{:.4}", if i > 0 { ", " } else { "" }, c)?;
        }
        write!(f, "]")
    }
}

/// Formats `index` as an `width`-character bitstring, most significant bit first.
pub fn bitstring(index: usize, width: usize) -> String {
    (0..width)
        .map(|q| if (index >> (width - 1 - q)) & 1 == 1 { '1' } else { '0' })
        .collect()
}

/// One entry of a state readout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasisProbability {
    /// Basis label, qubit 0 first.
    pub bitstring: String,
    /// `|amplitude|^2`
    pub probability: f64,
}

/// Heap entry: larger probability ranks higher, lower index wins ties.
#[derive(Debug, Clone, Copy)]
struct RankedBasis {
    probability: f64,
    index: usize,
}

impl PartialEq for RankedBasis {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankedBasis {}

impl PartialOrd for RankedBasis {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankedBasis {
    fn cmp(&self, other: &Self) -> Ordering {
        self.probability
            .total_cmp(&other.probability)
            .then_with(|| other.index.cmp(&self.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_state_layout() {
        let state = StateVector::zero_state(3).unwrap();
        assert_eq!(state.dim(), 8);
        assert_eq!(state.amplitudes()[0], Complex::new(1.0, 0.0));
        assert!((state.norm_squared() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bitstring_qubit_zero_is_leftmost() {
        assert_eq!(bitstring(1, 3), "001");
        assert_eq!(bitstring(4, 3), "100");
        assert_eq!(bitstring(6, 3), "110");
    }

    #[test]
    fn test_top_n_keeps_largest_in_order() {
        let amps = vec![
            Complex::new(0.1f64.sqrt(), 0.0),
            Complex::new(0.4f64.sqrt(), 0.0),
            Complex::zero(),
            Complex::new(0.5f64.sqrt(), 0.0),
        ];
        let state = StateVector::from_amplitudes(amps).unwrap();

        let top = state.probabilities(Some(2));
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].bitstring, "11");
        assert_eq!(top[1].bitstring, "01");

        // Zero-probability basis states are never reported.
        let all = state.probabilities(None);
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].bitstring, "00");
        assert!(state.probabilities(Some(0)).is_empty());

        // Oversized caps return every non-zero state.
        assert_eq!(state.probabilities(Some(usize::MAX)), all);
        assert_eq!(state.probabilities(Some(1 << 60)), all);
    }

    #[test]
    fn test_ties_break_by_index() {
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let state = StateVector::from_amplitudes(vec![
            Complex::new(h, 0.0),
            Complex::zero(),
            Complex::zero(),
            Complex::new(h, 0.0),
        ])
        .unwrap();
        let probs = state.probabilities(Some(1));
        assert_eq!(probs[0].bitstring, "00");
    }

    #[test]
    fn test_from_amplitudes_rejects_bad_length() {
        assert!(StateVector::from_amplitudes(vec![Complex::one(); 3]).is_err());
        assert!(StateVector::from_amplitudes(vec![Complex::one()]).is_err());
    }
}
