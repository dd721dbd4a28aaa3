// src/simulation/results.rs
use crate::core::BasisProbability;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One measurement performed while running a circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// Position of the measurement in the circuit's operation list.
    pub step: usize,
    /// Measured qubits, in the order the bits are reported.
    pub qubits: Vec<usize>,
    /// One classical bit per measured qubit.
    pub bits: Vec<u8>,
}

/// Holds the results of a circuit simulation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulationResult {
    measurements: Vec<MeasurementRecord>,
    /// Most recent outcome per qubit.
    outcomes: BTreeMap<usize, u8>,
    final_state: Vec<BasisProbability>,
}

impl SimulationResult {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_measurement(&mut self, step: usize, qubits: Vec<usize>, bits: Vec<u8>) {
        for (q, b) in qubits.iter().zip(&bits) {
            self.outcomes.insert(*q, *b);
        }
        self.measurements.push(MeasurementRecord { step, qubits, bits });
    }

    pub(crate) fn set_final_state(&mut self, state: Vec<BasisProbability>) {
        self.final_state = state;
    }

    /// Latest measured bit of `qubit`, if it was measured.
    pub fn outcome(&self, qubit: usize) -> Option<u8> {
        self.outcomes.get(&qubit).copied()
    }

    /// Latest outcome of every measured qubit.
    pub fn outcomes(&self) -> &BTreeMap<usize, u8> {
        &self.outcomes
    }

    /// All measurements in execution order.
    pub fn measurements(&self) -> &[MeasurementRecord] {
        &self.measurements
    }

    /// Basis probabilities after the last operation.
    pub fn final_state(&self) -> &[BasisProbability] {
        &self.final_state
    }
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation Results:")?;
        if self.measurements.is_empty() {
            writeln!(f, "  No qubits were measured.")?;
        } else {
            writeln!(f, "  Measurements:")?;
            for m in &self.measurements {
                writeln!(f, "    step {}: {:?} -> {:?}", m.step, m.qubits, m.bits)?;
            }
        }
        if !self.final_state.is_empty() {
            writeln!(f, "  Final state:")?;
            for entry in &self.final_state {
                writeln!(f, "    |{}⟩: {:.6}", entry.bitstring, entry.probability)?;
            }
        }
        Ok(())
    }
}
