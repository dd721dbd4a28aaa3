// src/simulation/mod.rs

//! Exact statevector simulation.
//!
//! [`QuantumRegister`] is the register itself: a dense 2^n amplitude buffer
//! evolved by gates and collapsed by measurement. [`Simulator`] runs a whole
//! [`Circuit`] on a fresh register and collects the outcomes.

mod results;
pub(crate) mod engine;

pub use engine::{QuantumRegister, SimulatorConfig};
pub use results::{MeasurementRecord, SimulationResult};

use crate::circuits::Circuit;
use crate::core::QsimError;
use tracing::debug;

/// Runs circuits on fresh registers.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    config: SimulatorConfig,
    /// Cap on the number of basis states reported in the result.
    top_n: Option<usize>,
}

impl Simulator {
    /// Creates a new Simulator with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulator using `config` for every register it creates.
    pub fn with_config(config: SimulatorConfig) -> Self {
        Self { config, top_n: None }
    }

    /// Limits the final-state readout to the `top_n` most probable states.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = Some(top_n);
        self
    }

    /// Runs `circuit` on a register sized to `circuit.num_qubits()`.
    ///
    /// # Returns
    /// * `Ok(SimulationResult)` with every measurement and the final state.
    /// * `Err(QsimError)` from register creation or the first failing operation.
    pub fn run(&self, circuit: &Circuit) -> Result<SimulationResult, QsimError> {
        if circuit.is_empty() {
            return Ok(SimulationResult::new());
        }
        let mut register = QuantumRegister::with_config(circuit.num_qubits(), &self.config)?;
        self.run_on(&mut register, circuit)
    }

    /// Runs `circuit` on an existing register. Operations that succeeded
    /// before a failure stay applied.
    pub fn run_on(&self, register: &mut QuantumRegister, circuit: &Circuit) -> Result<SimulationResult, QsimError> {
        let mut result = SimulationResult::new();
        for (step, op) in circuit.operations().iter().enumerate() {
            let bits = register.apply(op)?;
            if op.is_measurement() {
                let qubits = match op.involved_qubits() {
                    q if q.is_empty() => (0..register.num_qubits()).collect(),
                    q => q,
                };
                result.record_measurement(step, qubits, bits);
            }
        }
        result.set_final_state(register.probabilities(self.top_n));
        debug!(operations = circuit.len(), measurements = result.measurements().len(), "circuit run complete");
        Ok(result)
    }
}
