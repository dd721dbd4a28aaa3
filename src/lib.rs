// src/lib.rs

//! `qsim` - exact statevector simulation and quantum-inspired search
//!
//! Three layers:
//! * [`simulation`]: a dense 2^n statevector register with the usual gate
//!   library, measurement with collapse, and Bell/GHZ presets.
//! * [`search`]: a classical heuristic that borrows weighted sampling and
//!   tunnelling by analogy. It simulates nothing.
//! * [`api`]: a facade addressing registers by name and answering every call
//!   with a structured response.
//!
//! Logging goes through `tracing`; install a subscriber to see it.

pub mod core;
pub mod operations;
pub mod circuits;
pub mod simulation;
pub mod validation;
pub mod search;
pub mod api;

// Re-export the most common types for easier top-level use
pub use core::{BasisProbability, ErrorKind, QsimError, StateVector};
pub use operations::{Gate, GateKind, GateRequest, Operation};
pub use circuits::{Circuit, CircuitBuilder};
pub use simulation::{QuantumRegister, SimulationResult, Simulator, SimulatorConfig};
pub use search::{PossibilitySpace, SearchConfig, SearchEngine};
pub use api::{ApiConfig, ApiResponse, Command, Payload, QuantumApi};
pub use validation::{check_normalization, validate_state};

// Example 1: Bell pair
// Entangle two qubits, then measure both. The outcomes always agree.
/// ```
/// use qsim::{CircuitBuilder, Simulator, SimulatorConfig, QsimError};
///
/// let circuit = CircuitBuilder::new()
///     .h(0)
///     .cnot(0, 1)
///     .measure_all()
///     .build();
///
/// let simulator = Simulator::with_config(SimulatorConfig::seeded(42));
/// match simulator.run(&circuit) {
///     Ok(result) => {
///         println!("Circuit:\n{}", circuit);
///         println!("Result:\n{}", result);
///
///         // |00> and |11> each with probability 1/2; the measurement picked
///         // one of them and both qubits report the same bit.
///         assert_eq!(result.outcome(0), result.outcome(1));
///         assert_eq!(result.final_state().len(), 1);
///     }
///     Err(e) => panic!("Example 1 failed: {}", e),
/// }
/// # Ok::<(), QsimError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: GHZ state through the facade
// Registers are addressed by name; every call returns a response value.
/// ```
/// use qsim::{GateKind, GateRequest, Payload, QuantumApi};
///
/// let api = QuantumApi::seeded(7);
/// assert!(api.create_circuit("ghz", 3).is_success());
///
/// let gates = [
///     GateRequest::new(GateKind::H, [0]),
///     GateRequest::new(GateKind::Cnot, [0, 1]),
///     GateRequest::new(GateKind::Cnot, [1, 2]),
/// ];
/// assert!(api.apply_gates("ghz", &gates).is_success());
///
/// let response = api.get_state("ghz", Some(8));
/// match response.payload {
///     Some(Payload::State(states)) => {
///         let labels: Vec<&str> = states.iter().map(|s| s.bitstring.as_str()).collect();
///         assert_eq!(labels, ["000", "111"]);
///         assert!(states.iter().all(|s| (s.probability - 0.5).abs() < 1e-9));
///     }
///     other => panic!("unexpected payload: {:?}", other),
/// }
///
/// // Unknown identifiers are reported, not thrown.
/// let missing = api.measure("nope", None);
/// assert!(!missing.success);
/// println!("{}", missing.message);
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 3: Tunnelling search on a rugged landscape
// Greedy ascent from the left end stops on the first peak; the annealing
// walk reaches the global one.
/// ```
/// use qsim::search::hill_climb;
/// use qsim::{PossibilitySpace, QsimError, SearchEngine};
///
/// let space = PossibilitySpace::new([
///     ("a", 1.0), ("b", 4.0), ("c", 2.0), ("d", 0.5), ("e", 3.0), ("f", 9.0), ("g", 6.0),
/// ])?;
///
/// assert_eq!(hill_climb(&space, 0)?.label, "b");
///
/// let mut engine = SearchEngine::seeded(3);
/// let outcome = engine.tunnel_search(&space, 500)?;
/// assert_eq!(outcome.best_label, "f");
/// assert_eq!(outcome.best_value, 9.0);
/// # Ok::<(), QsimError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item
