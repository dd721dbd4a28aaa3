// src/api/command.rs

use crate::operations::GateRequest;
use crate::search::PossibilitySpace;
use serde::{Deserialize, Serialize};

/// The structured command vocabulary of the facade.
///
/// Serialised with an `op` tag, e.g.
/// `{"op": "apply_gates", "id": "c", "gates": [{"gate": "H", "qubits": [0]}]}`.
/// Free-text commands are not accepted; a front end has to translate to this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    CreateCircuit {
        id: String,
        num_qubits: usize,
    },
    DeleteCircuit {
        id: String,
    },
    ListCircuits,
    ResetCircuit {
        id: String,
    },
    ApplyGates {
        id: String,
        gates: Vec<GateRequest>,
    },
    Measure {
        id: String,
        #[serde(default)]
        qubits: Option<Vec<usize>>,
    },
    GetState {
        id: String,
        #[serde(default)]
        top_n: Option<usize>,
    },
    Explore {
        possibilities: PossibilitySpace,
    },
    TunnelSearch {
        problem_space: PossibilitySpace,
        #[serde(default)]
        max_steps: Option<usize>,
    },
}
