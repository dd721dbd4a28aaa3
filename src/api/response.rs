// src/api/response.rs

use crate::core::{BasisProbability, ErrorKind, QsimError};
use crate::search::{ExploreOutcome, TunnelOutcome};
use crate::simulation::SimulationResult;
use serde::Serialize;

/// Identifier and width of a registered circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CircuitInfo {
    pub id: String,
    pub num_qubits: usize,
}

/// Structured data carried by a successful (or partially successful) call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Circuit(CircuitInfo),
    Circuits(Vec<CircuitInfo>),
    /// Gates applied by `apply_gates`, also reported when a later gate failed.
    Applied { applied: usize },
    /// `{bitstring, probability}` pairs, most probable first.
    State(Vec<BasisProbability>),
    /// Measured bits, one per requested qubit.
    Bits(Vec<u8>),
    Simulation(SimulationResult),
    Explore(ExploreOutcome),
    Search(TunnelOutcome),
}

/// What every facade call returns: a success flag, an optional payload and
/// a readable message. Failures also carry the error kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub payload: Option<Payload>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorKind>,
}

impl ApiResponse {
    pub fn ok(payload: Payload, message: impl Into<String>) -> Self {
        Self { success: true, payload: Some(payload), message: message.into(), error: None }
    }

    /// Failure response. Qubit-range errors are reported as `InvalidArgument`
    /// at this boundary.
    pub fn failure(err: &QsimError) -> Self {
        let kind = match err.kind() {
            ErrorKind::InvalidQubitIndex => ErrorKind::InvalidArgument,
            kind => kind,
        };
        Self { success: false, payload: None, message: err.to_string(), error: Some(kind) }
    }

    /// Attaches a payload to a failure (partial progress).
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Serialises to a JSON string; falls back to a minimal failure document.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(r#"{{"success":false,"payload":null,"message":"serialisation failed: {}"}}"#, e)
        })
    }
}
