// src/api/mod.rs

//! Headless facade addressing registers by string identifier.
//!
//! One [`QuantumApi`] is built per session and handed to whatever drives it:
//! a command interpreter, a test harness or an embedding server. Every call
//! returns an [`ApiResponse`] instead of an error, so the facade can sit
//! behind a serialised boundary ([`QuantumApi::execute_json`]).
//!
//! The registry sits behind an `RwLock` and each register behind its own
//! `Mutex`, so calls on different circuits run concurrently while calls on
//! the same circuit are serialised.

mod command;
mod config;
mod response;

pub use command::Command;
pub use config::ApiConfig;
pub use response::{ApiResponse, CircuitInfo, Payload};

use crate::circuits::Circuit;
use crate::core::QsimError;
use crate::operations::{GateRequest, Operation};
use crate::search::{PossibilitySpace, SearchEngine};
use crate::simulation::{QuantumRegister, Simulator, SimulatorConfig};
use rand::SeedableRng;
use rand::distr::{Distribution, StandardUniform};
use rand::rngs::StdRng;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

type SharedRegister = Arc<Mutex<QuantumRegister>>;

/// Registry of named registers plus a search engine.
#[derive(Debug)]
pub struct QuantumApi {
    config: ApiConfig,
    circuits: RwLock<HashMap<String, SharedRegister>>,
    engine: Mutex<SearchEngine>,
    /// Source of per-register seeds.
    seeds: Mutex<StdRng>,
}

impl QuantumApi {
    /// Builds a facade from a validated configuration.
    pub fn new(config: ApiConfig) -> Result<Self, QsimError> {
        config.validate()?;
        let engine = SearchEngine::new(config.search.clone())?;
        let seed = config.simulator.seed.unwrap_or_else(rand::random::<u64>);
        Ok(Self::assemble(config, engine, seed))
    }

    /// Default settings with every random draw derived from `seed`.
    pub fn seeded(seed: u64) -> Self {
        Self::assemble(ApiConfig::seeded(seed), SearchEngine::seeded(seed), seed)
    }

    fn assemble(config: ApiConfig, engine: SearchEngine, seed: u64) -> Self {
        Self {
            config,
            circuits: RwLock::new(HashMap::new()),
            engine: Mutex::new(engine),
            seeds: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Registers a new `num_qubits` register under `id`.
    ///
    /// Fails with `DuplicateIdentifier` if `id` is taken, otherwise with the
    /// register constructor's error (`InvalidArgument`, `ResourceExceeded`).
    pub fn create_circuit(&self, id: &str, num_qubits: usize) -> ApiResponse {
        respond(self.try_create(id, num_qubits), |info| {
            let message = format!("created circuit '{}' with {} qubit(s)", info.id, info.num_qubits);
            (Payload::Circuit(info), message)
        })
    }

    fn try_create(&self, id: &str, num_qubits: usize) -> Result<CircuitInfo, QsimError> {
        if self.read_registry().contains_key(id) {
            return Err(duplicate(id));
        }
        // allocate outside the registry lock; another caller may win the id meanwhile
        let config = SimulatorConfig { seed: Some(self.next_seed()), ..self.config.simulator.clone() };
        let register = QuantumRegister::with_config(num_qubits, &config)?;
        match self.write_registry().entry(id.to_string()) {
            Entry::Occupied(_) => Err(duplicate(id)),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(Mutex::new(register)));
                info!(id, num_qubits, "circuit created");
                Ok(CircuitInfo { id: id.to_string(), num_qubits })
            }
        }
    }

    /// Drops the register registered under `id`.
    pub fn delete_circuit(&self, id: &str) -> ApiResponse {
        let removed = self.write_registry().remove(id);
        match removed {
            Some(register) => {
                let num_qubits = lock(&*register).num_qubits();
                info!(id, "circuit deleted");
                ApiResponse::ok(
                    Payload::Circuit(CircuitInfo { id: id.to_string(), num_qubits }),
                    format!("deleted circuit '{}'", id),
                )
            }
            None => ApiResponse::failure(&self.not_found(id)),
        }
    }

    /// Every registered circuit, sorted by id.
    pub fn list_circuits(&self) -> ApiResponse {
        let mut infos: Vec<CircuitInfo> = self
            .read_registry()
            .iter()
            .map(|(id, register)| CircuitInfo { id: id.clone(), num_qubits: lock(&**register).num_qubits() })
            .collect();
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        let message = format!("{} circuit(s) registered", infos.len());
        ApiResponse::ok(Payload::Circuits(infos), message)
    }

    /// Returns the register under `id` to `|0...0⟩`.
    pub fn reset_circuit(&self, id: &str) -> ApiResponse {
        let result = self.with_register(id, |register| {
            register.reset();
            Ok(register.num_qubits())
        });
        respond(result, |num_qubits| {
            (Payload::Circuit(CircuitInfo { id: id.to_string(), num_qubits }), format!("reset circuit '{}'", id))
        })
    }

    /// Applies `gates` in order to the register under `id`.
    ///
    /// Stops at the first invalid gate. Gates before it stay applied and the
    /// failure response carries `Payload::Applied` with how many there were.
    /// The state is left exactly as it was after the last successful gate.
    pub fn apply_gates(&self, id: &str, gates: &[GateRequest]) -> ApiResponse {
        let mut applied = 0;
        let result = self.with_register(id, |register| {
            for request in gates {
                let op = Operation::try_from(request)?;
                register.apply(&op)?;
                applied += 1;
            }
            Ok(())
        });
        match result {
            Ok(()) => ApiResponse::ok(
                Payload::Applied { applied },
                format!("applied {} gate(s) to '{}'", applied, id),
            ),
            Err(e @ QsimError::NotFound { .. }) => ApiResponse::failure(&e),
            Err(e) => {
                warn!(id, applied, error = %e, "gate sequence stopped early");
                let mut response = ApiResponse::failure(&e);
                response.message = format!("gate #{} rejected, {} applied before it: {}", applied, applied, e);
                response.with_payload(Payload::Applied { applied })
            }
        }
    }

    /// Runs every operation of `circuit` on the register under `id`, with
    /// the same partial-application behaviour as [`apply_gates`](Self::apply_gates).
    pub fn apply_circuit(&self, id: &str, circuit: &Circuit) -> ApiResponse {
        let result = self.with_register(id, |register| Simulator::new().run_on(register, circuit));
        respond(result, |result| {
            let message = format!("ran {} operation(s) on '{}'", circuit.len(), id);
            (Payload::Simulation(result), message)
        })
    }

    /// Measures `qubits` (all when `None`) and collapses the register.
    pub fn measure(&self, id: &str, qubits: Option<&[usize]>) -> ApiResponse {
        let result = self.with_register(id, |register| match qubits {
            Some(q) => register.measure(q),
            None => register.measure_all(),
        });
        respond(result, |bits| {
            let message = format!("measured {} qubit(s) of '{}'", bits.len(), id);
            (Payload::Bits(bits), message)
        })
    }

    /// Basis probabilities of the register under `id`, capped at `top_n`.
    pub fn get_state(&self, id: &str, top_n: Option<usize>) -> ApiResponse {
        let result = self.with_register(id, |register| Ok(register.probabilities(top_n)));
        respond(result, |states| {
            let message = format!("{} basis state(s) with non-zero probability", states.len());
            (Payload::State(states), message)
        })
    }

    /// Weighted selection over `possibilities`.
    pub fn explore(&self, possibilities: &PossibilitySpace) -> ApiResponse {
        let result = lock(&self.engine).explore(possibilities);
        respond(result, |outcome| {
            let message = format!("best option '{}' with confidence {:.4}", outcome.best_label, outcome.confidence);
            (Payload::Explore(outcome), message)
        })
    }

    /// Tunnelling search over `problem_space`. `None` uses the configured
    /// default step budget.
    pub fn tunnel_search(&self, problem_space: &PossibilitySpace, max_steps: Option<usize>) -> ApiResponse {
        let steps = max_steps.unwrap_or(self.config.search.default_max_steps);
        let result = lock(&self.engine).tunnel_search(problem_space, steps);
        respond(result, |outcome| {
            let message = format!("best option '{}' with value {}", outcome.best_label, outcome.best_value);
            (Payload::Search(outcome), message)
        })
    }

    /// Dispatches one structured command.
    pub fn execute(&self, command: Command) -> ApiResponse {
        debug!(?command, "executing command");
        match command {
            Command::CreateCircuit { id, num_qubits } => self.create_circuit(&id, num_qubits),
            Command::DeleteCircuit { id } => self.delete_circuit(&id),
            Command::ListCircuits => self.list_circuits(),
            Command::ResetCircuit { id } => self.reset_circuit(&id),
            Command::ApplyGates { id, gates } => self.apply_gates(&id, &gates),
            Command::Measure { id, qubits } => self.measure(&id, qubits.as_deref()),
            Command::GetState { id, top_n } => self.get_state(&id, top_n),
            Command::Explore { possibilities } => self.explore(&possibilities),
            Command::TunnelSearch { problem_space, max_steps } => self.tunnel_search(&problem_space, max_steps),
        }
    }

    /// Parses a JSON [`Command`], executes it and returns the JSON response.
    /// Unparseable input yields an `InvalidArgument` response.
    pub fn execute_json(&self, json: &str) -> String {
        let response = match serde_json::from_str::<Command>(json) {
            Ok(command) => self.execute(command),
            Err(e) => {
                warn!(error = %e, "rejected malformed command");
                ApiResponse::failure(&QsimError::invalid_argument(format!("malformed command: {}", e)))
            }
        };
        response.to_json()
    }

    /// Runs `f` with exclusive access to the register under `id`. The
    /// registry lock is released before the register lock is taken.
    fn with_register<T, F>(&self, id: &str, f: F) -> Result<T, QsimError>
    where
        F: FnOnce(&mut QuantumRegister) -> Result<T, QsimError>,
    {
        let register = self.read_registry().get(id).cloned().ok_or_else(|| self.not_found(id))?;
        let mut guard = lock(&*register);
        f(&mut guard)
    }

    fn not_found(&self, id: &str) -> QsimError {
        warn!(id, "no circuit registered under id");
        QsimError::NotFound { id: id.to_string() }
    }

    fn next_seed(&self) -> u64 {
        StandardUniform.sample(&mut *lock(&self.seeds))
    }

    fn read_registry(&self) -> RwLockReadGuard<'_, HashMap<String, SharedRegister>> {
        self.circuits.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_registry(&self) -> RwLockWriteGuard<'_, HashMap<String, SharedRegister>> {
        self.circuits.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn duplicate(id: &str) -> QsimError {
    warn!(id, "circuit id already registered");
    QsimError::DuplicateIdentifier { id: id.to_string() }
}

/// Locks `mutex`, recovering the guard if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn respond<T>(result: Result<T, QsimError>, on_ok: impl FnOnce(T) -> (Payload, String)) -> ApiResponse {
    match result {
        Ok(value) => {
            let (payload, message) = on_ok(value);
            ApiResponse::ok(payload, message)
        }
        Err(e) => ApiResponse::failure(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ErrorKind;
    use crate::operations::GateKind;

    fn probabilities(resp: &ApiResponse) -> Vec<(String, f64)> {
        match &resp.payload {
            Some(Payload::State(states)) => states.iter().map(|s| (s.bitstring.clone(), s.probability)).collect(),
            other => panic!("expected state payload, got {:?}", other),
        }
    }

    #[test]
    fn test_registry_lifecycle() {
        let api = QuantumApi::seeded(1);
        assert!(api.create_circuit("a", 2).is_success());
        assert!(api.create_circuit("b", 3).is_success());

        let dup = api.create_circuit("a", 4);
        assert_eq!(dup.error, Some(ErrorKind::DuplicateIdentifier));

        match api.list_circuits().payload {
            Some(Payload::Circuits(list)) => {
                assert_eq!(list.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(), ["a", "b"]);
                assert_eq!(list[1].num_qubits, 3);
            }
            other => panic!("unexpected payload {:?}", other),
        }

        assert!(api.delete_circuit("a").is_success());
        assert_eq!(api.delete_circuit("a").error, Some(ErrorKind::NotFound));
        assert_eq!(api.get_state("a", None).error, Some(ErrorKind::NotFound));
    }

    #[test]
    fn test_create_errors() {
        let api = QuantumApi::seeded(1);
        assert_eq!(api.create_circuit("zero", 0).error, Some(ErrorKind::InvalidArgument));
        assert_eq!(api.create_circuit("huge", 31).error, Some(ErrorKind::ResourceExceeded));
        // failed creations do not register the id
        assert!(api.create_circuit("zero", 1).is_success());
    }

    #[test]
    fn test_partial_application() {
        let api = QuantumApi::seeded(2);
        api.create_circuit("c", 2);
        let gates = [
            GateRequest::new(GateKind::X, [0]),
            GateRequest::new(GateKind::H, [5]),
            GateRequest::new(GateKind::X, [1]),
        ];
        let resp = api.apply_gates("c", &gates);
        assert!(!resp.is_success());
        assert_eq!(resp.error, Some(ErrorKind::InvalidArgument));
        assert_eq!(resp.payload, Some(Payload::Applied { applied: 1 }));
        // X(0) stays applied, X(1) never ran
        assert_eq!(probabilities(&api.get_state("c", None)), vec![("10".to_string(), 1.0)]);
    }

    #[test]
    fn test_bad_gate_arguments() {
        let api = QuantumApi::seeded(2);
        api.create_circuit("c", 2);
        let resp = api.apply_gates("c", &[GateRequest::new(GateKind::Cnot, [1, 1])]);
        assert_eq!(resp.error, Some(ErrorKind::InvalidArgument));
        let resp = api.apply_gates("c", &[GateRequest::new(GateKind::Rx, [0])]);
        assert_eq!(resp.error, Some(ErrorKind::InvalidArgument));
        assert_eq!(api.apply_gates("missing", &[]).error, Some(ErrorKind::NotFound));
    }

    #[test]
    fn test_measure_and_reset() {
        let api = QuantumApi::seeded(3);
        api.create_circuit("c", 3);
        api.apply_gates("c", &[GateRequest::new(GateKind::X, [2])]);
        assert_eq!(api.measure("c", None).payload, Some(Payload::Bits(vec![0, 0, 1])));
        assert_eq!(api.measure("c", Some(&[2, 0])).payload, Some(Payload::Bits(vec![1, 0])));
        assert_eq!(api.measure("c", Some(&[3])).error, Some(ErrorKind::InvalidArgument));

        assert!(api.reset_circuit("c").is_success());
        assert_eq!(probabilities(&api.get_state("c", Some(1))), vec![("000".to_string(), 1.0)]);
    }

    #[test]
    fn test_get_state_with_oversized_cap() -> Result<(), serde_json::Error> {
        let api = QuantumApi::seeded(12);
        api.create_circuit("c", 3);
        api.apply_gates("c", &[GateRequest::new(GateKind::H, [0]), GateRequest::new(GateKind::H, [2])]);

        let resp = api.get_state("c", Some(usize::MAX));
        assert!(resp.is_success(), "{}", resp.message);
        assert_eq!(probabilities(&resp).len(), 4);

        let out: serde_json::Value =
            serde_json::from_str(&api.execute_json(r#"{"op":"get_state","id":"c","top_n":1152921504606846976}"#))?;
        assert_eq!(out["success"], true);
        assert_eq!(out["payload"].as_array().map(Vec::len), Some(4));
        Ok(())
    }

    #[test]
    fn test_non_finite_angle_circuit_keeps_state() {
        let api = QuantumApi::seeded(13);
        api.create_circuit("c", 2);
        api.apply_gates("c", &[GateRequest::new(GateKind::H, [0])]);
        let before = api.get_state("c", None);

        let circuit = crate::circuits::CircuitBuilder::new().rx(0, f64::NAN).build();
        let resp = api.apply_circuit("c", &circuit);
        assert_eq!(resp.error, Some(ErrorKind::InvalidArgument));
        assert_eq!(api.get_state("c", None).payload, before.payload);

        // later calls still succeed
        assert!(api.apply_gates("c", &[GateRequest::new(GateKind::X, [1])]).is_success());
    }

    #[test]
    fn test_duplicate_checked_before_allocation() {
        let api = QuantumApi::seeded(14);
        assert!(api.create_circuit("a", 2).is_success());
        // a taken id is reported even when the request would exceed the ceiling
        assert_eq!(api.create_circuit("a", 31).error, Some(ErrorKind::DuplicateIdentifier));
    }

    #[test]
    fn test_racing_creates_register_one_circuit() {
        let api = std::sync::Arc::new(QuantumApi::seeded(15));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let api = std::sync::Arc::clone(&api);
                std::thread::spawn(move || api.create_circuit("shared", 10).error)
            })
            .collect();
        let errors: Vec<Option<ErrorKind>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(errors.iter().filter(|e| e.is_none()).count(), 1);
        assert!(errors.iter().flatten().all(|e| *e == ErrorKind::DuplicateIdentifier));
    }

    #[test]
    fn test_apply_circuit() {
        let api = QuantumApi::seeded(4);
        api.create_circuit("bell", 2);
        let resp = api.apply_circuit("bell", &crate::circuits::CircuitBuilder::bell());
        assert!(resp.is_success(), "{}", resp.message);
        let probs = probabilities(&api.get_state("bell", None));
        assert_eq!(probs.len(), 2);
        assert!(probs.iter().all(|(_, p)| (p - 0.5).abs() < 1e-9));
    }

    #[test]
    fn test_search_through_facade() -> Result<(), QsimError> {
        let api = QuantumApi::seeded(5);
        let space = PossibilitySpace::new([("A", 0.1), ("B", 0.7), ("C", 0.2)])?;
        match api.explore(&space).payload {
            Some(Payload::Explore(outcome)) => assert_eq!(outcome.best_label, "B"),
            other => panic!("unexpected payload {:?}", other),
        }
        match api.tunnel_search(&space, None).payload {
            Some(Payload::Search(outcome)) => {
                assert_eq!(outcome.best_label, "B");
                assert_eq!(outcome.steps, api.config().search.default_max_steps);
            }
            other => panic!("unexpected payload {:?}", other),
        }
        assert_eq!(api.tunnel_search(&space, Some(0)).error, Some(ErrorKind::InvalidArgument));
        Ok(())
    }

    #[test]
    fn test_same_seed_same_measurements() {
        let run = || {
            let api = QuantumApi::seeded(77);
            api.create_circuit("c", 4);
            let hs: Vec<GateRequest> = (0..4).map(|q| GateRequest::new(GateKind::H, [q])).collect();
            api.apply_gates("c", &hs);
            api.measure("c", None).payload
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_execute_json() -> Result<(), serde_json::Error> {
        let api = QuantumApi::seeded(6);
        let out: serde_json::Value = serde_json::from_str(&api.execute_json(r#"{"op":"create_circuit","id":"x","num_qubits":1}"#))?;
        assert_eq!(out["success"], true);

        let out: serde_json::Value = serde_json::from_str(&api.execute_json("{ not json"))?;
        assert_eq!(out["success"], false);
        assert_eq!(out["error"], "InvalidArgument");
        assert_eq!(out["payload"], serde_json::Value::Null);
        Ok(())
    }
}
