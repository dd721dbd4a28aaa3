// src/api/config.rs

use crate::core::QsimError;
use crate::search::SearchConfig;
use crate::simulation::SimulatorConfig;
use serde::{Deserialize, Serialize};

/// Everything a [`QuantumApi`](super::QuantumApi) needs at construction.
///
/// Loaded from JSON with every field optional:
///
/// ```
/// use qsim::api::ApiConfig;
///
/// let config = ApiConfig::from_json_str(r#"{ "simulator": { "max_qubits": 12, "seed": 7 } }"#).unwrap();
/// assert_eq!(config.simulator.max_qubits, 12);
/// assert_eq!(config.search.default_max_steps, 1000);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub simulator: SimulatorConfig,
    pub search: SearchConfig,
}

impl ApiConfig {
    /// Default config with both seeds fixed.
    pub fn seeded(seed: u64) -> Self {
        Self { simulator: SimulatorConfig::seeded(seed), search: SearchConfig::seeded(seed) }
    }

    /// Parses and validates a JSON document.
    ///
    /// # Errors
    /// `InvalidArgument` for malformed JSON or out-of-range settings.
    pub fn from_json_str(json: &str) -> Result<Self, QsimError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| QsimError::invalid_argument(format!("malformed configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), QsimError> {
        self.simulator.validate()?;
        self.search.validate()
    }
}
