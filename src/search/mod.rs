// src/search/mod.rs

//! Quantum-inspired discrete search.
//!
//! This is a classical heuristic, not a simulation: there are no complex
//! amplitudes and no unitary evolution here. It borrows two ideas by analogy.
//! Weighted sampling over normalised weights plays the role of measuring a
//! superposition ([`SearchEngine::explore`], [`SearchEngine::collapse`]).
//! Annealing with occasional long jumps plays the role of tunnelling out of
//! local optima ([`SearchEngine::tunnel_search`]).
//!
//! Whether the walk beats a greedy or exhaustive baseline depends on the
//! landscape and its size; [`compare_strategies`] measures it.

mod baseline;
mod space;
mod tunnel;

pub use baseline::{compare_strategies, exhaustive_search, hill_climb, BaselineOutcome, StrategyComparison, StrategyStats};
pub use space::PossibilitySpace;
pub use tunnel::TunnelOutcome;

use crate::core::{QsimError, DEFAULT_MAX_STEPS};
use rand::SeedableRng;
use rand::distr::{Distribution, StandardUniform};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Settings for the search engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Step budget used when a caller does not pass one.
    pub default_max_steps: usize,
    /// Temperature at the first step.
    pub initial_temperature: f64,
    /// Temperature reached at the last step (geometric cooling).
    pub final_temperature: f64,
    /// Largest index distance of an ordinary neighbour move.
    pub neighborhood_radius: usize,
    /// Probability of a long jump at the initial temperature. Scales with `T/T0`.
    pub tunneling_rate: f64,
    /// Seed for every random draw. `None` draws a fresh seed.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_max_steps: DEFAULT_MAX_STEPS,
            initial_temperature: 1.0,
            final_temperature: 1e-3,
            neighborhood_radius: 1,
            tunneling_rate: 0.25,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Default config with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed), ..Self::default() }
    }

    pub fn validate(&self) -> Result<(), QsimError> {
        if self.default_max_steps == 0 {
            return Err(QsimError::invalid_argument("default_max_steps must be at least 1"));
        }
        if !(self.initial_temperature.is_finite() && self.initial_temperature > 0.0) {
            return Err(QsimError::invalid_argument("initial_temperature must be positive"));
        }
        if !(self.final_temperature > 0.0 && self.final_temperature <= self.initial_temperature) {
            return Err(QsimError::invalid_argument(
                "final_temperature must be positive and not above initial_temperature",
            ));
        }
        if self.neighborhood_radius == 0 {
            return Err(QsimError::invalid_argument("neighborhood_radius must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.tunneling_rate) {
            return Err(QsimError::invalid_argument("tunneling_rate must lie in [0, 1]"));
        }
        Ok(())
    }
}

/// Result of [`SearchEngine::explore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExploreOutcome {
    /// Option with the highest normalised weight (first in caller order on ties).
    pub best_label: String,
    /// Normalised weight of `best_label`.
    pub confidence: f64,
    /// Every option's normalised weight; negative inputs appear as 0.
    pub all_normalized: BTreeMap<String, f64>,
}

/// Weighted selection and tunnelling search over a [`PossibilitySpace`].
#[derive(Debug)]
pub struct SearchEngine {
    config: SearchConfig,
    rng: StdRng,
}

impl SearchEngine {
    /// Engine with the given configuration.
    pub fn new(config: SearchConfig) -> Result<Self, QsimError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random::<u64>);
        Ok(Self { config, rng: StdRng::seed_from_u64(seed) })
    }

    /// Default-configured engine with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self { config: SearchConfig::seeded(seed), rng: StdRng::seed_from_u64(seed) }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Normalises the weights and reports the heaviest option.
    ///
    /// Negative weights count as zero. O(k) in the number of options.
    ///
    /// # Errors
    /// `InvalidArgument` if no weight is positive.
    pub fn explore(&self, space: &PossibilitySpace) -> Result<ExploreOutcome, QsimError> {
        let normalized = normalized_weights(space)?;
        let (best, confidence) = normalized
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(bi, bw), (i, &w)| if w > bw { (i, w) } else { (bi, bw) });

        let all_normalized = space.iter().zip(&normalized).map(|((l, _), &w)| (l.to_string(), w)).collect();
        Ok(ExploreOutcome { best_label: space.label(best).to_string(), confidence, all_normalized })
    }

    /// Picks one option at random with probability equal to its normalised
    /// weight.
    pub fn collapse(&mut self, space: &PossibilitySpace) -> Result<String, QsimError> {
        let normalized = normalized_weights(space)?;
        let u = self.uniform();
        let mut cumulative = 0.0;
        let mut chosen = None;
        for (i, &w) in normalized.iter().enumerate() {
            if w > 0.0 {
                cumulative += w;
                chosen = Some(i);
                if u < cumulative {
                    break;
                }
            }
        }
        // normalized_weights guarantees at least one positive entry
        let index = chosen.ok_or_else(|| QsimError::invalid_argument("no option has positive weight"))?;
        debug!(label = space.label(index), "possibility collapsed");
        Ok(space.label(index).to_string())
    }

    /// Uniform draw in `[0, 1)`.
    pub(crate) fn uniform(&mut self) -> f64 {
        StandardUniform.sample(&mut self.rng)
    }

    /// Uniform index in `0..n`; `n` must be positive.
    pub(crate) fn uniform_index(&mut self, n: usize) -> usize {
        ((self.uniform() * n as f64) as usize).min(n - 1)
    }
}

/// Weights clamped at zero and scaled to sum to 1.
fn normalized_weights(space: &PossibilitySpace) -> Result<Vec<f64>, QsimError> {
    let clamped: Vec<f64> = space.iter().map(|(_, w)| w.max(0.0)).collect();
    let total: f64 = clamped.iter().sum();
    if total <= 0.0 {
        return Err(QsimError::invalid_argument("all weights are non-positive"));
    }
    Ok(clamped.into_iter().map(|w| w / total).collect())
}
