// src/search/baseline.rs

//! Classical baselines to measure the tunnelling search against.

use super::{PossibilitySpace, SearchEngine};
use crate::core::QsimError;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::info;

/// Best point found by a baseline strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineOutcome {
    pub label: String,
    pub value: f64,
    pub evaluations: usize,
}

/// Scans every option. Ties go to the first in caller order.
pub fn exhaustive_search(space: &PossibilitySpace) -> BaselineOutcome {
    let (best, value) = space
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(bi, bv), (i, (_, w))| if w > bv { (i, w) } else { (bi, bv) });
    BaselineOutcome { label: space.label(best).to_string(), value, evaluations: space.len() }
}

/// Steepest ascent over index neighbours from `start` until no neighbour improves.
///
/// # Errors
/// `InvalidArgument` if `start` is out of range.
pub fn hill_climb(space: &PossibilitySpace, start: usize) -> Result<BaselineOutcome, QsimError> {
    let n = space.len();
    if start >= n {
        return Err(QsimError::invalid_argument(format!("start index {} out of range for {} options", start, n)));
    }
    let mut current = start;
    let mut evaluations = 1;
    loop {
        let mut next = current;
        for candidate in [current.checked_sub(1), Some(current + 1).filter(|i| *i < n)].into_iter().flatten() {
            evaluations += 1;
            if space.weight(candidate) > space.weight(next) {
                next = candidate;
            }
        }
        if next == current {
            break;
        }
        current = next;
    }
    Ok(BaselineOutcome { label: space.label(current).to_string(), value: space.weight(current), evaluations })
}

/// Aggregate of one strategy over repeated trials.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyStats {
    pub trials: usize,
    pub mean_value: f64,
    /// Fraction of trials that reached the global optimum.
    pub hit_rate: f64,
    pub mean_evaluations: f64,
    /// Wall time across all trials.
    pub elapsed: Duration,
}

/// Side-by-side numbers for the three strategies on one space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyComparison {
    pub optimum: f64,
    pub exhaustive: StrategyStats,
    pub hill_climb: StrategyStats,
    pub tunnel: StrategyStats,
}

#[derive(Default)]
struct Tally {
    trials: usize,
    value_sum: f64,
    hits: usize,
    evaluations: usize,
    elapsed: Duration,
}

impl Tally {
    fn record(&mut self, value: f64, optimum: f64, evaluations: usize, elapsed: Duration) {
        self.trials += 1;
        self.value_sum += value;
        self.hits += usize::from(value >= optimum);
        self.evaluations += evaluations;
        self.elapsed += elapsed;
    }

    fn finish(self) -> StrategyStats {
        let t = self.trials.max(1) as f64;
        StrategyStats {
            trials: self.trials,
            mean_value: self.value_sum / t,
            hit_rate: self.hits as f64 / t,
            mean_evaluations: self.evaluations as f64 / t,
            elapsed: self.elapsed,
        }
    }
}

/// Runs exhaustive scan, random-start hill climbing and tunnelling search
/// `trials` times each on `space`.
///
/// The tunnelling search gets `max_steps` per trial. Hill-climb starts are
/// drawn from the engine's generator, so a seeded engine gives a repeatable
/// comparison (wall times aside).
///
/// # Errors
/// `InvalidArgument` if `trials` or `max_steps` is zero.
pub fn compare_strategies(
    engine: &mut SearchEngine,
    space: &PossibilitySpace,
    max_steps: usize,
    trials: usize,
) -> Result<StrategyComparison, QsimError> {
    if trials == 0 {
        return Err(QsimError::invalid_argument("trials must be at least 1"));
    }
    let optimum = exhaustive_search(space).value;
    let (mut exhaustive, mut greedy, mut tunnel) = (Tally::default(), Tally::default(), Tally::default());

    for _ in 0..trials {
        let started = Instant::now();
        let outcome = exhaustive_search(space);
        exhaustive.record(outcome.value, optimum, outcome.evaluations, started.elapsed());

        let start = engine.uniform_index(space.len());
        let started = Instant::now();
        let outcome = hill_climb(space, start)?;
        greedy.record(outcome.value, optimum, outcome.evaluations, started.elapsed());

        let started = Instant::now();
        let outcome = engine.tunnel_search(space, max_steps)?;
        tunnel.record(outcome.best_value, optimum, outcome.evaluations, started.elapsed());
    }

    let comparison = StrategyComparison {
        optimum,
        exhaustive: exhaustive.finish(),
        hill_climb: greedy.finish(),
        tunnel: tunnel.finish(),
    };
    info!(
        options = space.len(),
        trials,
        hill_climb_hits = comparison.hill_climb.hit_rate,
        tunnel_hits = comparison.tunnel.hit_rate,
        "strategy comparison complete"
    );
    Ok(comparison)
}
