// src/search/tunnel.rs

use super::{PossibilitySpace, SearchEngine};
use crate::core::QsimError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Scale floor so a landscape of all-zero values still has a temperature.
const SCALE_FLOOR: f64 = 1e-12;

/// Result of a tunnelling search: the best point ever evaluated plus counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TunnelOutcome {
    pub best_label: String,
    pub best_value: f64,
    /// Annealing steps taken (equals the budget).
    pub steps: usize,
    /// Proposals that were accepted.
    pub accepted_moves: usize,
    /// Accepted proposals that lowered the objective.
    pub worse_accepted: usize,
    /// Accepted long jumps.
    pub tunneling_jumps: usize,
    /// Objective evaluations, including the final greedy refinement.
    pub evaluations: usize,
}

impl SearchEngine {
    /// Annealing walk over `space`, maximising the weights.
    ///
    /// # Errors
    /// `InvalidArgument` if `max_steps == 0`.
    pub fn tunnel_search(&mut self, space: &PossibilitySpace, max_steps: usize) -> Result<TunnelOutcome, QsimError> {
        self.tunnel_search_with(&space.labels(), |i, _| space.weight(i), max_steps)
    }

    /// Annealing walk over `labels`, maximising `objective(index, label)`.
    ///
    /// The walk starts at a uniformly random option. Each step proposes either
    /// an ordinary neighbour (index distance up to `neighborhood_radius`) or,
    /// with probability `tunneling_rate * T/T0`, a jump to any other option.
    /// Improvements are always accepted; a worse proposal is accepted with
    /// probability `exp(delta / (scale * T))`, where `scale` is the largest
    /// magnitude seen so far. `T` cools geometrically from
    /// `initial_temperature` to `final_temperature` over `max_steps`, so the
    /// step budget bounds the run. The best point is then refined by greedy
    /// ascent over its immediate neighbours.
    ///
    /// The best point ever evaluated is returned, not the last one.
    ///
    /// # Errors
    /// `InvalidArgument` if `labels` is empty, `max_steps == 0`, or the
    /// objective returns a non-finite value.
    pub fn tunnel_search_with<F>(&mut self, labels: &[String], mut objective: F, max_steps: usize) -> Result<TunnelOutcome, QsimError>
    where
        F: FnMut(usize, &str) -> f64,
    {
        let n = labels.len();
        if n == 0 {
            return Err(QsimError::invalid_argument("problem space is empty"));
        }
        if max_steps == 0 {
            return Err(QsimError::invalid_argument("max_steps must be at least 1"));
        }

        let mut evaluations = 0usize;
        let mut evaluate = |i: usize| -> Result<f64, QsimError> {
            evaluations += 1;
            let value = objective(i, &labels[i]);
            if value.is_finite() {
                Ok(value)
            } else {
                Err(QsimError::invalid_argument(format!("objective is not finite at '{}': {}", labels[i], value)))
            }
        };

        let t0 = self.config.initial_temperature;
        let cooling = if max_steps > 1 {
            (self.config.final_temperature / t0).powf(1.0 / (max_steps - 1) as f64)
        } else {
            1.0
        };
        let radius = self.config.neighborhood_radius.min(n - 1).max(1);

        let mut current = self.uniform_index(n);
        let mut current_value = evaluate(current)?;
        let (mut best, mut best_value) = (current, current_value);
        let mut scale = current_value.abs().max(SCALE_FLOOR);
        let mut temperature = t0;
        let (mut accepted_moves, mut worse_accepted, mut tunneling_jumps) = (0, 0, 0);

        for _ in 0..max_steps {
            if n > 1 {
                let jump = self.uniform() < self.config.tunneling_rate * temperature / t0;
                let candidate = if jump { self.jump_target(current, n) } else { self.neighbour(current, radius, n) };
                let value = evaluate(candidate)?;
                scale = scale.max(value.abs());
                if value > best_value {
                    best = candidate;
                    best_value = value;
                }

                let delta = value - current_value;
                let accept = delta >= 0.0 || self.uniform() < (delta / (scale * temperature)).exp();
                if accept {
                    accepted_moves += 1;
                    if delta < 0.0 {
                        worse_accepted += 1;
                    }
                    if jump {
                        tunneling_jumps += 1;
                    }
                    current = candidate;
                    current_value = value;
                }
            }
            temperature *= cooling;
        }

        // greedy refinement around the best point
        loop {
            let mut improved = false;
            for next in [best.checked_sub(1), best.checked_add(1).filter(|i| *i < n)].into_iter().flatten() {
                let value = evaluate(next)?;
                if value > best_value {
                    best = next;
                    best_value = value;
                    improved = true;
                }
            }
            if !improved {
                break;
            }
        }

        debug!(accepted_moves, worse_accepted, tunneling_jumps, evaluations, "tunnel search walk finished");
        info!(best = %labels[best], value = best_value, steps = max_steps, "tunnel search complete");

        Ok(TunnelOutcome {
            best_label: labels[best].clone(),
            best_value,
            steps: max_steps,
            accepted_moves,
            worse_accepted,
            tunneling_jumps,
            evaluations,
        })
    }

    /// Uniform index in `0..n` other than `current`.
    fn jump_target(&mut self, current: usize, n: usize) -> usize {
        let i = self.uniform_index(n - 1);
        if i >= current { i + 1 } else { i }
    }

    /// Index `current ± d` with `1 <= d <= radius`, reflected at the ends.
    fn neighbour(&mut self, current: usize, radius: usize, n: usize) -> usize {
        let d = 1 + self.uniform_index(radius);
        let up = current + d < n;
        let down = current >= d;
        match (self.uniform() < 0.5, up, down) {
            (true, true, _) | (false, true, false) => current + d,
            (false, _, true) | (true, false, true) => current - d,
            // d overshoots both ends: take the far end
            _ => if current == 0 { n - 1 } else { 0 },
        }
    }
}
