use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;

use super::ValueFunctionPlanner;
use crate::domain::{GroundedAction, sample_index};
use crate::error::{PlanningError, Result};
use crate::hashing::HashableState;
use crate::planners::{Planner, PlanningSummary, QProvider, QValue, ValueFunction};
use crate::state::OOState;

const TIE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy)]
pub struct RtdpConfig {
    pub num_rollouts: usize,
    pub max_depth: usize,
    /// A rollout whose largest backup change is below this counts as stable
    pub max_delta: f64,
    /// Consecutive stable rollouts needed to stop early
    pub convergence_rollouts: usize,
    pub seed: u64,
    pub time_budget: Option<Duration>,
}

impl Default for RtdpConfig {
    fn default() -> Self {
        Self {
            num_rollouts: 1000,
            max_depth: 100,
            max_delta: 1e-4,
            convergence_rollouts: 10,
            seed: 0,
            time_budget: None,
        }
    }
}

/// Real-time dynamic programming: backs up only the states greedy rollouts visit.
pub struct Rtdp {
    planner: ValueFunctionPlanner,
    config: RtdpConfig,
    rng: StdRng,
}

impl Rtdp {
    pub fn new(planner: ValueFunctionPlanner, config: RtdpConfig) -> Self {
        Self {
            planner,
            rng: StdRng::seed_from_u64(config.seed),
            config,
        }
    }

    pub fn planner(&self) -> &ValueFunctionPlanner {
        &self.planner
    }

    pub fn planner_mut(&mut self) -> &mut ValueFunctionPlanner {
        &mut self.planner
    }

    pub fn config(&self) -> &RtdpConfig {
        &self.config
    }

    /// One greedy trial from `start`. Returns the largest value change it made.
    fn rollout(&mut self, start: &HashableState) -> Result<f64> {
        let mut current = start.clone();
        let mut max_delta: f64 = 0.0;

        for _ in 0..self.config.max_depth {
            let state = self.planner.index_state(&current)?;
            if self.planner.is_terminal(&state) {
                break;
            }
            let before = self.planner.value_of(&state);
            let after = self.planner.perform_bellman_update_on(&state)?;
            max_delta = max_delta.max((after - before).abs());

            let Some(action) = self.greedy_action(&state)? else {
                break;
            };
            let transitions = self.planner.transitions_of(&state, &action)?;
            let weights: Vec<f64> = transitions.records.iter().map(|r| r.probability).collect();
            // Options that never terminate have no outcome to follow.
            let Some(next) = sample_index(&weights, &mut self.rng) else {
                break;
            };
            current = transitions.records[next].state.clone();
        }

        Ok(max_delta)
    }

    fn greedy_action(&mut self, state: &HashableState) -> Result<Option<GroundedAction>> {
        let qs = self.planner.q_values_for(state)?;
        let best = qs.iter().map(|q| q.q).fold(f64::NEG_INFINITY, f64::max);
        let ties: Vec<&QValue> = qs
            .iter()
            .filter(|q| (q.q - best).abs() <= TIE_TOLERANCE)
            .collect();
        Ok(ties.choose(&mut self.rng).map(|q| q.action.clone()))
    }
}

impl Planner for Rtdp {
    type Summary = PlanningSummary;

    fn plan_from_state(&mut self, state: &OOState) -> Result<PlanningSummary> {
        if self.config.num_rollouts == 0 {
            return Err(PlanningError::InvalidParameter(
                "RTDP needs at least one rollout".to_string(),
            ));
        }
        let started = Instant::now();
        let start = self.planner.hash_state(state)?;
        let mut rollouts = 0;
        let mut stable = 0;
        let mut last_delta = f64::INFINITY;

        while rollouts < self.config.num_rollouts {
            if let Some(budget) = self.config.time_budget {
                if started.elapsed() >= budget {
                    tracing::warn!(rollouts, "RTDP stopped by time budget");
                    break;
                }
            }

            last_delta = self.rollout(&start)?;
            rollouts += 1;
            tracing::trace!(rollout = rollouts, max_delta = last_delta, "RTDP rollout");

            if last_delta < self.config.max_delta {
                stable += 1;
                if stable >= self.config.convergence_rollouts {
                    break;
                }
            } else {
                stable = 0;
            }
        }

        let summary = PlanningSummary {
            iterations: rollouts,
            max_delta: last_delta,
            converged: stable >= self.config.convergence_rollouts,
            states: self.planner.num_indexed(),
        };
        tracing::info!(
            rollouts = summary.iterations,
            converged = summary.converged,
            states = summary.states,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "RTDP finished"
        );
        Ok(summary)
    }

    fn reset_solver(&mut self) {
        self.planner.reset_planner_results();
        self.rng = StdRng::seed_from_u64(self.config.seed);
    }
}

impl QProvider for Rtdp {
    fn q_values(&self, state: &OOState) -> Result<Vec<QValue>> {
        self.planner.q_values(state)
    }

    fn q_value(&self, state: &OOState, action: &GroundedAction) -> Result<QValue> {
        self.planner.q_value(state, action)
    }
}

impl ValueFunction for Rtdp {
    fn value(&self, state: &OOState) -> Result<f64> {
        self.planner.value(state)
    }
}
