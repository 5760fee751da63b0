use std::time::{Duration, Instant};

use super::ValueFunctionPlanner;
use crate::domain::GroundedAction;
use crate::error::Result;
use crate::planners::{Planner, PlanningSummary, QProvider, QValue, ValueFunction};
use crate::state::OOState;

#[derive(Debug, Clone, Copy)]
pub struct ValueIterationConfig {
    /// Stop once no state changes by more than this in one sweep
    pub max_delta: f64,
    pub max_iterations: usize,
    /// Wall-clock budget, checked between sweeps
    pub time_budget: Option<Duration>,
}

impl Default for ValueIterationConfig {
    fn default() -> Self {
        Self {
            max_delta: 1e-4,
            max_iterations: 1000,
            time_budget: None,
        }
    }
}

/// Synchronous in-place sweeps over every state reachable from the start state.
pub struct ValueIteration {
    planner: ValueFunctionPlanner,
    config: ValueIterationConfig,
}

impl ValueIteration {
    pub fn new(planner: ValueFunctionPlanner, config: ValueIterationConfig) -> Self {
        Self { planner, config }
    }

    pub fn planner(&self) -> &ValueFunctionPlanner {
        &self.planner
    }

    pub fn planner_mut(&mut self) -> &mut ValueFunctionPlanner {
        &mut self.planner
    }

    pub fn config(&self) -> &ValueIterationConfig {
        &self.config
    }

    fn run_sweeps(&mut self) -> Result<PlanningSummary> {
        let started = Instant::now();
        let states = self.planner.indexed_states();
        let mut iterations = 0;
        let mut max_delta = f64::INFINITY;

        while iterations < self.config.max_iterations {
            if let Some(budget) = self.config.time_budget {
                if started.elapsed() >= budget {
                    tracing::warn!(
                        iterations,
                        max_delta,
                        "Value iteration stopped by time budget"
                    );
                    break;
                }
            }

            max_delta = 0.0;
            for state in &states {
                let before = self.planner.value_of(state);
                let after = self.planner.perform_bellman_update_on(state)?;
                max_delta = f64::max(max_delta, (after - before).abs());
            }
            iterations += 1;
            tracing::debug!(iteration = iterations, max_delta, "Value iteration sweep");

            if max_delta < self.config.max_delta {
                break;
            }
        }

        let summary = PlanningSummary {
            iterations,
            max_delta,
            converged: max_delta < self.config.max_delta,
            states: states.len(),
        };
        tracing::info!(
            iterations = summary.iterations,
            max_delta = summary.max_delta,
            converged = summary.converged,
            states = summary.states,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Value iteration finished"
        );
        Ok(summary)
    }
}

impl Planner for ValueIteration {
    type Summary = PlanningSummary;

    fn plan_from_state(&mut self, state: &OOState) -> Result<PlanningSummary> {
        let start = self.planner.hash_state(state)?;
        if !self.planner.is_indexed(&start) {
            self.planner.perform_reachability_from(state)?;
        }
        self.run_sweeps()
    }

    fn reset_solver(&mut self) {
        self.planner.reset_planner_results();
    }
}

impl QProvider for ValueIteration {
    fn q_values(&self, state: &OOState) -> Result<Vec<QValue>> {
        self.planner.q_values(state)
    }

    fn q_value(&self, state: &OOState, action: &GroundedAction) -> Result<QValue> {
        self.planner.q_value(state, action)
    }
}

impl ValueFunction for ValueIteration {
    fn value(&self, state: &OOState) -> Result<f64> {
        self.planner.value(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::HashableStateFactory;
    use crate::infra::Position;
    use crate::infra::grid::GridWorld;

    fn grid_vi(grid: &GridWorld, goal: Position) -> ValueIteration {
        let planner = ValueFunctionPlanner::new(
            grid.domain(),
            |_: &OOState, _: &GroundedAction, _: &OOState| -1.0,
            GridWorld::goal_at(goal),
            HashableStateFactory::identifier_independent(),
            1.0,
        )
        .unwrap();
        ValueIteration::new(planner, ValueIterationConfig::default())
    }

    #[test]
    fn test_grid_value_matches_shortest_path() {
        let grid = GridWorld::new(5, 5);
        let mut vi = grid_vi(&grid, Position::new(4, 4));
        let start = grid.state_at(Position::new(0, 0)).unwrap();

        let summary = vi.plan_from_state(&start).unwrap();
        assert!(summary.converged);
        assert_eq!(summary.states, 25);
        assert!((vi.value(&start).unwrap() + 8.0).abs() < 1e-9);

        let mid = grid.state_at(Position::new(2, 3)).unwrap();
        assert!((vi.value(&mid).unwrap() + 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_values_consistent_with_q_after_sweep() {
        let grid = GridWorld::new(4, 3)
            .with_wall(Position::new(1, 1))
            .with_slip(0.2);
        let planner = ValueFunctionPlanner::new(
            grid.domain(),
            |_: &OOState, _: &GroundedAction, _: &OOState| -1.0,
            GridWorld::goal_at(Position::new(3, 2)),
            HashableStateFactory::identifier_independent(),
            0.95,
        )
        .unwrap();
        let mut vi = ValueIteration::new(
            planner,
            ValueIterationConfig {
                max_delta: 1e-10,
                ..Default::default()
            },
        );
        vi.plan_from_state(&grid.state_at(Position::new(0, 0)).unwrap())
            .unwrap();

        for state in vi.planner().all_known_states() {
            let qs = vi.q_values(&state).unwrap();
            let v = vi.value(&state).unwrap();
            if qs.is_empty() {
                assert_eq!(v, 0.0);
                continue;
            }
            let best = qs.iter().map(|q| q.q).fold(f64::NEG_INFINITY, f64::max);
            assert!((v - best).abs() < 1e-8, "V={} max Q={}", v, best);
        }
    }

    #[test]
    fn test_iteration_cap_reports_not_converged() {
        let grid = GridWorld::new(5, 5);
        let planner = ValueFunctionPlanner::new(
            grid.domain(),
            |_: &OOState, _: &GroundedAction, _: &OOState| -1.0,
            GridWorld::goal_at(Position::new(4, 4)),
            HashableStateFactory::identifier_independent(),
            1.0,
        )
        .unwrap();
        let mut vi = ValueIteration::new(
            planner,
            ValueIterationConfig {
                max_iterations: 1,
                ..Default::default()
            },
        );
        let summary = vi
            .plan_from_state(&grid.state_at(Position::new(0, 0)).unwrap())
            .unwrap();
        assert_eq!(summary.iterations, 1);
        assert!(!summary.converged);
    }
}
