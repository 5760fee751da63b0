//! Planning algorithms and the read-only interfaces policies consume.

pub mod deterministic;
pub mod value_function;

use crate::domain::GroundedAction;
use crate::error::Result;
use crate::state::OOState;

/// Estimated return of taking an action in a state.
#[derive(Debug, Clone, PartialEq)]
pub struct QValue {
    pub action: GroundedAction,
    pub q: f64,
}

/// Common entry point of every planner.
pub trait Planner {
    type Summary;

    fn plan_from_state(&mut self, state: &OOState) -> Result<Self::Summary>;

    /// Drops everything computed so far.
    fn reset_solver(&mut self);
}

/// Read-only access to Q-values. Implementors must not mutate planning state.
pub trait QProvider {
    fn q_values(&self, state: &OOState) -> Result<Vec<QValue>>;

    fn q_value(&self, state: &OOState, action: &GroundedAction) -> Result<QValue>;
}

pub trait ValueFunction {
    fn value(&self, state: &OOState) -> Result<f64>;
}

/// Value assumed for states the planner has not backed up yet.
pub trait ValueFunctionInitialization: Send + Sync {
    fn value(&self, state: &OOState) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantValue(pub f64);

impl ValueFunctionInitialization for ConstantValue {
    fn value(&self, _state: &OOState) -> f64 {
        self.0
    }
}

/// Estimated remaining cost to the goal. Admissible when it never overestimates.
pub trait Heuristic: Send + Sync {
    fn h(&self, state: &OOState) -> f64;
}

impl<F> Heuristic for F
where
    F: Fn(&OOState) -> f64 + Send + Sync,
{
    fn h(&self, state: &OOState) -> f64 {
        self(state)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroHeuristic;

impl Heuristic for ZeroHeuristic {
    fn h(&self, _state: &OOState) -> f64 {
        0.0
    }
}

/// Outcome of a value-based planning call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanningSummary {
    /// Sweeps (value iteration) or rollouts (RTDP) performed
    pub iterations: usize,
    /// Largest value change seen in the final iteration
    pub max_delta: f64,
    pub converged: bool,
    /// Number of states the planner has indexed
    pub states: usize,
}
