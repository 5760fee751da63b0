//! Policies derived from planner output, and rollouts that execute them.

mod cached;
mod q_policies;
mod rollout;
mod search;

pub use cached::CachedPolicy;
pub use q_policies::{BoltzmannQPolicy, EpsilonGreedy, GreedyDeterministicQPolicy, GreedyQPolicy};
pub use rollout::{Episode, rollout};
pub use search::SearchPolicy;

use rand::RngCore;

use crate::domain::{GroundedAction, sample_index};
use crate::error::{PlanningError, Result};
use crate::state::OOState;

/// Probability of selecting an action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionProb {
    pub action: GroundedAction,
    pub probability: f64,
}

impl ActionProb {
    pub fn new(action: GroundedAction, probability: f64) -> Self {
        Self {
            action,
            probability,
        }
    }
}

/// Maps states to actions. Policies only read from the planners they wrap.
pub trait Policy {
    /// Draws an action from [`Policy::action_distribution`].
    fn action(&self, state: &OOState, rng: &mut dyn RngCore) -> Result<GroundedAction> {
        let mut distribution = self.action_distribution(state)?;
        let weights: Vec<f64> = distribution.iter().map(|p| p.probability).collect();
        let index = sample_index(&weights, rng).ok_or(PlanningError::NoApplicableActions)?;
        Ok(distribution.swap_remove(index).action)
    }

    /// Candidate actions and their probabilities, which sum to one.
    fn action_distribution(&self, state: &OOState) -> Result<Vec<ActionProb>>;

    fn is_stochastic(&self) -> bool;

    fn is_defined_for(&self, state: &OOState) -> bool;
}
