use super::{ActionProb, Policy};
use crate::error::Result;
use crate::planners::deterministic::{DeterministicPlanner, SearchStrategy};
use crate::state::OOState;

/// Follows the actions a deterministic planner recorded.
pub struct SearchPolicy<'a, S: SearchStrategy> {
    planner: &'a DeterministicPlanner<S>,
}

impl<'a, S: SearchStrategy> SearchPolicy<'a, S> {
    pub fn new(planner: &'a DeterministicPlanner<S>) -> Self {
        Self { planner }
    }
}

impl<S: SearchStrategy> Policy for SearchPolicy<'_, S> {
    fn action_distribution(&self, state: &OOState) -> Result<Vec<ActionProb>> {
        let action = self.planner.query_selected_action(state)?;
        Ok(vec![ActionProb::new(action, 1.0)])
    }

    fn is_stochastic(&self) -> bool {
        false
    }

    fn is_defined_for(&self, state: &OOState) -> bool {
        self.planner.has_cached_plan(state).unwrap_or(false)
    }
}
