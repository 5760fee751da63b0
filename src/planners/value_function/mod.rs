//! Tabular Bellman-backup engine shared by value iteration and RTDP.

mod option_model;
mod rtdp;
mod transition_cache;
mod value_iteration;

pub use option_model::{OptionContext, OptionModelConfig};
pub use rtdp::{Rtdp, RtdpConfig};
pub use transition_cache::{ActionTransitionCache, ActionTransitions, TransitionRecord};
pub(crate) use transition_cache::MassAccumulator;
pub use value_iteration::{ValueIteration, ValueIterationConfig};

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use super::{ConstantValue, QProvider, QValue, ValueFunction, ValueFunctionInitialization};
use crate::domain::{Domain, GroundedAction, RewardFunction, TerminalFunction};
use crate::error::{PlanningError, Result};
use crate::hashing::{HashableState, StateHashFactory};
use crate::state::OOState;

/// Value table, Q computation and the backup primitive.
///
/// The planner owns its value table, indexed-state table and transition cache. The
/// outer loop that decides which states to back up lives in [`ValueIteration`] and
/// [`Rtdp`].
pub struct ValueFunctionPlanner {
    domain: Domain,
    reward: Arc<dyn RewardFunction>,
    terminal: Arc<dyn TerminalFunction>,
    factory: Arc<dyn StateHashFactory>,
    gamma: f64,
    value_initialization: Arc<dyn ValueFunctionInitialization>,
    option_config: OptionModelConfig,
    values: HashMap<HashableState, f64>,
    /// Representative of each known state and its applicable actions, in its own names
    indexed: HashMap<HashableState, Vec<GroundedAction>>,
    cache: ActionTransitionCache,
    match_names: bool,
}

impl ValueFunctionPlanner {
    pub fn new(
        domain: Domain,
        reward: impl RewardFunction + 'static,
        terminal: impl TerminalFunction + 'static,
        factory: impl StateHashFactory + 'static,
        gamma: f64,
    ) -> Result<Self> {
        Self::from_shared(
            domain,
            Arc::new(reward),
            Arc::new(terminal),
            Arc::new(factory),
            gamma,
        )
    }

    pub fn from_shared(
        domain: Domain,
        reward: Arc<dyn RewardFunction>,
        terminal: Arc<dyn TerminalFunction>,
        factory: Arc<dyn StateHashFactory>,
        gamma: f64,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&gamma) {
            return Err(PlanningError::InvalidParameter(format!(
                "discount must lie in [0, 1], got {}",
                gamma
            )));
        }
        let option_config = OptionModelConfig::default();
        let context = OptionContext {
            reward: reward.clone(),
            terminal: terminal.clone(),
            gamma,
            config: option_config,
        };
        let cache = ActionTransitionCache::new(domain.model().clone(), factory.clone(), context);
        let match_names = factory.object_identifier_independent() && domain.has_parameterized_actions();

        Ok(Self {
            domain,
            reward,
            terminal,
            factory,
            gamma,
            value_initialization: Arc::new(ConstantValue(0.0)),
            option_config,
            values: HashMap::new(),
            indexed: HashMap::new(),
            cache,
            match_names,
        })
    }

    pub fn with_value_initialization(
        mut self,
        initialization: impl ValueFunctionInitialization + 'static,
    ) -> Self {
        self.value_initialization = Arc::new(initialization);
        self
    }

    pub fn with_option_config(mut self, config: OptionModelConfig) -> Self {
        self.option_config = config;
        let context = self.option_context();
        self.cache.set_option_context(context);
        self
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn hashing_factory(&self) -> &Arc<dyn StateHashFactory> {
        &self.factory
    }

    pub fn transition_cache(&self) -> &ActionTransitionCache {
        &self.cache
    }

    pub fn hash_state(&self, state: &OOState) -> Result<HashableState> {
        self.factory.hash_state(state.clone())
    }

    pub fn is_terminal(&self, state: &HashableState) -> bool {
        self.terminal.is_terminal(state.state())
    }

    pub fn is_indexed(&self, state: &HashableState) -> bool {
        self.indexed.contains_key(state)
    }

    pub fn num_indexed(&self) -> usize {
        self.indexed.len()
    }

    /// Current estimate for `state`; terminal states are worth zero and unvisited states
    /// fall back to the value initialization.
    pub fn value_of(&self, state: &HashableState) -> f64 {
        if self.is_terminal(state) {
            return 0.0;
        }
        match self.values.get(state) {
            Some(v) => *v,
            None => self.value_initialization.value(state.state()),
        }
    }

    /// States the planner has indexed, as their stored representatives.
    pub fn all_known_states(&self) -> Vec<OOState> {
        self.indexed.keys().map(|s| s.state().clone()).collect()
    }

    pub(crate) fn indexed_states(&self) -> Vec<HashableState> {
        self.indexed.keys().cloned().collect()
    }

    /// Registers `state` and caches the transitions of every applicable action.
    /// Returns the stored representative, which may use different object names.
    pub fn index_state(&mut self, state: &HashableState) -> Result<HashableState> {
        if let Some((representative, _)) = self.indexed.get_key_value(state) {
            return Ok(representative.clone());
        }
        let actions = if self.is_terminal(state) {
            Vec::new()
        } else {
            self.domain.applicable_actions(state.state())
        };
        for action in &actions {
            self.cache.transitions_for(state, action)?;
        }
        self.indexed.insert(state.clone(), actions);
        Ok(state.clone())
    }

    /// Indexes every state reachable from `state`. Returns how many were new.
    pub fn perform_reachability_from(&mut self, state: &OOState) -> Result<usize> {
        let start = self.hash_state(state)?;
        let mut open = VecDeque::from([start]);
        let mut added = 0;

        while let Some(current) = open.pop_front() {
            if self.indexed.contains_key(&current) {
                continue;
            }
            let representative = self.index_state(&current)?;
            added += 1;
            for successor in self.successors_of(&representative) {
                if !self.indexed.contains_key(&successor) {
                    open.push_back(successor);
                }
            }
        }

        tracing::debug!(added, total = self.indexed.len(), "Reachability pass finished");
        Ok(added)
    }

    /// `V(s) <- max_a Q(s, a)`. Indexes the state first when needed.
    pub fn perform_bellman_update_on(&mut self, state: &HashableState) -> Result<f64> {
        let representative = self.index_state(state)?;
        if self.is_terminal(&representative) {
            self.values.insert(representative, 0.0);
            return Ok(0.0);
        }
        let best = {
            let actions = self
                .indexed
                .get(&representative)
                .ok_or(PlanningError::StateNotIndexed)?;
            let mut best: Option<f64> = None;
            for action in actions {
                let q = self.compute_q(&representative, action)?;
                best = Some(best.map_or(q, |b: f64| b.max(q)));
            }
            best.unwrap_or(0.0)
        };
        tracing::trace!(value = best, "Bellman update");
        self.values.insert(representative, best);
        Ok(best)
    }

    /// Q-values of every applicable action, in the caller's object names.
    pub fn q_values_for(&self, state: &HashableState) -> Result<Vec<QValue>> {
        let (representative, actions) = self
            .indexed
            .get_key_value(state)
            .ok_or(PlanningError::StateNotIndexed)?;
        let back = self.name_mapping(representative, state);
        actions
            .iter()
            .map(|action| {
                let q = self.compute_q(representative, action)?;
                let action = match &back {
                    Some(mapping) => action.translate(mapping),
                    None => action.clone(),
                };
                Ok(QValue { action, q })
            })
            .collect()
    }

    pub fn q_value_for(&self, state: &HashableState, action: &GroundedAction) -> Result<QValue> {
        let (representative, _) = self
            .indexed
            .get_key_value(state)
            .ok_or(PlanningError::StateNotIndexed)?;
        let q = match self.name_mapping(state, representative) {
            Some(mapping) => self.compute_q(representative, &action.translate(&mapping))?,
            None => self.compute_q(representative, action)?,
        };
        Ok(QValue {
            action: action.clone(),
            q,
        })
    }

    /// Cached transitions of `action` in `state`, translating names as needed.
    pub fn transitions_of(
        &self,
        state: &HashableState,
        action: &GroundedAction,
    ) -> Result<Arc<ActionTransitions>> {
        let (representative, _) = self
            .indexed
            .get_key_value(state)
            .ok_or(PlanningError::StateNotIndexed)?;
        let translated = match self.name_mapping(state, representative) {
            Some(mapping) => action.translate(&mapping),
            None => action.clone(),
        };
        self.cache
            .cached(representative, &translated)
            .ok_or_else(|| PlanningError::NoCachedTransitions {
                action: action.to_string(),
            })
    }

    /// Clears the value table; cached transitions are kept.
    pub fn reset_values(&mut self) {
        self.values.clear();
    }

    /// Clears values, indexed states and the transition cache.
    pub fn reset_planner_results(&mut self) {
        self.values.clear();
        self.indexed.clear();
        self.cache.clear();
    }

    /// Swaps the reward function. Values are discarded; primitive transitions are kept.
    pub fn set_reward_function(&mut self, reward: impl RewardFunction + 'static) {
        self.reward = Arc::new(reward);
        self.invalidate_task();
    }

    /// Swaps the terminal function. Values and indexing are discarded; primitive
    /// transitions are kept.
    pub fn set_terminal_function(&mut self, terminal: impl TerminalFunction + 'static) {
        self.terminal = Arc::new(terminal);
        self.invalidate_task();
    }

    pub fn set_value_initialization(
        &mut self,
        initialization: impl ValueFunctionInitialization + 'static,
    ) {
        self.value_initialization = Arc::new(initialization);
    }

    fn invalidate_task(&mut self) {
        self.values.clear();
        self.indexed.clear();
        let context = self.option_context();
        self.cache.set_option_context(context);
    }

    fn option_context(&self) -> OptionContext {
        OptionContext {
            reward: self.reward.clone(),
            terminal: self.terminal.clone(),
            gamma: self.gamma,
            config: self.option_config,
        }
    }

    fn successors_of(&self, representative: &HashableState) -> Vec<HashableState> {
        let Some(actions) = self.indexed.get(representative) else {
            return Vec::new();
        };
        actions
            .iter()
            .filter_map(|a| self.cache.cached(representative, a))
            .flat_map(|t| {
                t.records
                    .iter()
                    .map(|r| r.state.clone())
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Name mapping from `from` to `to`, or `None` when no translation is needed.
    fn name_mapping(
        &self,
        from: &HashableState,
        to: &HashableState,
    ) -> Option<HashMap<String, String>> {
        if !self.match_names || from.same_bindings(to) {
            return None;
        }
        from.object_matching(to)
    }

    /// `action` must already be in `representative`'s names.
    fn compute_q(&self, representative: &HashableState, action: &GroundedAction) -> Result<f64> {
        let transitions = self.cache.cached(representative, action).ok_or_else(|| {
            PlanningError::NoCachedTransitions {
                action: action.to_string(),
            }
        })?;

        let q = match transitions.expected_reward {
            // Option outcomes are already discounted.
            Some(expected_reward) => {
                expected_reward
                    + transitions
                        .records
                        .iter()
                        .map(|r| r.probability * self.value_of(&r.state))
                        .sum::<f64>()
            }
            None => transitions
                .records
                .iter()
                .map(|r| {
                    let reward =
                        self.reward
                            .reward(representative.state(), action, r.state.state());
                    r.probability * (reward + self.gamma * self.value_of(&r.state))
                })
                .sum(),
        };
        Ok(q)
    }
}

impl QProvider for ValueFunctionPlanner {
    fn q_values(&self, state: &OOState) -> Result<Vec<QValue>> {
        self.q_values_for(&self.hash_state(state)?)
    }

    fn q_value(&self, state: &OOState, action: &GroundedAction) -> Result<QValue> {
        self.q_value_for(&self.hash_state(state)?, action)
    }
}

impl ValueFunction for ValueFunctionPlanner {
    fn value(&self, state: &OOState) -> Result<f64> {
        Ok(self.value_of(&self.hash_state(state)?))
    }
}
