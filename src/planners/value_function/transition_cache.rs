use std::collections::HashMap;
use std::sync::Arc;

use super::option_model::{self, OptionContext};
use crate::domain::{ActionKind, GroundedAction, TransitionModel, TransitionProbability};
use crate::error::{PlanningError, Result};
use crate::hashing::{HashableState, StateHashFactory};

const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// One successor of a cached (state, action) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionRecord {
    pub probability: f64,
    pub state: HashableState,
}

/// Everything the planner needs to back up one action in one state.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionTransitions {
    pub action: GroundedAction,
    /// For options the probabilities already carry the multi-step discount
    pub records: Vec<TransitionRecord>,
    /// Discounted reward collected inside an option; `None` for primitive actions
    pub expected_reward: Option<f64>,
}

/// Accumulates probability mass per distinct state, keeping first-seen order.
#[derive(Default)]
pub(crate) struct MassAccumulator {
    index: HashMap<HashableState, usize>,
    entries: Vec<TransitionRecord>,
}

impl MassAccumulator {
    pub(crate) fn add(&mut self, state: HashableState, mass: f64) {
        match self.index.get(&state) {
            Some(&i) => self.entries[i].probability += mass,
            None => {
                self.index.insert(state.clone(), self.entries.len());
                self.entries.push(TransitionRecord {
                    probability: mass,
                    state,
                });
            }
        }
    }

    pub(crate) fn into_records(self) -> Vec<TransitionRecord> {
        self.entries
    }
}

pub(crate) fn validate_distribution(
    action: &GroundedAction,
    outcomes: &[TransitionProbability],
) -> Result<()> {
    let sum: f64 = outcomes.iter().map(|t| t.probability).sum();
    if (sum - 1.0).abs() > PROBABILITY_TOLERANCE || outcomes.iter().any(|t| t.probability < 0.0) {
        return Err(PlanningError::InvalidDistribution {
            action: action.to_string(),
            sum,
        });
    }
    Ok(())
}

/// Memoizes successor distributions per (state, grounded action).
///
/// The transition model is assumed static for the lifetime of the cache; entries are
/// never invalidated except option outcomes, whose reward term depends on the reward
/// and terminal functions in the [`OptionContext`].
pub struct ActionTransitionCache {
    model: Arc<dyn TransitionModel>,
    factory: Arc<dyn StateHashFactory>,
    options: OptionContext,
    entries: HashMap<HashableState, HashMap<GroundedAction, Arc<ActionTransitions>>>,
    model_calls: usize,
}

impl ActionTransitionCache {
    pub fn new(
        model: Arc<dyn TransitionModel>,
        factory: Arc<dyn StateHashFactory>,
        options: OptionContext,
    ) -> Self {
        Self {
            model,
            factory,
            options,
            entries: HashMap::new(),
            model_calls: 0,
        }
    }

    /// Returns the cached outcome, computing it on first request.
    ///
    /// `action` must be expressed in the object names of the state the cache was first
    /// populated with for this key; the value planner handles that translation.
    pub fn transitions_for(
        &mut self,
        state: &HashableState,
        action: &GroundedAction,
    ) -> Result<Arc<ActionTransitions>> {
        if let Some(hit) = self.cached(state, action) {
            return Ok(hit);
        }

        let computed = match action.kind() {
            ActionKind::Primitive => self.query_model(state, action)?,
            ActionKind::Option(option) => {
                let outcome = option_model::expand(
                    option.as_ref(),
                    state,
                    self.model.as_ref(),
                    self.factory.as_ref(),
                    &self.options,
                )?;
                self.model_calls += outcome.model_calls;
                ActionTransitions {
                    action: action.clone(),
                    records: outcome.records,
                    expected_reward: Some(outcome.expected_reward),
                }
            }
        };

        tracing::trace!(
            action = %action,
            outcomes = computed.records.len(),
            "Cached transitions"
        );
        let entry = Arc::new(computed);
        self.entries
            .entry(state.clone())
            .or_default()
            .insert(action.clone(), entry.clone());
        Ok(entry)
    }

    /// Read-only lookup; never invokes the model.
    pub fn cached(
        &self,
        state: &HashableState,
        action: &GroundedAction,
    ) -> Option<Arc<ActionTransitions>> {
        self.entries
            .get(state)
            .and_then(|per_action| per_action.get(action))
            .cloned()
    }

    /// Replaces the reward/terminal context used for options and drops option outcomes.
    pub fn set_option_context(&mut self, options: OptionContext) {
        self.options = options;
        for per_action in self.entries.values_mut() {
            per_action.retain(|action, _| !action.is_option());
        }
    }

    pub fn model_invocations(&self) -> usize {
        self.model_calls
    }

    /// Number of cached (state, action) pairs.
    pub fn len(&self) -> usize {
        self.entries.values().map(|m| m.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn query_model(
        &mut self,
        state: &HashableState,
        action: &GroundedAction,
    ) -> Result<ActionTransitions> {
        let outcomes = self.model.transitions(state.state(), action)?;
        self.model_calls += 1;
        validate_distribution(action, &outcomes)?;

        let mut merged = MassAccumulator::default();
        for outcome in outcomes {
            let hashed = self.factory.hash_state(outcome.state)?;
            merged.add(hashed, outcome.probability);
        }
        Ok(ActionTransitions {
            action: action.clone(),
            records: merged.into_records(),
            expected_reward: None,
        })
    }
}
