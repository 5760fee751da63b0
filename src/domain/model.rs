use std::sync::Arc;

use rand::Rng;

use super::action::{Action, GroundedAction};
use crate::error::Result;
use crate::state::OOState;

/// One possible outcome of applying an action.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionProbability {
    pub probability: f64,
    pub state: OOState,
}

impl TransitionProbability {
    pub fn new(probability: f64, state: OOState) -> Self {
        Self { probability, state }
    }

    pub fn certain(state: OOState) -> Self {
        Self::new(1.0, state)
    }
}

/// Full successor distribution of a primitive action. Probabilities of one call must sum
/// to one.
pub trait TransitionModel: Send + Sync {
    fn transitions(
        &self,
        state: &OOState,
        action: &GroundedAction,
    ) -> Result<Vec<TransitionProbability>>;
}

impl<F> TransitionModel for F
where
    F: Fn(&OOState, &GroundedAction) -> Result<Vec<TransitionProbability>> + Send + Sync,
{
    fn transitions(
        &self,
        state: &OOState,
        action: &GroundedAction,
    ) -> Result<Vec<TransitionProbability>> {
        self(state, action)
    }
}

pub trait RewardFunction: Send + Sync {
    fn reward(&self, state: &OOState, action: &GroundedAction, successor: &OOState) -> f64;
}

impl<F> RewardFunction for F
where
    F: Fn(&OOState, &GroundedAction, &OOState) -> f64 + Send + Sync,
{
    fn reward(&self, state: &OOState, action: &GroundedAction, successor: &OOState) -> f64 {
        self(state, action, successor)
    }
}

pub trait TerminalFunction: Send + Sync {
    fn is_terminal(&self, state: &OOState) -> bool;
}

impl<F> TerminalFunction for F
where
    F: Fn(&OOState) -> bool + Send + Sync,
{
    fn is_terminal(&self, state: &OOState) -> bool {
        self(state)
    }
}

/// Terminal function for continuing tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTermination;

impl TerminalFunction for NullTermination {
    fn is_terminal(&self, _state: &OOState) -> bool {
        false
    }
}

/// Goal predicate used by forward search.
pub trait StateConditionTest: Send + Sync {
    fn satisfies(&self, state: &OOState) -> bool;
}

impl<F> StateConditionTest for F
where
    F: Fn(&OOState) -> bool + Send + Sync,
{
    fn satisfies(&self, state: &OOState) -> bool {
        self(state)
    }
}

/// A transition model together with the action set it supports.
#[derive(Clone)]
pub struct Domain {
    model: Arc<dyn TransitionModel>,
    actions: Vec<Action>,
}

impl Domain {
    pub fn new(model: impl TransitionModel + 'static) -> Self {
        Self {
            model: Arc::new(model),
            actions: Vec::new(),
        }
    }

    pub fn from_shared(model: Arc<dyn TransitionModel>) -> Self {
        Self {
            model,
            actions: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn model(&self) -> &Arc<dyn TransitionModel> {
        &self.model
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Every grounding of every action applicable in `state`, in declaration order.
    pub fn applicable_actions(&self, state: &OOState) -> Vec<GroundedAction> {
        self.actions
            .iter()
            .flat_map(|a| a.applicable_actions(state))
            .collect()
    }

    pub fn has_parameterized_actions(&self) -> bool {
        self.actions.iter().any(|a| a.is_parameterized())
    }
}

/// Draws one entry from a distribution, weighting by probability.
///
/// Weights need not be normalized. Returns `None` for an empty slice.
pub fn sample_index<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    let total: f64 = weights.iter().sum();
    if weights.is_empty() {
        return None;
    }
    if total <= 0.0 {
        return Some(rng.random_range(0..weights.len()));
    }
    let roll = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    for (i, w) in weights.iter().enumerate() {
        cumulative += w;
        if roll < cumulative {
            return Some(i);
        }
    }
    Some(weights.len() - 1)
}
