use std::sync::Arc;

use super::transition_cache::{MassAccumulator, TransitionRecord, validate_distribution};
use crate::domain::{OptionPolicy, RewardFunction, TerminalFunction, TransitionModel};
use crate::error::{PlanningError, Result};
use crate::hashing::{HashableState, StateHashFactory};

/// Limits on the enumeration of an option's executions.
#[derive(Debug, Clone, Copy)]
pub struct OptionModelConfig {
    /// Continuing branches with less probability mass than this are dropped
    pub probability_cutoff: f64,
    /// Executions longer than this many primitive steps are dropped
    pub max_steps: usize,
}

impl Default for OptionModelConfig {
    fn default() -> Self {
        Self {
            probability_cutoff: 1e-5,
            max_steps: 1000,
        }
    }
}

/// Reward, termination and discount an option outcome is computed under.
#[derive(Clone)]
pub struct OptionContext {
    pub reward: Arc<dyn RewardFunction>,
    pub terminal: Arc<dyn TerminalFunction>,
    pub gamma: f64,
    pub config: OptionModelConfig,
}

impl OptionContext {
    pub fn new(
        reward: Arc<dyn RewardFunction>,
        terminal: Arc<dyn TerminalFunction>,
        gamma: f64,
    ) -> Self {
        Self {
            reward,
            terminal,
            gamma,
            config: OptionModelConfig::default(),
        }
    }
}

pub(crate) struct OptionOutcome {
    /// Discounted probability of terminating in each state
    pub records: Vec<TransitionRecord>,
    pub expected_reward: f64,
    pub model_calls: usize,
}

/// Enumerates the executions of `option` from `start` through the primitive model.
///
/// A step `k` (0-based) contributes `gamma^k * r`. Terminating in `s'` after `k + 1` steps
/// contributes `gamma^(k + 1)` times its probability to `s'`, so the caller adds successor
/// values without discounting them again. The first step is always taken.
pub(crate) fn expand(
    option: &dyn OptionPolicy,
    start: &HashableState,
    model: &dyn TransitionModel,
    factory: &dyn StateHashFactory,
    context: &OptionContext,
) -> Result<OptionOutcome> {
    let mut terminated = MassAccumulator::default();
    let mut frontier: Vec<TransitionRecord> = vec![TransitionRecord {
        probability: 1.0,
        state: start.clone(),
    }];
    let mut expected_reward = 0.0;
    let mut discount = 1.0;
    let mut model_calls = 0;
    let mut steps = 0;

    while !frontier.is_empty() && steps < context.config.max_steps {
        steps += 1;
        let next_discount = discount * context.gamma;
        let mut continuing = MassAccumulator::default();

        for branch in frontier {
            let state = branch.state.state();
            let action = option.select_action(state)?;
            if action.is_option() {
                return Err(PlanningError::NestedOption {
                    option: option.name().to_string(),
                });
            }
            let outcomes = model.transitions(state, &action)?;
            model_calls += 1;
            validate_distribution(&action, &outcomes)?;

            for outcome in outcomes {
                let mass = branch.probability * outcome.probability;
                if mass <= 0.0 {
                    continue;
                }
                expected_reward +=
                    discount * mass * context.reward.reward(state, &action, &outcome.state);

                let beta = if context.terminal.is_terminal(&outcome.state) {
                    1.0
                } else {
                    option.termination_probability(&outcome.state).clamp(0.0, 1.0)
                };
                let hashed = factory.hash_state(outcome.state)?;
                if beta > 0.0 {
                    terminated.add(hashed.clone(), mass * beta * next_discount);
                }
                let remaining = mass * (1.0 - beta);
                if remaining > context.config.probability_cutoff {
                    continuing.add(hashed, remaining);
                }
            }
        }

        frontier = continuing.into_records();
        discount = next_discount;
    }

    if !frontier.is_empty() {
        tracing::warn!(
            option = option.name(),
            steps,
            branches = frontier.len(),
            "Option expansion hit the step horizon"
        );
    }

    Ok(OptionOutcome {
        records: terminated.into_records(),
        expected_reward,
        model_calls,
    })
}
