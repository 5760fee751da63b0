use rand::{Rng, RngCore};

use super::Policy;
use crate::domain::{
    ActionKind, GroundedAction, OptionPolicy, RewardFunction, TerminalFunction, TransitionModel,
    sample_index,
};
use crate::error::{PlanningError, Result};
use crate::state::OOState;

/// A recorded trajectory of primitive steps.
///
/// `states` holds one more entry than `actions` and `rewards`: the start state first,
/// then the state reached by each step.
#[derive(Debug, Clone, Default)]
pub struct Episode {
    pub states: Vec<OOState>,
    pub actions: Vec<GroundedAction>,
    pub rewards: Vec<f64>,
}

impl Episode {
    fn start(state: OOState) -> Self {
        Self {
            states: vec![state],
            actions: Vec::new(),
            rewards: Vec::new(),
        }
    }

    /// Number of primitive steps taken.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn last_state(&self) -> Option<&OOState> {
        self.states.last()
    }

    pub fn discounted_return(&self, gamma: f64) -> f64 {
        self.rewards
            .iter()
            .rev()
            .fold(0.0, |acc, r| r + gamma * acc)
    }

    fn record(&mut self, action: GroundedAction, reward: f64, next: OOState) {
        self.actions.push(action);
        self.rewards.push(reward);
        self.states.push(next);
    }
}

/// Executes `policy` from `start` by sampling the transition model.
///
/// Options chosen by the policy are run step by step until their termination test fires,
/// and each of their primitive steps is recorded. The episode ends at a terminal state or
/// after `max_steps` primitive steps.
pub fn rollout<P, R>(
    policy: &P,
    model: &dyn TransitionModel,
    reward: &dyn RewardFunction,
    terminal: &dyn TerminalFunction,
    start: &OOState,
    max_steps: usize,
    rng: &mut R,
) -> Result<Episode>
where
    P: Policy + ?Sized,
    R: Rng,
{
    let mut episode = Episode::start(start.clone());
    let mut current = start.clone();

    while episode.len() < max_steps && !terminal.is_terminal(&current) {
        let action = policy.action(&current, rng)?;
        let option = match action.kind() {
            ActionKind::Primitive => None,
            ActionKind::Option(option) => Some(option.clone()),
        };
        match option {
            None => {
                current = step(model, reward, &current, action, rng, &mut episode)?;
            }
            Some(option) => {
                current = run_option(
                    option.as_ref(),
                    model,
                    reward,
                    terminal,
                    current,
                    max_steps,
                    rng,
                    &mut episode,
                )?;
            }
        }
    }

    tracing::debug!(
        steps = episode.len(),
        terminal = terminal.is_terminal(&current),
        "Rollout finished"
    );
    Ok(episode)
}

fn step(
    model: &dyn TransitionModel,
    reward: &dyn RewardFunction,
    state: &OOState,
    action: GroundedAction,
    rng: &mut dyn RngCore,
    episode: &mut Episode,
) -> Result<OOState> {
    let outcomes = model.transitions(state, &action)?;
    let weights: Vec<f64> = outcomes.iter().map(|t| t.probability).collect();
    let index = sample_index(&weights, rng).ok_or_else(|| PlanningError::InvalidDistribution {
        action: action.to_string(),
        sum: 0.0,
    })?;
    let next = outcomes
        .into_iter()
        .nth(index)
        .ok_or(PlanningError::NoApplicableActions)?
        .state;
    let r = reward.reward(state, &action, &next);
    episode.record(action, r, next.clone());
    Ok(next)
}

#[allow(clippy::too_many_arguments)]
fn run_option(
    option: &dyn OptionPolicy,
    model: &dyn TransitionModel,
    reward: &dyn RewardFunction,
    terminal: &dyn TerminalFunction,
    mut current: OOState,
    max_steps: usize,
    rng: &mut dyn RngCore,
    episode: &mut Episode,
) -> Result<OOState> {
    loop {
        let action = option.select_action(&current)?;
        if action.is_option() {
            return Err(PlanningError::NestedOption {
                option: option.name().to_string(),
            });
        }
        current = step(model, reward, &current, action, rng, episode)?;

        if episode.len() >= max_steps || terminal.is_terminal(&current) {
            return Ok(current);
        }
        let beta = option.termination_probability(&current);
        if rng.random::<f64>() < beta {
            return Ok(current);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Action, ClosureOption};
    use crate::hashing::HashableStateFactory;
    use crate::infra::Position;
    use crate::infra::grid::GridWorld;
    use crate::planners::Planner;
    use crate::planners::value_function::{
        ValueFunctionPlanner, ValueIteration, ValueIterationConfig,
    };
    use crate::policy::{ActionProb, GreedyQPolicy};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn step_cost(_: &OOState, _: &GroundedAction, _: &OOState) -> f64 {
        -1.0
    }

    #[test]
    fn test_greedy_rollout_follows_shortest_path() {
        let grid = GridWorld::new(5, 5);
        let goal = GridWorld::goal_at(Position::new(4, 4));
        let planner = ValueFunctionPlanner::new(
            grid.domain(),
            step_cost,
            goal.clone(),
            HashableStateFactory::identifier_independent(),
            1.0,
        )
        .unwrap();
        let mut vi = ValueIteration::new(planner, ValueIterationConfig::default());
        let start = grid.state_at(Position::new(0, 0)).unwrap();
        vi.plan_from_state(&start).unwrap();

        let policy = GreedyQPolicy::new(&vi);
        let mut rng = StdRng::seed_from_u64(11);
        let episode = rollout(&policy, &grid, &step_cost, &goal, &start, 50, &mut rng).unwrap();

        assert_eq!(episode.len(), 8);
        assert_eq!(episode.states.len(), 9);
        assert!((episode.discounted_return(1.0) + 8.0).abs() < 1e-12);
        let last = episode.last_state().unwrap();
        assert_eq!(GridWorld::agent_position(last).unwrap(), Position::new(4, 4));
    }

    #[test]
    fn test_options_expand_into_primitive_steps() {
        struct AlwaysRun;
        impl Policy for AlwaysRun {
            fn action_distribution(&self, _: &OOState) -> Result<Vec<ActionProb>> {
                let option = ClosureOption::new(
                    "run_east",
                    |_: &OOState| true,
                    |_: &OOState| Ok(GroundedAction::new("east")),
                    |s: &OOState| {
                        let done = GridWorld::agent_position(s).map(|p| p.x == 3).unwrap_or(true);
                        if done { 1.0 } else { 0.0 }
                    },
                );
                let grounded = Action::option(option).applicable_actions(&OOState::new());
                Ok(grounded
                    .into_iter()
                    .map(|a| ActionProb::new(a, 1.0))
                    .collect())
            }

            fn is_stochastic(&self) -> bool {
                false
            }

            fn is_defined_for(&self, _: &OOState) -> bool {
                true
            }
        }

        let grid = GridWorld::new(4, 1);
        let terminal = GridWorld::goal_at(Position::new(3, 0));
        let start = grid.state_at(Position::new(0, 0)).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let episode =
            rollout(&AlwaysRun, &grid, &step_cost, &terminal, &start, 20, &mut rng).unwrap();

        assert_eq!(episode.len(), 3);
        assert!(episode.actions.iter().all(|a| a.name() == "east"));
        assert!((episode.discounted_return(0.5) + 1.75).abs() < 1e-12);
    }
}
