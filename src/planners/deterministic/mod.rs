//! Deterministic forward search with back-pointer policy extraction.

mod astar;
mod bfs;
mod dfs;
mod search_graph;

pub use astar::AStar;
pub use bfs::BreadthFirst;
pub use dfs::DepthFirst;
pub use search_graph::{NodeId, SearchGraph, SearchNode};

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::Planner;
use crate::domain::{
    ActionKind, Domain, GroundedAction, OptionPolicy, RewardFunction, StateConditionTest,
};
use crate::error::{PlanningError, Result};
use crate::hashing::{HashableState, StateHashFactory};
use crate::planners::value_function::MassAccumulator;
use crate::state::OOState;

const OPTION_STEP_LIMIT: usize = 1000;

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchConfig {
    /// Give up after this many node expansions
    pub max_expansions: Option<usize>,
}

/// One deterministic successor of an expanded state.
#[derive(Debug, Clone)]
pub struct Successor {
    pub action: GroundedAction,
    pub state: HashableState,
    /// Undiscounted reward collected; summed over every step for options
    pub reward: f64,
}

/// Result of a strategy run: the explored graph and the node that ended the search.
pub struct SearchOutcome {
    pub graph: SearchGraph,
    pub goal: NodeId,
    pub expansions: usize,
}

/// A search order over the shared machinery in [`SearchCore`].
pub trait SearchStrategy {
    fn name(&self) -> &'static str;

    /// Searches from `start` until a state passes [`SearchCore::is_goal_or_solved`].
    fn search(&mut self, core: &SearchCore, start: &HashableState) -> Result<SearchOutcome>;
}

/// Successor generation, goal testing and the recorded policy.
pub struct SearchCore {
    domain: Domain,
    reward: Arc<dyn RewardFunction>,
    goal: Arc<dyn StateConditionTest>,
    factory: Arc<dyn StateHashFactory>,
    config: SearchConfig,
    policy: HashMap<HashableState, GroundedAction>,
    indexed: HashSet<HashableState>,
    match_names: bool,
}

impl SearchCore {
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn budget_exhausted(&self, expansions: usize) -> bool {
        self.config
            .max_expansions
            .is_some_and(|limit| expansions >= limit)
    }

    /// A goal state, or one a previous call already recorded an action for.
    pub fn is_goal_or_solved(&self, state: &HashableState) -> bool {
        self.goal.satisfies(state.state()) || self.policy.contains_key(state)
    }

    /// Every applicable action and the single state it leads to.
    pub fn successors(&self, state: &HashableState) -> Result<Vec<Successor>> {
        self.domain
            .applicable_actions(state.state())
            .into_iter()
            .map(|action| -> Result<Successor> {
                let (next, reward) = self.apply(state, &action)?;
                Ok(Successor {
                    action,
                    state: next,
                    reward,
                })
            })
            .collect()
    }

    fn apply(
        &self,
        state: &HashableState,
        action: &GroundedAction,
    ) -> Result<(HashableState, f64)> {
        match action.kind() {
            ActionKind::Primitive => self.step(state.state(), action),
            ActionKind::Option(option) => self.run_option(option.as_ref(), state),
        }
    }

    /// The single successor of a primitive action. Outcomes that hash to the same state are
    /// merged first; the merged distribution must put all its mass on one state.
    fn step(&self, state: &OOState, action: &GroundedAction) -> Result<(HashableState, f64)> {
        let mut merged = MassAccumulator::default();
        for outcome in self.domain.model().transitions(state, action)? {
            merged.add(self.factory.hash_state(outcome.state)?, outcome.probability);
        }
        let records = merged.into_records();
        let count = records.len();
        match records.into_iter().next() {
            Some(only) if count == 1 && (only.probability - 1.0).abs() <= 1e-6 => {
                let reward = self.reward.reward(state, action, only.state.state());
                Ok((only.state, reward))
            }
            _ => Err(PlanningError::NonDeterministicTransition {
                action: action.to_string(),
                outcomes: count,
            }),
        }
    }

    /// Runs an option to termination. Termination must be certain or impossible.
    fn run_option(
        &self,
        option: &dyn OptionPolicy,
        start: &HashableState,
    ) -> Result<(HashableState, f64)> {
        let mut current = start.clone();
        let mut total = 0.0;
        for _ in 0..OPTION_STEP_LIMIT {
            let action = option.select_action(current.state())?;
            if action.is_option() {
                return Err(PlanningError::NestedOption {
                    option: option.name().to_string(),
                });
            }
            let (next, reward) = self.step(current.state(), &action)?;
            total += reward;
            current = next;

            let beta = option.termination_probability(current.state());
            if beta >= 1.0 || self.goal.satisfies(current.state()) {
                return Ok((current, total));
            }
            if beta > 0.0 {
                return Err(PlanningError::NonDeterministicTransition {
                    action: option.name().to_string(),
                    outcomes: 2,
                });
            }
        }
        Err(PlanningError::InvalidParameter(format!(
            "option {} did not terminate within {} steps",
            option.name(),
            OPTION_STEP_LIMIT
        )))
    }

    /// Walks back pointers from `goal`, recording `parent -> generating action`.
    ///
    /// A parent that already has an action keeps it. Returns the number of new entries.
    pub fn encode_plan_into_policy(&mut self, graph: &SearchGraph, goal: NodeId) -> usize {
        let mut recorded = 0;
        let mut current = graph.node(goal);
        while let (Some(parent_id), Some(action)) =
            (current.back_pointer, current.generating_action.as_ref())
        {
            let parent = graph.node(parent_id);
            if self.policy.contains_key(&parent.state) {
                tracing::trace!(action = %action, "Keeping previously recorded action");
            } else {
                self.policy.insert(parent.state.clone(), action.clone());
                recorded += 1;
            }
            current = parent;
        }
        recorded
    }

    /// Recorded action for `state`, in the caller's object names.
    fn recorded_action(&self, state: &HashableState) -> Option<GroundedAction> {
        let (representative, action) = self.policy.get_key_value(state)?;
        if !self.match_names || representative.same_bindings(state) {
            return Some(action.clone());
        }
        match representative.object_matching(state) {
            Some(mapping) => Some(action.translate(&mapping)),
            None => Some(action.clone()),
        }
    }
}

/// Statistics of one search call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchSummary {
    pub expansions: usize,
    pub nodes: usize,
    /// Actions between the start state and the node that ended the search
    pub plan_length: usize,
    pub cost: f64,
    /// Policy entries added by this call
    pub recorded: usize,
}

/// Forward-search planner over a deterministic domain.
///
/// The recorded policy and indexed set persist across calls, so later searches stop as
/// soon as they reach a state an earlier plan already covers.
pub struct DeterministicPlanner<S: SearchStrategy> {
    core: SearchCore,
    strategy: S,
}

impl<S: SearchStrategy> DeterministicPlanner<S> {
    pub fn new(
        domain: Domain,
        reward: impl RewardFunction + 'static,
        goal: impl StateConditionTest + 'static,
        factory: impl StateHashFactory + 'static,
        strategy: S,
    ) -> Self {
        let match_names =
            factory.object_identifier_independent() && domain.has_parameterized_actions();
        Self {
            core: SearchCore {
                domain,
                reward: Arc::new(reward),
                goal: Arc::new(goal),
                factory: Arc::new(factory),
                config: SearchConfig::default(),
                policy: HashMap::new(),
                indexed: HashSet::new(),
                match_names,
            },
            strategy,
        }
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.core.config = config;
        self
    }

    pub fn core(&self) -> &SearchCore {
        &self.core
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn hash_state(&self, state: &OOState) -> Result<HashableState> {
        self.core.factory.hash_state(state.clone())
    }

    pub fn query_selected_action(&self, state: &OOState) -> Result<GroundedAction> {
        let hashed = self.hash_state(state)?;
        self.core
            .recorded_action(&hashed)
            .ok_or(PlanningError::NoCachedPlan)
    }

    pub fn has_cached_plan(&self, state: &OOState) -> Result<bool> {
        Ok(self.core.policy.contains_key(&self.hash_state(state)?))
    }

    pub fn all_known_states(&self) -> Vec<OOState> {
        self.core.indexed.iter().map(|s| s.state().clone()).collect()
    }

    /// Follows the recorded policy from `start` through the model until the goal.
    pub fn extract_plan(&self, start: &OOState) -> Result<Vec<GroundedAction>> {
        let mut current = self.hash_state(start)?;
        let mut seen = HashSet::new();
        let mut plan = Vec::new();

        while !self.core.goal.satisfies(current.state()) {
            if !seen.insert(current.clone()) {
                return Err(PlanningError::PlanningFailed {
                    planner: "extract_plan",
                    expansions: plan.len(),
                });
            }
            let action = self
                .core
                .recorded_action(&current)
                .ok_or(PlanningError::NoCachedPlan)?;
            let (next, _) = self.core.apply(&current, &action)?;
            plan.push(action);
            current = next;
        }
        Ok(plan)
    }
}

impl<S: SearchStrategy> Planner for DeterministicPlanner<S> {
    type Summary = SearchSummary;

    fn plan_from_state(&mut self, state: &OOState) -> Result<SearchSummary> {
        let start = self.hash_state(state)?;
        tracing::debug!(strategy = self.strategy.name(), "Starting forward search");

        let outcome = match self.strategy.search(&self.core, &start) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(strategy = self.strategy.name(), error = %e, "Search failed");
                return Err(e);
            }
        };

        for node in outcome.graph.nodes() {
            self.core.indexed.insert(node.state.clone());
        }
        let recorded = self
            .core
            .encode_plan_into_policy(&outcome.graph, outcome.goal);
        let goal = outcome.graph.node(outcome.goal);

        let summary = SearchSummary {
            expansions: outcome.expansions,
            nodes: outcome.graph.len(),
            plan_length: goal.depth,
            cost: goal.cost,
            recorded,
        };
        tracing::info!(
            strategy = self.strategy.name(),
            expansions = summary.expansions,
            plan_length = summary.plan_length,
            cost = summary.cost,
            recorded = summary.recorded,
            "Plan found"
        );
        Ok(summary)
    }

    fn reset_solver(&mut self) {
        self.core.policy.clear();
        self.core.indexed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Action, ClosureOption, ObjectParameterizedAction, SimpleAction, TransitionModel,
        TransitionProbability,
    };
    use crate::hashing::HashableStateFactory;
    use crate::infra::grid::{GridWorld, ManhattanHeuristic};
    use crate::infra::{Direction, Position};
    use crate::state::{AttributeType, ObjectClass, ObjectInstance};

    fn unit_cost(_: &OOState, _: &GroundedAction, _: &OOState) -> f64 {
        -1.0
    }

    fn planner<S: SearchStrategy>(
        grid: &GridWorld,
        goal: Position,
        strategy: S,
    ) -> DeterministicPlanner<S> {
        DeterministicPlanner::new(
            grid.domain(),
            unit_cost,
            GridWorld::goal_at(goal),
            HashableStateFactory::identifier_independent(),
            strategy,
        )
    }

    fn walk(grid: &GridWorld, from: Position, plan: &[GroundedAction]) -> Position {
        plan.iter().fold(from, |pos, action| {
            let next = Direction::from_action_name(action.name())
                .map(|d| pos.step(d))
                .unwrap();
            if grid.is_walkable(&next) { next } else { pos }
        })
    }

    #[test]
    fn test_bfs_finds_shortest_plan() {
        let grid = GridWorld::new(5, 5);
        let mut bfs = planner(&grid, Position::new(4, 4), BreadthFirst);
        let start = grid.state_at(Position::new(0, 0)).unwrap();

        let summary = bfs.plan_from_state(&start).unwrap();
        assert_eq!(summary.plan_length, 8);
        assert_eq!(summary.recorded, 8);

        let plan = bfs.extract_plan(&start).unwrap();
        assert_eq!(plan.len(), 8);
        assert_eq!(walk(&grid, Position::new(0, 0), &plan), Position::new(4, 4));
    }

    #[test]
    fn test_astar_plan_cost() {
        let grid = GridWorld::new(5, 5).with_wall(Position::new(2, 2));
        let goal = Position::new(4, 4);
        let mut astar = planner(&grid, goal, AStar::new(ManhattanHeuristic { goal }));
        let start = grid.state_at(Position::new(0, 0)).unwrap();

        let summary = astar.plan_from_state(&start).unwrap();
        assert!((summary.cost - 8.0).abs() < 1e-9);
        assert_eq!(summary.plan_length, 8);

        let mut ucs = planner(&grid, goal, AStar::uniform_cost());
        let uniform = ucs.plan_from_state(&start).unwrap();
        assert!((uniform.cost - 8.0).abs() < 1e-9);
        assert!(summary.expansions <= uniform.expansions);
    }

    #[test]
    fn test_dfs_reaches_goal() {
        let grid = GridWorld::new(4, 4);
        let mut dfs = planner(&grid, Position::new(3, 3), DepthFirst::new());
        let start = grid.state_at(Position::new(0, 0)).unwrap();

        dfs.plan_from_state(&start).unwrap();
        let plan = dfs.extract_plan(&start).unwrap();
        assert_eq!(walk(&grid, Position::new(0, 0), &plan), Position::new(3, 3));
    }

    #[test]
    fn test_dfs_depth_limit() {
        let grid = GridWorld::new(4, 4);
        let start = grid.state_at(Position::new(0, 0)).unwrap();

        let err = planner(&grid, Position::new(3, 3), DepthFirst::new().with_max_depth(5))
            .plan_from_state(&start)
            .unwrap_err();
        assert!(err.is_planning_failure());

        let mut exact = planner(
            &grid,
            Position::new(3, 3),
            DepthFirst::new().with_max_depth(6).without_closed_set(),
        );
        assert_eq!(exact.plan_from_state(&start).unwrap().plan_length, 6);
    }

    #[test]
    fn test_unreachable_goal_is_planning_failure() {
        // Column x == 2 is walled off entirely.
        let grid = (0..5).fold(GridWorld::new(5, 5), |g, y| g.with_wall(Position::new(2, y)));
        let start = grid.state_at(Position::new(0, 0)).unwrap();

        for err in [
            planner(&grid, Position::new(4, 4), BreadthFirst)
                .plan_from_state(&start)
                .unwrap_err(),
            planner(&grid, Position::new(4, 4), AStar::uniform_cost())
                .plan_from_state(&start)
                .unwrap_err(),
            planner(&grid, Position::new(4, 4), DepthFirst::new())
                .plan_from_state(&start)
                .unwrap_err(),
        ] {
            assert!(err.is_planning_failure(), "unexpected error {}", err);
        }
    }

    #[test]
    fn test_expansion_budget_fails_search() {
        let grid = GridWorld::new(10, 10);
        let mut bfs = planner(&grid, Position::new(9, 9), BreadthFirst).with_config(SearchConfig {
            max_expansions: Some(3),
        });
        let err = bfs
            .plan_from_state(&grid.state_at(Position::new(0, 0)).unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            PlanningError::PlanningFailed { expansions: 3, .. }
        ));
    }

    #[test]
    fn test_slippery_grid_is_rejected() {
        let grid = GridWorld::new(3, 3).with_slip(0.1);
        let mut bfs = planner(&grid, Position::new(2, 2), BreadthFirst);
        let err = bfs
            .plan_from_state(&grid.state_at(Position::new(0, 0)).unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            PlanningError::NonDeterministicTransition { outcomes: 2, .. }
        ));
    }

    #[test]
    fn test_replanning_never_overwrites_recorded_actions() {
        let grid = GridWorld::new(5, 5);
        let mut bfs = planner(&grid, Position::new(4, 4), BreadthFirst);
        let start = grid.state_at(Position::new(0, 0)).unwrap();
        bfs.plan_from_state(&start).unwrap();

        let before: Vec<(OOState, GroundedAction)> = bfs
            .all_known_states()
            .into_iter()
            .filter_map(|s| bfs.query_selected_action(&s).ok().map(|a| (s, a)))
            .collect();
        assert_eq!(before.len(), 8);

        let again = bfs.plan_from_state(&start).unwrap();
        assert_eq!(again.recorded, 0);
        assert_eq!(again.plan_length, 0);

        bfs.plan_from_state(&grid.state_at(Position::new(4, 0)).unwrap())
            .unwrap();
        for (state, action) in &before {
            assert_eq!(&bfs.query_selected_action(state).unwrap(), action);
        }
    }

    #[test]
    fn test_first_writer_wins_on_shared_parent() {
        let grid = GridWorld::new(3, 1);
        let factory = HashableStateFactory::identifier_independent();
        let hash = |x| factory.hash_state(grid.state_at(Position::new(x, 0)).unwrap()).unwrap();
        let mut core = planner(&grid, Position::new(2, 0), BreadthFirst).core;

        // Two graphs leave the same parent through different actions.
        let mut first = SearchGraph::new();
        let root = first.add_root(hash(1));
        let east = first.add_child(root, GroundedAction::new("east"), hash(2), 1.0);
        let mut second = SearchGraph::new();
        let root2 = second.add_root(hash(1));
        let west = second.add_child(root2, GroundedAction::new("west"), hash(0), 1.0);

        assert_eq!(core.encode_plan_into_policy(&first, east), 1);
        assert_eq!(core.encode_plan_into_policy(&second, west), 0);
        assert_eq!(
            core.recorded_action(&hash(1)).unwrap(),
            GroundedAction::new("east")
        );
    }

    #[test]
    fn test_query_without_plan() {
        let grid = GridWorld::new(3, 3);
        let bfs = planner(&grid, Position::new(2, 2), BreadthFirst);
        let start = grid.state_at(Position::new(0, 0)).unwrap();
        assert!(!bfs.has_cached_plan(&start).unwrap());
        assert!(matches!(
            bfs.query_selected_action(&start),
            Err(PlanningError::NoCachedPlan)
        ));
    }

    #[test]
    fn test_start_at_goal_records_nothing() {
        let grid = GridWorld::new(3, 3);
        let mut bfs = planner(&grid, Position::new(1, 1), BreadthFirst);
        let start = grid.state_at(Position::new(1, 1)).unwrap();
        let summary = bfs.plan_from_state(&start).unwrap();
        assert_eq!(summary.plan_length, 0);
        assert!(bfs.extract_plan(&start).unwrap().is_empty());
    }

    #[test]
    fn test_dfs_depth_limit_reopens_shallower_states() {
        // The first branch explored reaches (0, 1) through a detour, three moves deep.
        //   S . # #
        //   . . # #
        //   . # # #
        //   . . . G
        let grid = [(1, 2), (2, 0), (2, 1), (2, 2), (3, 0), (3, 1), (3, 2)]
            .into_iter()
            .fold(GridWorld::new(4, 4), |g, (x, y)| g.with_wall(Position::new(x, y)));
        let goal = Position::new(3, 3);
        let start = grid.state_at(Position::new(0, 0)).unwrap();

        let mut dfs = planner(&grid, goal, DepthFirst::new().with_max_depth(6));
        assert_eq!(dfs.plan_from_state(&start).unwrap().plan_length, 6);
        let plan = dfs.extract_plan(&start).unwrap();
        assert_eq!(walk(&grid, Position::new(0, 0), &plan), goal);

        let err = planner(&grid, goal, DepthFirst::new().with_max_depth(5))
            .plan_from_state(&start)
            .unwrap_err();
        assert!(err.is_planning_failure());
    }

    fn run_east(termination: f64) -> ClosureOption {
        ClosureOption::new(
            "run_east",
            |s: &OOState| GridWorld::agent_position(s).map(|p| p.x < 3).unwrap_or(false),
            |_: &OOState| Ok(GroundedAction::new("east")),
            move |s: &OOState| {
                let at_end = GridWorld::agent_position(s).map(|p| p.x == 3).unwrap_or(true);
                if at_end { 1.0 } else { termination }
            },
        )
    }

    #[test]
    fn test_option_is_a_single_search_step() {
        let grid = GridWorld::new(4, 1);
        let goal = Position::new(3, 0);
        let mut ucs = DeterministicPlanner::new(
            grid.domain().with_action(Action::option(run_east(0.0))),
            unit_cost,
            GridWorld::goal_at(goal),
            HashableStateFactory::identifier_independent(),
            AStar::uniform_cost(),
        );
        let start = grid.state_at(Position::new(0, 0)).unwrap();

        let summary = ucs.plan_from_state(&start).unwrap();
        assert_eq!(summary.plan_length, 1);
        assert!((summary.cost - 3.0).abs() < 1e-9);

        let plan = ucs.extract_plan(&start).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].name(), "run_east");
        assert!(plan[0].is_option());
    }

    #[test]
    fn test_option_with_uncertain_termination_is_rejected() {
        let grid = GridWorld::new(4, 1);
        let mut bfs = DeterministicPlanner::new(
            grid.domain().with_action(Action::option(run_east(0.5))),
            unit_cost,
            GridWorld::goal_at(Position::new(3, 0)),
            HashableStateFactory::identifier_independent(),
            BreadthFirst,
        );
        let err = bfs
            .plan_from_state(&grid.state_at(Position::new(0, 0)).unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            PlanningError::NonDeterministicTransition { ref action, .. } if action == "run_east"
        ));
    }

    #[test]
    fn test_split_outcomes_of_one_state_are_merged() {
        let grid = GridWorld::new(3, 1);
        let model = grid.clone();
        let halves = move |s: &OOState, a: &GroundedAction| -> Result<Vec<TransitionProbability>> {
            Ok(model
                .transitions(s, a)?
                .into_iter()
                .flat_map(|t| {
                    let half = t.probability / 2.0;
                    [
                        TransitionProbability::new(half, t.state.clone()),
                        TransitionProbability::new(half, t.state),
                    ]
                })
                .collect())
        };
        let domain = Domain::new(halves)
            .with_action(Action::primitive(SimpleAction::new("east")))
            .with_action(Action::primitive(SimpleAction::new("west")));
        let mut bfs = DeterministicPlanner::new(
            domain,
            unit_cost,
            GridWorld::goal_at(Position::new(2, 0)),
            HashableStateFactory::identifier_independent(),
            BreadthFirst,
        );

        let summary = bfs
            .plan_from_state(&grid.state_at(Position::new(0, 0)).unwrap())
            .unwrap();
        assert_eq!(summary.plan_length, 2);
    }

    fn garden(plants: [(&str, i64); 2]) -> OOState {
        let plant = ObjectClass::new("plant")
            .with_attribute("height", AttributeType::Discrete)
            .build();
        OOState::from_objects(plants.map(|(name, height)| {
            ObjectInstance::new(name, plant.clone())
                .with_value("height", height)
                .unwrap()
        }))
        .unwrap()
    }

    fn grow(state: &OOState, action: &GroundedAction) -> Result<Vec<TransitionProbability>> {
        let mut next = state.clone();
        let plant = next.object_mut(&action.params()[0])?;
        let height = plant.discrete("height")?;
        plant.set_value("height", height + 1)?;
        Ok(vec![TransitionProbability::certain(next)])
    }

    fn grow_one(name: &str) -> GroundedAction {
        GroundedAction::with_params("grow", vec![name.to_string()])
    }

    #[test]
    fn test_recorded_action_follows_renamed_objects() {
        let domain = Domain::new(grow).with_action(Action::primitive(
            ObjectParameterizedAction::new("grow", &["plant"]),
        ));
        let all_grown = |s: &OOState| {
            s.objects()
                .all(|o| o.discrete("height").is_ok_and(|h| h >= 2))
        };
        let mut bfs = DeterministicPlanner::new(
            domain,
            unit_cost,
            all_grown,
            HashableStateFactory::identifier_independent(),
            BreadthFirst,
        );

        let start = garden([("a", 2), ("b", 1)]);
        bfs.plan_from_state(&start).unwrap();
        assert_eq!(bfs.query_selected_action(&start).unwrap(), grow_one("b"));

        let aliased = garden([("x", 1), ("y", 2)]);
        assert_eq!(bfs.query_selected_action(&aliased).unwrap(), grow_one("x"));
        assert_eq!(bfs.extract_plan(&aliased).unwrap(), vec![grow_one("x")]);

        // Same names, values swapped between the two objects.
        let swapped = garden([("a", 1), ("b", 2)]);
        assert_eq!(bfs.query_selected_action(&swapped).unwrap(), grow_one("a"));
    }
}
