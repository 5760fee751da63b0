use dotenv::dotenv;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tabplan::config::PlannerSettings;
use tabplan::domain::GroundedAction;
use tabplan::infra::Position;
use tabplan::infra::grid::{GridWorld, ManhattanHeuristic};
use tabplan::planners::deterministic::{AStar, BreadthFirst, DeterministicPlanner};
use tabplan::planners::value_function::{ValueFunctionPlanner, ValueIteration};
use tabplan::policy::{GreedyQPolicy, rollout};
use tabplan::{HashableStateFactory, OOState, Planner, ValueFunction};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tabplan=debug,info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn step_cost(_: &OOState, _: &GroundedAction, _: &OOState) -> f64 {
    -1.0
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logging();

    let settings = PlannerSettings::from_env()?;
    let goal = Position::new(6, 6);
    let grid = GridWorld::new(7, 7)
        .with_wall(Position::new(3, 1))
        .with_wall(Position::new(3, 2))
        .with_wall(Position::new(3, 3))
        .with_wall(Position::new(3, 4));
    let start = grid.state_at(Position::new(0, 0))?;
    let at_goal = GridWorld::goal_at(goal);

    tracing::info!(?settings, "Planning on a 7x7 grid towards {:?}", goal);

    let planner = ValueFunctionPlanner::new(
        grid.domain(),
        step_cost,
        at_goal.clone(),
        HashableStateFactory::identifier_independent(),
        settings.gamma,
    )?;
    let mut vi = ValueIteration::new(planner, settings.value_iteration);
    let summary = vi.plan_from_state(&start)?;
    tracing::info!(
        iterations = summary.iterations,
        converged = summary.converged,
        value = vi.value(&start)?,
        "Value iteration"
    );

    let mut rng = StdRng::seed_from_u64(settings.rtdp.seed);
    let episode = rollout(
        &GreedyQPolicy::new(&vi),
        &grid,
        &step_cost,
        &at_goal,
        &start,
        100,
        &mut rng,
    )?;
    tracing::info!(
        steps = episode.len(),
        discounted_return = episode.discounted_return(settings.gamma),
        "Greedy rollout"
    );

    let mut bfs = DeterministicPlanner::new(
        grid.domain(),
        step_cost,
        at_goal.clone(),
        HashableStateFactory::identifier_independent(),
        BreadthFirst,
    )
    .with_config(settings.search);
    let bfs_summary = bfs.plan_from_state(&start)?;
    let plan: Vec<String> = bfs
        .extract_plan(&start)?
        .iter()
        .map(|a| a.to_string())
        .collect();
    tracing::info!(length = bfs_summary.plan_length, "BFS plan: {}", plan.join(" "));

    let mut astar = DeterministicPlanner::new(
        grid.domain(),
        step_cost,
        at_goal,
        HashableStateFactory::identifier_independent(),
        AStar::new(ManhattanHeuristic { goal }),
    )
    .with_config(settings.search);
    let astar_summary = astar.plan_from_state(&start)?;
    tracing::info!(
        cost = astar_summary.cost,
        expansions = astar_summary.expansions,
        bfs_expansions = bfs_summary.expansions,
        "A* plan"
    );

    Ok(())
}
