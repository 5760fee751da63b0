use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;

use super::{NodeId, SearchCore, SearchGraph, SearchOutcome, SearchStrategy};
use crate::error::{PlanningError, Result};
use crate::hashing::HashableState;
use crate::planners::{Heuristic, ZeroHeuristic};

const COST_EPSILON: f64 = 1e-9;

#[derive(Clone, Copy)]
struct Node {
    id: NodeId,
    f_score: f64,
    g_score: f64,
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Node {}

impl Ord for Node {
    // Lowest f first; among equal f prefer the deeper node, then the older one.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| self.g_score.total_cmp(&other.g_score))
            .then_with(|| other.id.cmp(&self.id))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Best-first search on `g + h` where step cost is the negated reward.
///
/// Closed states are reopened when a cheaper path to them turns up, so an admissible but
/// inconsistent heuristic still yields an optimal plan.
#[derive(Clone)]
pub struct AStar {
    heuristic: Arc<dyn Heuristic>,
}

impl AStar {
    pub fn new(heuristic: impl Heuristic + 'static) -> Self {
        Self {
            heuristic: Arc::new(heuristic),
        }
    }

    /// Dijkstra ordering: A* with a zero heuristic.
    pub fn uniform_cost() -> Self {
        Self::new(ZeroHeuristic)
    }
}

impl SearchStrategy for AStar {
    fn name(&self) -> &'static str {
        "astar"
    }

    fn search(&mut self, core: &SearchCore, start: &HashableState) -> Result<SearchOutcome> {
        let mut graph = SearchGraph::new();
        let root = graph.add_root(start.clone());
        let mut open_set = BinaryHeap::new();
        let mut g_score: HashMap<HashableState, f64> = HashMap::new();
        let mut closed_set: HashMap<HashableState, f64> = HashMap::new();
        let mut expansions = 0;

        g_score.insert(start.clone(), 0.0);
        open_set.push(Node {
            id: root,
            f_score: self.heuristic.h(start.state()),
            g_score: 0.0,
        });

        while let Some(Node { id, g_score: g, .. }) = open_set.pop() {
            let state = graph.node(id).state.clone();
            if g > g_score.get(&state).copied().unwrap_or(f64::INFINITY) + COST_EPSILON {
                continue;
            }
            if core.is_goal_or_solved(&state) {
                return Ok(SearchOutcome {
                    graph,
                    goal: id,
                    expansions,
                });
            }
            if closed_set
                .get(&state)
                .is_some_and(|&closed_g| closed_g <= g + COST_EPSILON)
            {
                continue;
            }
            closed_set.insert(state.clone(), g);

            if core.budget_exhausted(expansions) {
                tracing::warn!(expansions, "A* expansion budget exhausted");
                break;
            }
            expansions += 1;

            for successor in core.successors(&state)? {
                let step_cost = -successor.reward;
                if step_cost < 0.0 {
                    return Err(PlanningError::InvalidParameter(format!(
                        "A* needs non-negative step costs, {} has reward {}",
                        successor.action, successor.reward
                    )));
                }
                let tentative_g = g + step_cost;
                let best = g_score
                    .get(&successor.state)
                    .copied()
                    .unwrap_or(f64::INFINITY);
                if tentative_g + COST_EPSILON < best {
                    let h = self.heuristic.h(successor.state.state());
                    g_score.insert(successor.state.clone(), tentative_g);
                    let child = graph.add_child(id, successor.action, successor.state, step_cost);
                    open_set.push(Node {
                        id: child,
                        f_score: tentative_g + h,
                        g_score: tentative_g,
                    });
                }
            }
            tracing::trace!(expansions, open = open_set.len(), "A* expansion");
        }

        Err(PlanningError::PlanningFailed {
            planner: self.name(),
            expansions,
        })
    }
}
