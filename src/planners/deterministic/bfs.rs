use std::collections::{HashSet, VecDeque};

use super::{SearchCore, SearchGraph, SearchOutcome, SearchStrategy};
use crate::error::{PlanningError, Result};
use crate::hashing::HashableState;

/// FIFO expansion; the first plan found has the fewest actions.
#[derive(Debug, Clone, Copy, Default)]
pub struct BreadthFirst;

impl SearchStrategy for BreadthFirst {
    fn name(&self) -> &'static str {
        "bfs"
    }

    fn search(&mut self, core: &SearchCore, start: &HashableState) -> Result<SearchOutcome> {
        let mut graph = SearchGraph::new();
        let root = graph.add_root(start.clone());
        if core.is_goal_or_solved(start) {
            return Ok(SearchOutcome {
                graph,
                goal: root,
                expansions: 0,
            });
        }

        let mut seen: HashSet<HashableState> = HashSet::from([start.clone()]);
        let mut open = VecDeque::from([root]);
        let mut expansions = 0;

        while let Some(id) = open.pop_front() {
            if core.budget_exhausted(expansions) {
                tracing::warn!(expansions, "BFS expansion budget exhausted");
                break;
            }
            expansions += 1;

            let state = graph.node(id).state.clone();
            for successor in core.successors(&state)? {
                // Duplicates are dropped when generated, not when expanded.
                if !seen.insert(successor.state.clone()) {
                    continue;
                }
                let reached = core.is_goal_or_solved(&successor.state);
                let child = graph.add_child(id, successor.action, successor.state, -successor.reward);
                if reached {
                    return Ok(SearchOutcome {
                        graph,
                        goal: child,
                        expansions,
                    });
                }
                open.push_back(child);
            }
        }

        Err(PlanningError::PlanningFailed {
            planner: self.name(),
            expansions,
        })
    }
}
