use std::collections::HashMap;

use super::{SearchCore, SearchGraph, SearchOutcome, SearchStrategy};
use crate::error::{PlanningError, Result};
use crate::hashing::HashableState;

/// LIFO expansion with an optional depth limit.
///
/// States already on the current path are never regenerated. With the closed set enabled a
/// state is expanded again only when it is reached at a shallower depth than before, so a
/// depth limit never hides a goal that lies within it.
#[derive(Debug, Clone, Copy)]
pub struct DepthFirst {
    pub max_depth: Option<usize>,
    pub closed_set: bool,
}

impl Default for DepthFirst {
    fn default() -> Self {
        Self::new()
    }
}

impl DepthFirst {
    pub fn new() -> Self {
        Self {
            max_depth: None,
            closed_set: true,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn without_closed_set(mut self) -> Self {
        self.closed_set = false;
        self
    }
}

impl SearchStrategy for DepthFirst {
    fn name(&self) -> &'static str {
        "dfs"
    }

    fn search(&mut self, core: &SearchCore, start: &HashableState) -> Result<SearchOutcome> {
        let mut graph = SearchGraph::new();
        let mut stack = vec![graph.add_root(start.clone())];
        let mut closed: HashMap<HashableState, usize> = HashMap::new();
        let mut expansions = 0;

        while let Some(id) = stack.pop() {
            let node = graph.node(id);
            if core.is_goal_or_solved(&node.state) {
                return Ok(SearchOutcome {
                    graph,
                    goal: id,
                    expansions,
                });
            }
            if self.max_depth.is_some_and(|limit| node.depth >= limit) {
                continue;
            }
            if self.closed_set {
                if closed.get(&node.state).is_some_and(|&d| d <= node.depth) {
                    continue;
                }
                closed.insert(node.state.clone(), node.depth);
            }
            if core.budget_exhausted(expansions) {
                tracing::warn!(expansions, "DFS expansion budget exhausted");
                break;
            }
            expansions += 1;

            let state = node.state.clone();
            let depth = node.depth;
            let successors = core.successors(&state)?;
            // Reversed so the first applicable action is explored first.
            for successor in successors.into_iter().rev() {
                if graph.on_path(id, &successor.state) {
                    continue;
                }
                let expanded_shallower = closed
                    .get(&successor.state)
                    .is_some_and(|&d| d <= depth + 1);
                if self.closed_set && expanded_shallower {
                    continue;
                }
                let child =
                    graph.add_child(id, successor.action, successor.state, -successor.reward);
                stack.push(child);
            }
        }

        Err(PlanningError::PlanningFailed {
            planner: self.name(),
            expansions,
        })
    }
}
