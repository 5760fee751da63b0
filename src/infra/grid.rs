//! Small grid-world fixture used by the demo binary and the planner tests.

use std::collections::HashSet;
use std::sync::Arc;

use super::types::{Bounds, Direction, Position};
use crate::domain::{
    Action, Domain, GroundedAction, SimpleAction, TransitionModel, TransitionProbability,
};
use crate::error::{PlanningError, Result};
use crate::planners::Heuristic;
use crate::state::{AttributeType, OOState, ObjectClass, ObjectInstance};

pub const AGENT_CLASS: &str = "agent";
const AGENT_NAME: &str = "agent0";

/// Four-connected grid with optional walls and a chance of the move failing.
#[derive(Debug, Clone)]
pub struct GridWorld {
    bounds: Bounds,
    walls: HashSet<Position>,
    slip: f64,
    agent_class: Arc<ObjectClass>,
}

impl GridWorld {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            bounds: Bounds::new(0, width - 1, 0, height - 1),
            walls: HashSet::new(),
            slip: 0.0,
            agent_class: ObjectClass::new(AGENT_CLASS)
                .with_attribute("x", AttributeType::Discrete)
                .with_attribute("y", AttributeType::Discrete)
                .build(),
        }
    }

    pub fn with_wall(mut self, pos: Position) -> Self {
        self.walls.insert(pos);
        self
    }

    /// Probability that a move leaves the agent where it is.
    pub fn with_slip(mut self, slip: f64) -> Self {
        self.slip = slip.clamp(0.0, 1.0);
        self
    }

    pub fn is_walkable(&self, pos: &Position) -> bool {
        self.bounds.contains(pos) && !self.walls.contains(pos)
    }

    pub fn state_at(&self, pos: Position) -> Result<OOState> {
        let agent = ObjectInstance::new(AGENT_NAME, self.agent_class.clone())
            .with_value("x", pos.x as i64)?
            .with_value("y", pos.y as i64)?;
        OOState::from_objects([agent])
    }

    pub fn agent_position(state: &OOState) -> Result<Position> {
        let agent = state.first_of_class(AGENT_CLASS)?;
        Ok(Position::new(
            agent.discrete("x")? as i32,
            agent.discrete("y")? as i32,
        ))
    }

    /// Domain with the four compass moves over this grid.
    pub fn domain(&self) -> Domain {
        Direction::ALL.iter().fold(Domain::new(self.clone()), |domain, d| {
            domain.with_action(Action::primitive(SimpleAction::new(d.action_name())))
        })
    }

    pub fn goal_at(target: Position) -> impl Fn(&OOState) -> bool + Send + Sync + Clone {
        move |state: &OOState| {
            GridWorld::agent_position(state)
                .map(|p| p == target)
                .unwrap_or(false)
        }
    }
}

impl TransitionModel for GridWorld {
    fn transitions(
        &self,
        state: &OOState,
        action: &GroundedAction,
    ) -> Result<Vec<TransitionProbability>> {
        let direction = Direction::from_action_name(action.name()).ok_or_else(|| {
            PlanningError::InvalidParameter(format!("grid has no action {}", action))
        })?;
        let current = GridWorld::agent_position(state)?;
        let target = current.step(direction);

        if !self.is_walkable(&target) || self.slip >= 1.0 {
            return Ok(vec![TransitionProbability::certain(state.clone())]);
        }
        let moved = self.state_at(target)?;
        if self.slip <= 0.0 {
            return Ok(vec![TransitionProbability::certain(moved)]);
        }
        Ok(vec![
            TransitionProbability::new(1.0 - self.slip, moved),
            TransitionProbability::new(self.slip, state.clone()),
        ])
    }
}

/// Manhattan distance to a fixed cell; admissible for unit step costs.
#[derive(Debug, Clone, Copy)]
pub struct ManhattanHeuristic {
    pub goal: Position,
}

impl Heuristic for ManhattanHeuristic {
    fn h(&self, state: &OOState) -> f64 {
        GridWorld::agent_position(state)
            .map(|p| p.distance(&self.goal) as f64)
            .unwrap_or(0.0)
    }
}
