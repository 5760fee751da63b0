use crate::domain::GroundedAction;
use crate::hashing::HashableState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct SearchNode {
    pub state: HashableState,
    /// Action that produced this node from its parent; `None` at the root
    pub generating_action: Option<GroundedAction>,
    pub back_pointer: Option<NodeId>,
    pub depth: usize,
    /// Accumulated cost (negated reward) from the root
    pub cost: f64,
}

/// Arena of search nodes linked by back pointers.
#[derive(Debug, Default)]
pub struct SearchGraph {
    nodes: Vec<SearchNode>,
}

impl SearchGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&mut self, state: HashableState) -> NodeId {
        self.push(SearchNode {
            state,
            generating_action: None,
            back_pointer: None,
            depth: 0,
            cost: 0.0,
        })
    }

    pub fn add_child(
        &mut self,
        parent: NodeId,
        action: GroundedAction,
        state: HashableState,
        step_cost: f64,
    ) -> NodeId {
        let (depth, cost) = {
            let p = self.node(parent);
            (p.depth + 1, p.cost + step_cost)
        };
        self.push(SearchNode {
            state,
            generating_action: Some(action),
            back_pointer: Some(parent),
            depth,
            cost,
        })
    }

    pub fn node(&self, id: NodeId) -> &SearchNode {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SearchNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True when `state` appears on the back-pointer chain ending at `id`.
    pub fn on_path(&self, id: NodeId, state: &HashableState) -> bool {
        let mut current = Some(id);
        while let Some(n) = current {
            let node = self.node(n);
            if &node.state == state {
                return true;
            }
            current = node.back_pointer;
        }
        false
    }

    fn push(&mut self, node: SearchNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }
}
