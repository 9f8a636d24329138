use crate::tree::{
    edges::ActionEdge,
    ids::{ActionId, NodeId, StateKey},
    stats::SelectionType,
};

/// A decision point of the search tree.
#[derive(Debug, Clone)]
pub struct Node {
    state_key: StateKey,
    depth: u64,
    parent: Option<(NodeId, ActionId)>,
    edges: Vec<ActionEdge>,
    is_terminal: bool,
    expanded: bool,
}

impl Node {
    pub fn new(
        state_key: StateKey,
        depth: u64,
        parent: Option<(NodeId, ActionId)>,
        is_terminal: bool,
    ) -> Self {
        Node {
            state_key,
            depth,
            parent,
            edges: Vec::new(),
            is_terminal,
            expanded: false,
        }
    }

    /// Create one edge per action the environment offers. Idempotent.
    pub fn expand(&mut self, num_actions: usize) {
        if self.expanded {
            return;
        }
        self.edges = (0..num_actions)
            .map(|i| ActionEdge::new(ActionId::from(i)))
            .collect();
        self.expanded = true;
    }

    /// Pick the edge with the highest UCB score, ties to the lowest index.
    pub fn select_edge(&self, c: f64, selection: SelectionType) -> Option<ActionId> {
        if self.edges.is_empty() {
            return None;
        }

        let n_parent: u64 = self.edges.iter().map(|e| e.visits()).sum::<u64>().max(1);

        let mut best_idx = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (i, edge) in self.edges.iter().enumerate() {
            let score = edge.ucb_score(n_parent, c, selection);
            if score > best_score {
                best_score = score;
                best_idx = i;
            }
        }

        Some(ActionId::from(best_idx))
    }

    pub fn edge(&self, action_id: ActionId) -> Option<&ActionEdge> {
        self.edges.get(action_id.index())
    }

    pub fn edge_mut(&mut self, action_id: ActionId) -> Option<&mut ActionEdge> {
        self.edges.get_mut(action_id.index())
    }

    pub fn edges(&self) -> impl Iterator<Item = &ActionEdge> {
        self.edges.iter()
    }

    pub fn depth(&self) -> u64 {
        self.depth
    }

    pub fn state_key(&self) -> StateKey {
        self.state_key
    }

    pub fn is_terminal(&self) -> bool {
        self.is_terminal
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn parent(&self) -> Option<(NodeId, ActionId)> {
        self.parent
    }
}
