use crate::tree::{
    ids::{ActionId, NodeId, StateKey},
    outcomes::OutcomeSet,
    stats::{EdgeStats, SelectionType},
};

/// Taking one action from a node: its statistics and every successor seen so far.
#[derive(Debug, Clone)]
pub struct ActionEdge {
    action: ActionId,
    stats: EdgeStats,
    outcomes: OutcomeSet,
}

impl ActionEdge {
    pub fn new(action: ActionId) -> Self {
        ActionEdge {
            action,
            stats: EdgeStats::new(),
            outcomes: OutcomeSet::new(),
        }
    }

    pub fn action(&self) -> ActionId {
        self.action
    }

    /// Backpropagation hook.
    pub fn record(&mut self, total_return: f64) {
        self.stats.record(total_return);
    }

    /// UCB1 score; unvisited edges always win so every action is tried once.
    pub fn ucb_score(&self, n_parent: u64, c: f64, selection: SelectionType) -> f64 {
        if self.stats.is_unvisited() {
            return f64::INFINITY;
        }
        let exploration = (f64::ln(n_parent as f64) / self.stats.visits() as f64).sqrt();
        self.stats.value(selection) + c * exploration
    }

    pub fn get_child_for(&self, next_state_key: StateKey) -> Option<NodeId> {
        self.outcomes.get_child_for(next_state_key)
    }

    /// Register a successor observed for the first time.
    /// Returns `None` if the state key was already known.
    pub fn insert_outcome(&mut self, next_state_key: StateKey, child_id: NodeId) -> Option<NodeId> {
        self.outcomes.insert_outcome(next_state_key, child_id)
    }

    /// Count another observation of a known successor.
    pub fn increment_outcome(&mut self, next_state_key: StateKey) -> Option<NodeId> {
        self.outcomes.increment_outcome(next_state_key)
    }

    pub fn visits(&self) -> u64 {
        self.stats.visits()
    }

    pub fn q(&self) -> f64 {
        self.stats.q()
    }

    pub fn best(&self) -> f64 {
        self.stats.best()
    }

    pub fn outcomes_len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn outcome_count_for(&self, next_state_key: StateKey) -> Option<u64> {
        self.outcomes.count_for(next_state_key)
    }
}
