use crate::tree::ids::{NodeId, StateKey};

/// One successor observed under an `(s, a)` edge and how often it was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Outcome {
    next_state_key: StateKey,
    child: NodeId,
    count: u64,
}

/// Successors observed for a single edge, in discovery order.
/// Stochastic actions grow one entry per distinct sampled state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeSet {
    outcomes: Vec<Outcome>,
}

impl OutcomeSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn find(&self, next_state_key: StateKey) -> Option<&Outcome> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.next_state_key == next_state_key)
    }

    pub fn get_child_for(&self, next_state_key: StateKey) -> Option<NodeId> {
        self.find(next_state_key).map(|outcome| outcome.child)
    }

    /// Insert a new successor with a count of 1.
    /// Returns `None` when the key is already present.
    pub fn insert_outcome(&mut self, next_state_key: StateKey, child_id: NodeId) -> Option<NodeId> {
        if self.find(next_state_key).is_some() {
            return None;
        }
        self.outcomes.push(Outcome {
            next_state_key,
            child: child_id,
            count: 1,
        });
        Some(child_id)
    }

    pub fn increment_outcome(&mut self, next_state_key: StateKey) -> Option<NodeId> {
        let outcome = self
            .outcomes
            .iter_mut()
            .find(|outcome| outcome.next_state_key == next_state_key)?;
        outcome.count += 1;
        Some(outcome.child)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn count_for(&self, next_state_key: StateKey) -> Option<u64> {
        self.find(next_state_key).map(|outcome| outcome.count)
    }
}
