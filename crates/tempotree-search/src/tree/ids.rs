/// Index of a node inside the search tree arena.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Return the arena slot of this node.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for NodeId {
    fn from(value: usize) -> Self {
        NodeId(value)
    }
}

/// Opaque key of an environment state.
/// The tree never looks inside a state; callers intern their states and hand
/// the resulting key over. Equal states must map to equal keys.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct StateKey(u64);

impl StateKey {
    /// Return the internal numeric representation of this key.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for StateKey {
    fn from(value: u64) -> Self {
        StateKey(value)
    }
}

/// Position of an action in the action list the environment reported for a state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ActionId(usize);

impl ActionId {
    /// Return the position of this action in the state's action list.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for ActionId {
    fn from(value: usize) -> Self {
        ActionId(value)
    }
}
