use crate::tree::ids::NodeId;

/// Flat storage for search nodes, addressed by `NodeId`.
/// Nodes are never removed, so ids stay valid for the lifetime of a tree.
#[derive(Debug, Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<T>,
}

impl<T> Arena<T> {
    pub(crate) fn new() -> Self {
        Arena { slots: Vec::new() }
    }

    /// Store `item` and hand back the id it now lives under.
    pub(crate) fn allocate(&mut self, item: T) -> NodeId {
        let id = NodeId::from(self.slots.len());
        self.slots.push(item);
        id
    }

    pub(crate) fn get(&self, node_id: NodeId) -> Option<&T> {
        self.slots.get(node_id.index())
    }

    pub(crate) fn get_mut(&mut self, node_id: NodeId) -> Option<&mut T> {
        self.slots.get_mut(node_id.index())
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}
