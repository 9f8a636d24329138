use crate::tree::{
    arena::Arena,
    error::TreeError,
    ids::{ActionId, NodeId, StateKey},
    node::Node,
    stats::SelectionType,
};

/// Result of one selection/expansion descent.
#[derive(Debug, Clone)]
pub struct TreePolicyResult {
    /// Edges taken from the root to the leaf.
    pub path: Vec<(NodeId, ActionId)>,
    /// Node the rollout starts from.
    pub leaf: NodeId,
    /// Whether the leaf was allocated during this descent.
    pub leaf_is_new: bool,
    /// Reward accumulated along `path`.
    pub reward: f64,
}

/// Read-only summary of one root edge, used for reporting a decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootEdge {
    pub action: ActionId,
    pub visits: u64,
    pub q: f64,
    pub best: f64,
}

/// Search tree over opaque state keys.
/// The root always lives at index 0; the environment is only reached through closures.
#[derive(Debug, Clone)]
pub struct Tree {
    arena: Arena<Node>,
}

impl Tree {
    pub fn new(root_state_key: StateKey, root_is_terminal: bool) -> Self {
        let mut arena = Arena::new();
        arena.allocate(Node::new(root_state_key, 0, None, root_is_terminal));
        Tree { arena }
    }

    pub fn root_id(&self) -> NodeId {
        NodeId::from(0)
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub(crate) fn node(&self, node_id: NodeId) -> Result<&Node, TreeError> {
        self.arena
            .get(node_id)
            .ok_or(TreeError::MissingNode { node_id })
    }

    pub(crate) fn node_mut(&mut self, node_id: NodeId) -> Result<&mut Node, TreeError> {
        self.arena
            .get_mut(node_id)
            .ok_or(TreeError::MissingNode { node_id })
    }

    /// Summaries of every root edge in action order.
    pub fn root_edges(&self) -> Result<Vec<RootEdge>, TreeError> {
        let root = self.node(self.root_id())?;
        Ok(root
            .edges()
            .map(|edge| RootEdge {
                action: edge.action(),
                visits: edge.visits(),
                q: edge.q(),
                best: edge.best(),
            })
            .collect())
    }

    /// Root action with the most visits; ties go to the lowest index.
    pub fn best_root_action_by_visits(&self) -> Result<Option<ActionId>, TreeError> {
        let edges = self.root_edges()?;
        Ok(pick_best(&edges, |edge| edge.visits as f64))
    }

    /// Root action with the highest value under `selection`; ties go to the lowest index.
    pub fn best_root_action_by_value(
        &self,
        selection: SelectionType,
    ) -> Result<Option<ActionId>, TreeError> {
        let edges = self.root_edges()?;
        Ok(pick_best(&edges, |edge| match selection {
            SelectionType::Avg => edge.q,
            SelectionType::Max => edge.best,
        }))
    }

    /// Descend from the root by UCB until a new successor, a terminal node,
    /// an action-less state, or `max_depth` is reached.
    pub fn tree_policy<FNum, FStep>(
        &mut self,
        c: f64,
        selection: SelectionType,
        max_depth: u64,
        mut num_actions: FNum,
        mut step: FStep,
    ) -> Result<TreePolicyResult, TreeError>
    where
        FNum: FnMut(StateKey) -> usize,
        FStep: FnMut(StateKey, ActionId) -> (StateKey, f64, bool),
    {
        let mut current = self.root_id();
        let mut path: Vec<(NodeId, ActionId)> = Vec::new();
        let mut reward = 0.0;

        loop {
            let (state_key, depth, is_terminal) = {
                let node = self.node(current)?;
                (node.state_key(), node.depth(), node.is_terminal())
            };

            if is_terminal || depth >= max_depth {
                return Ok(TreePolicyResult {
                    path,
                    leaf: current,
                    leaf_is_new: false,
                    reward,
                });
            }

            {
                let node = self.node_mut(current)?;
                if !node.is_expanded() {
                    let n = num_actions(state_key);
                    if n == 0 {
                        return Ok(TreePolicyResult {
                            path,
                            leaf: current,
                            leaf_is_new: false,
                            reward,
                        });
                    }
                    node.expand(n);
                }
            }

            let action = self
                .node(current)?
                .select_edge(c, selection)
                .ok_or(TreeError::ActionSelectionFailed { node_id: current })?;
            path.push((current, action));

            let (next_key, r, next_terminal) = step(state_key, action);
            reward += r;

            let existing_child = self
                .node_mut(current)?
                .edge_mut(action)
                .ok_or(TreeError::MissingEdge {
                    node_id: current,
                    action_id: action,
                })?
                .increment_outcome(next_key);

            if let Some(child) = existing_child {
                current = child;
                continue;
            }

            let child_id = self.arena.allocate(Node::new(
                next_key,
                depth + 1,
                Some((current, action)),
                next_terminal,
            ));

            self.node_mut(current)?
                .edge_mut(action)
                .ok_or(TreeError::MissingEdge {
                    node_id: current,
                    action_id: action,
                })?
                .insert_outcome(next_key, child_id)
                .ok_or(TreeError::OutcomeInsertFailed {
                    node_id: current,
                    action_id: action,
                })?;

            return Ok(TreePolicyResult {
                path,
                leaf: child_id,
                leaf_is_new: true,
                reward,
            });
        }
    }
}

fn pick_best(edges: &[RootEdge], score: impl Fn(&RootEdge) -> f64) -> Option<ActionId> {
    let mut best: Option<(ActionId, f64)> = None;
    for edge in edges {
        let candidate = score(edge);
        match best {
            Some((_, best_score)) if best_score >= candidate => {}
            _ => best = Some((edge.action, candidate)),
        }
    }
    best.map(|(action, _)| action)
}
